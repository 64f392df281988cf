use std::error::Error;
use std::path::PathBuf;

use dotenv::dotenv;
use log::{info, initialize_logger, warn};
use structopt::StructOpt;

use cleanpath::config::Config;
use cleanpath::entropy::RandomEntropy;
use cleanpath::persistence::{FileStore, Persistence};
use cleanpath::seed;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "generate-seed",
    about = "Generate a seed collection and store it, replacing any stored spots"
)]
struct Opt {
    /// How many spots to generate
    #[structopt(short, long)]
    count: Option<usize>,

    /// Seed for the random levels and flags
    #[structopt(short, long)]
    seed: Option<u64>,

    /// Data directory to write to (defaults to CLEANPATH_DATA_DIR)
    #[structopt(long, parse(from_os_str))]
    data_dir: Option<PathBuf>,

    /// Print the collection instead of storing it
    #[structopt(long)]
    dry_run: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();
    let config = Config::from_env()?;

    let count = opt.count.unwrap_or(config.seed_count);
    let mut entropy = RandomEntropy::from_seed(opt.seed.or(config.rng_seed));

    info!(logger, "Generating {} seed spots...", count; "seed" => opt.seed);
    let spots = seed::generate(count, &mut entropy);

    if opt.dry_run {
        println!("{}", serde_json::to_string_pretty(&spots)?);
        return Ok(());
    }

    let store = FileStore::new(opt.data_dir.unwrap_or(config.data_dir), &config.storage_key)?;

    if store.load().map(|stored| stored.is_some()).unwrap_or(true) {
        warn!(logger, "Replacing stored spots"; "path" => %store.path().display());
    }

    store.save(&spots)?;

    info!(logger, "Stored {} spots", spots.len(); "path" => %store.path().display());

    Ok(())
}
