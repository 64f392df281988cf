use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use cleanpath::config::Config;
use cleanpath::directory::Directory;
use cleanpath::entropy::RandomEntropy;
use cleanpath::environment::Environment;
use cleanpath::errors::DirectoryError;
use cleanpath::spot::{AnnotatedSpot, Draft, SpotId, CATEGORIES, DEFAULT_CATEGORY};
use log::{info, initialize_logger};

const HELP: &str = "\
Commands:
  list                              show the current view
  search <text>                     filter by name, address or category (blank clears)
  clean                             toggle the clean-only filter
  free                              toggle the free-only filter
  categories                        list known categories
  admin <pin>                       enter admin mode
  logout                            leave admin mode
  add <name> | <address> [| <cat>]  add a spot near you (admin)
  verify <id>                       toggle verified (admin)
  sponsor <id>                      toggle sponsored (admin)
  delete <id>                       delete a spot (admin)
  help                              show this text
  quit                              exit";

#[derive(Debug, PartialEq)]
enum Command {
    List,
    Search(String),
    ToggleClean,
    ToggleFree,
    Categories,
    Admin(String),
    Logout,
    Add(Draft),
    Verify(SpotId),
    Sponsor(SpotId),
    Delete(SpotId),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.find(char::is_whitespace) {
            Some(index) => (&line[..index], line[index..].trim()),
            None => (line, ""),
        };

        let id = || {
            rest.parse::<SpotId>()
                .map_err(|_| format!("expected a spot ID, got {:?}", rest))
        };

        match word.to_lowercase().as_str() {
            "" | "list" | "ls" => Ok(Command::List),
            "search" | "s" => Ok(Command::Search(rest.to_owned())),
            "clean" => Ok(Command::ToggleClean),
            "free" => Ok(Command::ToggleFree),
            "categories" => Ok(Command::Categories),
            "admin" | "login" => Ok(Command::Admin(rest.to_owned())),
            "logout" => Ok(Command::Logout),
            "add" => parse_draft(rest).map(Command::Add),
            "verify" => id().map(Command::Verify),
            "sponsor" => id().map(Command::Sponsor),
            "delete" | "rm" => id().map(Command::Delete),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command {:?}; try `help`", other)),
        }
    }
}

fn parse_draft(rest: &str) -> Result<Draft, String> {
    let mut parts = rest.split('|').map(str::trim);

    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(address), category, None) => Ok(Draft::new(
            name,
            address,
            category.unwrap_or(DEFAULT_CATEGORY),
        )),
        _ => Err("usage: add <name> | <address> [| <category>]".to_owned()),
    }
}

fn describe(spot: &AnnotatedSpot) -> String {
    let s = &spot.spot;
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    let distance = match spot.distance {
        Some(km) => format!("{:.2} km", km),
        None => "? km".to_owned(),
    };

    format!(
        "{id:>14}  {sponsored}{name} - {address} [{category}] {level}, clean: {clean}, free: {free}{verified}  {distance}",
        id = s.id(),
        sponsored = if s.is_sponsored() { "* " } else { "" },
        name = s.name(),
        address = s.address(),
        category = s.category(),
        level = s.level(),
        clean = yes_no(s.is_clean()),
        free = yes_no(s.is_free()),
        verified = if s.is_verified() { ", verified" } else { "" },
        distance = distance,
    )
}

async fn say(text: impl AsRef<str>) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_ref().as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

async fn show_view(directory: &Directory) -> io::Result<()> {
    let view = directory.view();
    let query = directory.query();

    say(format!(
        "Showing {} spots (search: {:?}, clean only: {}, free only: {})",
        view.len(),
        query.text,
        query.clean_only,
        query.free_only
    ))
    .await?;

    for spot in &view {
        say(describe(spot)).await?;
    }

    Ok(())
}

async fn confirm_delete(lines: &mut Lines<BufReader<Stdin>>, name: &str) -> io::Result<bool> {
    say(format!("Delete spot {:?}? [y/N]", name)).await?;

    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn report(result: Result<String, DirectoryError>) -> io::Result<()> {
    match result {
        Ok(message) => say(message).await,
        Err(e) => say(format!("Error: {}", e)).await,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let config = Config::from_env()?;

    info!(logger, "Starting..."; "data_dir" => %config.data_dir.display(), "storage_key" => &config.storage_key);
    let logger = Arc::new(logger);

    let entropy = Box::new(RandomEntropy::from_seed(config.rng_seed));
    let environment = Environment::from_config(logger.clone(), config)?;

    let mut directory = Directory::open(&environment, entropy);
    let here = directory.resolve_location().await;

    say(format!(
        "{} {}: {} spots ({:?}); you are at {:.4}, {:.4}. Type `help` for commands.",
        info::PRODUCT_NAME,
        info::VERSION,
        directory.snapshot().len(),
        directory.origin(),
        here.lat,
        here.lng
    ))
    .await?;

    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                say(message).await?;
                continue;
            }
        };

        match command {
            Command::List => show_view(&directory).await?,
            Command::Search(text) => {
                directory.set_query(text);
                show_view(&directory).await?;
            }
            Command::ToggleClean => {
                directory.toggle_clean_filter();
                show_view(&directory).await?;
            }
            Command::ToggleFree => {
                directory.toggle_free_filter();
                show_view(&directory).await?;
            }
            Command::Categories => say(CATEGORIES.join("\n")).await?,
            Command::Admin(pin) => {
                if directory.unlock(&pin) {
                    say("Admin mode on").await?;
                } else {
                    say("Wrong PIN").await?;
                }
            }
            Command::Logout => {
                directory.lock();
                say("Admin mode off").await?;
            }
            Command::Add(draft) => {
                let result = directory
                    .add_spot(draft)
                    .map(|spot| format!("Added spot {} ({})", spot.id(), spot.level()));
                report(result).await?;
            }
            Command::Verify(id) => {
                let result = directory.toggle_verified(id).map(|verified| match verified {
                    Some(verified) => format!("Spot {} verified: {}", id, verified),
                    None => format!("No spot {}", id),
                });
                report(result).await?;
            }
            Command::Sponsor(id) => {
                let result = directory.toggle_sponsored(id).map(|sponsored| match sponsored {
                    Some(sponsored) => format!("Spot {} sponsored: {}", id, sponsored),
                    None => format!("No spot {}", id),
                });
                report(result).await?;
            }
            Command::Delete(id) => {
                // ask first; removal itself is synchronous
                let name = directory.get(id).map(|spot| spot.name().to_owned());
                let confirmed = match (&name, directory.role()) {
                    (Some(name), cleanpath::admin::Role::Privileged) => {
                        confirm_delete(&mut lines, name).await?
                    }
                    _ => false,
                };

                let result = directory.remove_spot(id, |_| confirmed).map(|removed| match removed {
                    Some(spot) => format!("Deleted spot {} ({})", spot.id(), spot.name()),
                    None => format!("No spot {}", id),
                });
                report(result).await?;
            }
            Command::Help => say(HELP).await?,
            Command::Quit => break,
        }
    }

    info!(logger, "Exiting gracefully...");

    Ok(())
}
