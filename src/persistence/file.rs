use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::PersistenceError;
use crate::persistence::{decode, encode, Persistence};
use crate::spot::Spot;

/// A store that keeps the collection as a JSON file named after its
/// key, inside a data directory.
pub struct FileStore {
    directory: PathBuf,
    path: PathBuf,
}

impl FileStore {
    /// Creates a new instance. `key` becomes the file stem and must be
    /// a plain name without separators.
    pub fn new(directory: impl Into<PathBuf>, key: &str) -> Result<Self, PersistenceError> {
        if key.is_empty() || key.starts_with('.') || key.contains(|c: char| c == '/' || c == '\\') {
            return Err(PersistenceError::InvalidKey(key.to_owned()));
        }

        let directory = directory.into();
        let path = directory.join(format!("{}.json", key));

        Ok(FileStore { directory, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for FileStore {
    fn load(&self) -> Result<Option<Vec<Spot>>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decode(&raw).map(Some)
    }

    fn save(&self, spots: &[Spot]) -> Result<(), PersistenceError> {
        let raw = encode(spots)?;

        fs::create_dir_all(&self.directory)?;

        // write beside the target so the rename stays on one filesystem
        let mut file = NamedTempFile::new_in(&self.directory)?;
        file.write_all(raw.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::geo::Coordinates;
    use crate::spot::Level;

    fn spot(id: u64) -> Spot {
        Spot::new(
            id,
            format!("Spot {}", id),
            "Station Road".to_owned(),
            "Cafe".to_owned(),
            Coordinates::new(19.26, 76.76),
            Level::Silver,
            false,
            true,
            id % 2 == 0,
        )
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempdir().expect("create temporary directory");
        let store = FileStore::new(dir.path(), "spots").expect("create file store");

        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn saves_overwrite_and_reload_in_order() {
        let dir = tempdir().expect("create temporary directory");
        let store = FileStore::new(dir.path().join("nested"), "spots").expect("create file store");

        store.save(&[spot(1), spot(2), spot(3)]).expect("first save");
        store.save(&[spot(3), spot(1)]).expect("second save");

        let loaded = store.load().expect("load").expect("stored collection");
        assert_eq!(loaded, vec![spot(3), spot(1)]);
        assert!(store.path().ends_with("nested/spots.json"));
    }

    #[test]
    fn garbage_on_disk_is_an_error() {
        let dir = tempdir().expect("create temporary directory");
        let store = FileStore::new(dir.path(), "spots").expect("create file store");
        fs::write(store.path(), b"\x00\x01 not json").expect("write garbage");

        assert!(store.load().is_err());
    }

    #[test]
    fn keys_must_be_plain_names() {
        for key in &["", "../escape", "a/b", ".hidden"] {
            assert!(
                matches!(FileStore::new("/tmp", key), Err(PersistenceError::InvalidKey(_))),
                "{:?} is rejected",
                key
            );
        }
    }
}
