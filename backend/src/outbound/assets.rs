//! Uploads-directory asset store.
//!
//! Writes go to a hidden temp file in the same directory followed by a
//! rename, so a crashed or failed write never leaves a partial file under
//! the final asset name. Removal treats an already-absent file as success.

use std::io::{self, Write};
use std::path::Path;

use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::{AssetStore, AssetStoreError};

/// Asset store rooted at the configured uploads directory.
#[derive(Debug)]
pub struct DirAssetStore {
    dir: Dir,
}

impl DirAssetStore {
    /// Open (creating if needed) the uploads directory.
    pub fn open(path: &Path) -> Result<Self, AssetStoreError> {
        std::fs::create_dir_all(path)
            .map_err(|err| AssetStoreError::io(path.display().to_string(), err))?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| AssetStoreError::io(path.display().to_string(), err))?;
        Ok(Self { dir })
    }

    fn write_impl(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        let tmp_name = format!(".{filename}.tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        let mut file = self.dir.open_with(&tmp_name, &options)?;

        let written = file
            .write_all(bytes)
            .and_then(|()| file.sync_all())
            .and_then(|()| self.dir.rename(&tmp_name, &self.dir, filename));
        if written.is_err() {
            // Best-effort cleanup; the original error is the one to report.
            drop(self.dir.remove_file(&tmp_name));
        }
        written
    }
}

impl AssetStore for DirAssetStore {
    fn write(&self, filename: &str, bytes: &[u8]) -> Result<(), AssetStoreError> {
        self.write_impl(filename, bytes)
            .map_err(|err| AssetStoreError::io(filename, err))
    }

    fn remove(&self, filename: &str) -> Result<(), AssetStoreError> {
        match self.dir.remove_file(filename) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AssetStoreError::io(filename, err)),
        }
    }
}
