use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::{KeyValueStore, StorageError};

/// Durable store keeping one file per key inside `dir`.
///
/// Writes land in a sibling `.tmp` file that is flushed to disk before it is
/// renamed into place, so a reader never sees a half-written blob, even after
/// a power loss.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a key to a file name. Keys like `@GoMarketPlace:cart` contain
    /// characters that are not portable in paths, so anything outside
    /// `[A-Za-z0-9._-]` is percent-encoded.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                    name.push(char::from(byte))
                }
                _ => {
                    let _ = write!(name, "%{byte:02X}");
                }
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(value) => {
                debug!(path = %path.display(), "File store read");
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No file for key");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "File store write");
        Ok(())
    }
}
