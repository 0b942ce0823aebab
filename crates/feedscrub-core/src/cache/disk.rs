//! Filesystem cache: one file per key, expiry stamped on the first line.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::str;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{CacheError, DataCache};

#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Keys come from a name filter and are expected to be digest-like;
    /// anything path-like is refused rather than joined into the tree.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.dir.join(key))
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl DataCache for DiskCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key)?;
        let raw = fs::read(&path).ok()?;
        let newline = raw.iter().position(|&b| b == b'\n')?;
        let expires: u64 = str::from_utf8(&raw[..newline]).ok()?.trim().parse().ok()?;
        if expires < now_secs() {
            let _ = fs::remove_file(&path);
            return None;
        }
        Some(raw[newline + 1..].to_vec())
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let path = self.entry_path(key).ok_or_else(|| {
            CacheError::Write(io::Error::new(io::ErrorKind::InvalidInput, "unsafe cache key"))
        })?;
        fs::create_dir_all(&self.dir)?;
        let expires = now_secs().saturating_add(ttl.as_secs());
        let mut data = format!("{}\n", expires).into_bytes();
        data.extend_from_slice(value);
        fs::write(path, data)?;
        Ok(())
    }
}
