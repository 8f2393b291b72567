use crate::error::{NavResult, NavigationError};
use crate::ports::outbound::KeyValueStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const EXTENSION: &str = "json";

/// File-backed key-value store for device-lifetime persistence.
///
/// Each key is one `<key>.json` file in `dir`. Writes go to a temp file
/// that is renamed over the target, so a crash never leaves a half-written
/// value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the store directory.
    pub async fn open<P: AsRef<Path>>(dir: P) -> NavResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(NavigationError::storage)?;
        debug!(dir = %dir.display(), "Opened navigation state directory");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", encode_key(key), EXTENSION))
    }
}

/// Maps a key to a file stem. ASCII alphanumerics, `_` and `-` pass
/// through; every other byte becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> NavResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NavigationError::storage(e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> NavResult<()> {
        let path = self.path_for(key);
        // Unique per write so overlapping writes to one key never share a temp file.
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, value.as_bytes())
            .await
            .map_err(NavigationError::storage)?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                debug!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(NavigationError::storage(e));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> NavResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NavigationError::storage(e)),
        }
    }

    async fn keys(&self) -> NavResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(NavigationError::storage)?;
        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(NavigationError::storage)?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_key)
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_encoding_is_reversible() {
        for key in ["nav_state_app_guest_linux", "user@example.com", "a/b c"] {
            let encoded = encode_key(key);
            assert!(!encoded.contains('/'));
            assert_eq!(decode_key(&encoded).as_deref(), Some(key));
        }
        assert_eq!(decode_key("bad%Z"), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store
            .set("nav_state_app_u@1_linux", "{\"x\":1}".to_string())
            .await
            .unwrap();

        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("nav_state_app_u@1_linux").await.unwrap(),
            Some("{\"x\":1}".to_string())
        );
        assert_eq!(
            reopened.keys().await.unwrap(),
            vec!["nav_state_app_u@1_linux".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_key_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("nested")).await.unwrap();
        assert_eq!(store.get("absent").await.unwrap(), None);
        store.remove("absent").await.unwrap();

        store.set("k", "v".to_string()).await.unwrap();
        store.set("k", "w".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("w".to_string()));
        store.remove("k").await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_writes_to_one_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.set("k", format!("value-{}", i)).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let value = store.get("k").await.unwrap().unwrap();
        assert!(value.starts_with("value-"));
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(files, vec!["k.json".to_string()]);
    }
}
