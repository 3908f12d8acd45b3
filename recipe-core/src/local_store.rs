use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const LOCAL_STORE_FILE: &str = "local_store.json";

/// String key/value store backed by a single JSON file, the desktop
/// counterpart of browser `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    inner: Arc<RwLock<BTreeMap<String, String>>>,
    path: Option<PathBuf>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
            path: None,
        }
    }

    /// Charge le store depuis `path`; si le fichier principal est corrompu,
    /// on retombe sur la copie `.json.tmp` laissée par une écriture interrompue.
    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data: BTreeMap<String, String> = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "failed to parse local store, trying tmp fallback");
                    let tmp = path.with_extension("json.tmp");
                    match tokio::fs::read(&tmp).await {
                        Ok(tmp_bytes) => serde_json::from_slice(&tmp_bytes).unwrap_or_default(),
                        Err(_) => BTreeMap::new(),
                    }
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(data)),
            path: Some(path),
        }
    }

    pub async fn load_from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(error = %e, "failed to create storage dir");
        }
        Self::load_from(dir.join(LOCAL_STORE_FILE)).await
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.insert(key.to_owned(), value.into());
        drop(inner);
        self.persist().await;
    }

    pub async fn remove(&self, key: &str) {
        let mut inner = self.inner.write().await;
        if inner.remove(key).is_some() {
            drop(inner);
            self.persist().await;
        }
    }

    async fn persist(&self) {
        let Some(path) = &self.path else {
            debug!("local store is in-memory only; skipping persist");
            return;
        };
        let inner = self.inner.read().await;
        match serde_json::to_vec_pretty(&*inner) {
            Ok(bytes) => {
                if let Some(parent) = path.parent() {
                    let _ = tokio::fs::create_dir_all(parent).await;
                }
                // Ecriture atomique
                let tmp = path.with_extension("json.tmp");
                if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
                    // Le fichier principal reste intact
                    warn!(error = %e, path = %tmp.display(), "failed to write temp local store");
                    return;
                }
                if let Err(e) = tokio::fs::rename(&tmp, path).await {
                    warn!(error = %e, path = %path.display(), "failed to persist local store");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize local store"),
        }
    }
}
