use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::local_store::LocalStore;
use crate::recipe::Recipe;

pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FavoriteItem {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: String,
}

impl From<&Recipe> for FavoriteItem {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            thumbnail_url: recipe.thumbnail_url.clone(),
        }
    }
}

/// Ordered set of favorites keyed by recipe id. Cloning shares the same
/// underlying list.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    inner: Arc<RwLock<Vec<FavoriteItem>>>,
    backing: Option<LocalStore>,
}

impl FavoritesStore {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            backing: None,
        }
    }

    /// Restores favorites saved under [`FAVORITES_KEY`]; a missing or
    /// unreadable value starts an empty list.
    pub async fn persistent(store: LocalStore) -> Self {
        let items = match store.get(FAVORITES_KEY).await {
            Some(raw) => match serde_json::from_str::<Vec<FavoriteItem>>(&raw) {
                Ok(items) => dedup_by_id(items),
                Err(e) => {
                    warn!(error = %e, "failed to parse stored favorites, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(items)),
            backing: Some(store),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.backing.is_some()
    }

    pub async fn add(&self, item: FavoriteItem) -> bool {
        let mut inner = self.inner.write().await;
        if inner.iter().any(|fav| fav.id == item.id) {
            debug!(id = item.id, "recipe already in favorites");
            return false;
        }
        inner.push(item);
        drop(inner);
        self.persist().await;
        true
    }

    pub async fn remove(&self, id: u64) -> bool {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|fav| fav.id != id);
        if inner.len() == before {
            return false;
        }
        drop(inner);
        self.persist().await;
        true
    }

    /// Adds the item if absent, removes it otherwise. Returns whether the
    /// item is a favorite afterwards.
    pub async fn toggle(&self, item: FavoriteItem) -> bool {
        if self.contains(item.id).await {
            self.remove(item.id).await;
            false
        } else {
            self.add(item).await
        }
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.inner.read().await.iter().any(|fav| fav.id == id)
    }

    pub async fn list(&self) -> Vec<FavoriteItem> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        if inner.is_empty() {
            return;
        }
        inner.clear();
        drop(inner);
        self.persist().await;
    }

    async fn persist(&self) {
        let Some(store) = &self.backing else {
            return;
        };
        let inner = self.inner.read().await;
        match serde_json::to_string(&*inner) {
            Ok(json) => {
                drop(inner);
                store.set(FAVORITES_KEY, json).await;
            }
            Err(e) => warn!(error = %e, "failed to serialize favorites"),
        }
    }
}

fn dedup_by_id(items: Vec<FavoriteItem>) -> Vec<FavoriteItem> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.id)).collect()
}
