use recipe_core::favorites::FAVORITES_KEY;
use recipe_core::{FavoriteItem, FavoritesStore, LocalStore};

fn item(id: u64, name: &str) -> FavoriteItem {
    FavoriteItem {
        id,
        name: name.into(),
        description: None,
        thumbnail_url: format!("http://img/{}.jpg", id),
    }
}

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "recipes_{}_{}",
        tag,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

#[tokio::test]
async fn add_is_idempotent_and_remove_clears() {
    let favorites = FavoritesStore::in_memory();
    assert!(favorites.is_empty().await);

    assert!(favorites.add(item(1, "Soup")).await);
    assert_eq!(favorites.list().await, vec![item(1, "Soup")]);

    // Même id, contenu différent: toujours ignoré
    assert!(!favorites.add(item(1, "Other soup")).await);
    assert_eq!(favorites.len().await, 1);
    assert_eq!(favorites.list().await[0].name, "Soup");

    assert!(favorites.remove(1).await);
    assert!(favorites.list().await.is_empty());
}

#[tokio::test]
async fn removing_unknown_id_changes_nothing() {
    let favorites = FavoritesStore::in_memory();
    favorites.add(item(1, "A")).await;
    favorites.add(item(2, "B")).await;

    assert!(!favorites.remove(42).await);
    assert_eq!(favorites.list().await, vec![item(1, "A"), item(2, "B")]);
}

#[tokio::test]
async fn insertion_order_is_kept() {
    let favorites = FavoritesStore::in_memory();
    for id in [3, 1, 2] {
        favorites.add(item(id, "x")).await;
    }
    favorites.remove(1).await;
    let ids: Vec<u64> = favorites.list().await.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![3, 2]);
}

#[tokio::test]
async fn toggle_flips_membership() {
    let favorites = FavoritesStore::in_memory();
    assert!(favorites.toggle(item(5, "Pie")).await);
    assert!(favorites.contains(5).await);
    assert!(!favorites.toggle(item(5, "Pie")).await);
    assert!(!favorites.contains(5).await);
}

#[tokio::test]
async fn persistent_favorites_survive_reopen() {
    let dir = temp_dir("favorites");
    let store = LocalStore::load_from_dir(&dir).await;
    let favorites = FavoritesStore::persistent(store).await;
    assert!(favorites.is_persistent());
    favorites.add(item(1, "Soup")).await;
    favorites.add(item(2, "Cake")).await;
    favorites.remove(1).await;

    let reopened = FavoritesStore::persistent(LocalStore::load_from_dir(&dir).await).await;
    assert_eq!(reopened.list().await, vec![item(2, "Cake")]);

    reopened.clear().await;
    let emptied = FavoritesStore::persistent(LocalStore::load_from_dir(&dir).await).await;
    assert!(emptied.is_empty().await);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn stored_value_is_a_json_array_under_fixed_key() {
    let store = LocalStore::in_memory();
    let favorites = FavoritesStore::persistent(store.clone()).await;
    favorites.add(item(9, "Tart")).await;

    let raw = store.get(FAVORITES_KEY).await.expect("favorites key");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[0]["id"], 9);
    assert_eq!(parsed[0]["thumbnail_url"], "http://img/9.jpg");
}

#[tokio::test]
async fn unreadable_stored_favorites_start_empty() {
    let store = LocalStore::in_memory();
    store.set(FAVORITES_KEY, "{ broken").await;
    let favorites = FavoritesStore::persistent(store).await;
    assert!(favorites.is_empty().await);
}

#[tokio::test]
async fn duplicate_ids_in_storage_are_collapsed() {
    let store = LocalStore::in_memory();
    let raw = serde_json::to_string(&vec![item(1, "A"), item(1, "B"), item(2, "C")]).unwrap();
    store.set(FAVORITES_KEY, raw).await;

    let favorites = FavoritesStore::persistent(store).await;
    let ids: Vec<u64> = favorites.list().await.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2]);
}
