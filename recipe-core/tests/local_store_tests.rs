use recipe_core::local_store::LOCAL_STORE_FILE;
use recipe_core::LocalStore;

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
async fn values_persist_across_reload() {
    let dir = temp_dir("store");
    let store = LocalStore::load_from_dir(&dir).await;
    assert_eq!(store.path(), Some(dir.join(LOCAL_STORE_FILE).as_path()));

    store.set("a", "1").await;
    store.set("b", "2").await;
    store.remove("a").await;

    let reloaded = LocalStore::load_from_dir(&dir).await;
    assert_eq!(reloaded.get("a").await, None);
    assert_eq!(reloaded.get("b").await.as_deref(), Some("2"));
    assert!(!dir.join("local_store.json.tmp").exists());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn load_uses_tmp_fallback_on_corrupted_json() {
    let dir = temp_dir("corrupt");
    tokio::fs::create_dir_all(&dir).await.unwrap();

    tokio::fs::write(dir.join(LOCAL_STORE_FILE), b"{ this is not json ")
        .await
        .unwrap();
    tokio::fs::write(
        dir.join("local_store.json.tmp"),
        br#"{"favorites":"[]","request_count":"4"}"#,
    )
    .await
    .unwrap();

    let store = LocalStore::load_from_dir(&dir).await;
    assert_eq!(store.get("request_count").await.as_deref(), Some("4"));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn corrupted_without_fallback_starts_empty() {
    let dir = temp_dir("corrupt_empty");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join(LOCAL_STORE_FILE), b"[1, 2")
        .await
        .unwrap();

    let store = LocalStore::load_from_dir(&dir).await;
    assert_eq!(store.get("favorites").await, None);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn in_memory_store_writes_nothing() {
    let store = LocalStore::in_memory();
    store.set("k", "v").await;
    assert_eq!(store.get("k").await.as_deref(), Some("v"));
    assert!(store.path().is_none());
}

#[tokio::test]
async fn failed_tmp_write_keeps_previous_file() {
    let dir = temp_dir("tmp_blocked");
    let store = LocalStore::load_from_dir(&dir).await;
    store.set("request_count", "3").await;

    // Un répertoire à la place du fichier temporaire fait échouer l'écriture
    tokio::fs::create_dir_all(dir.join("local_store.json.tmp"))
        .await
        .unwrap();
    store.set("request_count", "4").await;
    assert_eq!(store.get("request_count").await.as_deref(), Some("4"));

    let reloaded = LocalStore::load_from_dir(&dir).await;
    assert_eq!(reloaded.get("request_count").await.as_deref(), Some("3"));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
