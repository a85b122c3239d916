use super::*;

fn draft(name: &str, price: f64) -> Product {
    let now = Utc::now();
    Product {
        id: EntityId::new(),
        name: name.to_string(),
        description: None,
        price,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("catalog_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn read_on_empty_store_returns_no_rows() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let products = Store::<Product>::read(&storage).await.expect("read");
    assert!(products.is_empty());
}

#[tokio::test]
async fn create_assigns_fresh_id_and_timestamps() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let submitted = draft("Widget", 4.5);
    let created = storage.create(submitted.clone()).await.expect("create");

    assert_ne!(created.id, submitted.id);
    assert_eq!(created.name, "Widget");
    assert_eq!(created.price, 4.5);
    assert_eq!(created.created_at, created.updated_at);

    let loaded = storage
        .read_by_id(created.id)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn read_lists_products_in_insertion_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.create(draft("first", 1.0)).await.expect("first");
    let second = storage.create(draft("second", 2.0)).await.expect("second");
    let third = storage.create(draft("third", 3.0)).await.expect("third");

    let ids: Vec<EntityId> = Store::<Product>::read(&storage)
        .await
        .expect("read")
        .into_iter()
        .map(|product| product.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[tokio::test]
async fn read_by_id_returns_none_for_unknown_id() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let missing = Store::<Product>::read_by_id(&storage, EntityId::new())
        .await
        .expect("read");
    assert!(missing.is_none());
}

#[tokio::test]
async fn update_rewrites_fields_and_keeps_created_at() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage.create(draft("Widget", 4.5)).await.expect("create");

    let mut changed = created.clone();
    changed.name = "Gadget".to_string();
    changed.description = Some("shiny".to_string());
    changed.price = 7.25;
    let updated = storage
        .update(changed)
        .await
        .expect("update")
        .expect("present");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Gadget");
    assert_eq!(updated.description.as_deref(), Some("shiny"));
    assert_eq!(updated.price, 7.25);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn update_of_unknown_id_reports_missing() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let outcome = storage.update(draft("ghost", 1.0)).await.expect("update");
    assert!(outcome.is_none());
    assert!(Store::<Product>::read(&storage)
        .await
        .expect("read")
        .is_empty());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage.create(draft("Widget", 4.5)).await.expect("create");

    Store::<Product>::delete(&storage, created.id)
        .await
        .expect("first delete");
    Store::<Product>::delete(&storage, created.id)
        .await
        .expect("second delete");
    Store::<Product>::delete(&storage, EntityId::new())
        .await
        .expect("unknown delete");

    assert!(Store::<Product>::read_by_id(&storage, created.id)
        .await
        .expect("read")
        .is_none());
}

#[test]
fn sqlite_path_skips_memory_and_foreign_urls() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("postgres://localhost/db").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/catalog.db?mode=rwc"),
        Some(PathBuf::from("./data/catalog.db"))
    );
}
