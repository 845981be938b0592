//! Integration tests for the SQLite store: schema, field listing, option
//! ordering, and persistence across reopen.

#![cfg(feature = "sqlite")]

use xprofile_db::{
    FieldSeeder, FieldType, NewField, NewFieldGroup, NewFieldOption, ProfileFieldStore,
    SqliteFieldStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn seeded_store() -> (SqliteFieldStore, i64) {
    let store = SqliteFieldStore::memory().unwrap();
    store.migrate().await.unwrap();
    let group = store
        .create_group(&NewFieldGroup {
            name: "Base".into(),
            description: "Primary profile data".into(),
        })
        .await
        .unwrap();
    (store, group.id)
}

async fn add_field(store: &SqliteFieldStore, group_id: i64, name: &str, ty: FieldType) -> i64 {
    store
        .create_field(&NewField {
            group_id,
            field_type: ty,
            name: name.into(),
            description: String::new(),
        })
        .await
        .unwrap()
        .id
}

// ═════════════════════════════════════════════════════════════════════
// Field listing
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_field_groups_in_order_without_options() {
    let (store, base) = seeded_store().await;
    let colour = add_field(&store, base, "Colour", FieldType::Selectbox).await;
    let bio = add_field(&store, base, "Bio", FieldType::Textarea).await;

    let extra = store
        .create_group(&NewFieldGroup {
            name: "Extra".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let pets = add_field(&store, extra.id, "Pets", FieldType::Checkbox).await;
    store
        .create_group(&NewFieldGroup {
            name: "Empty".into(),
            description: String::new(),
        })
        .await
        .unwrap();

    let field = store.get_field(colour).await.unwrap().unwrap();
    store
        .insert_option(&NewFieldOption::for_field(&field, "Red", 1))
        .await
        .unwrap();

    let groups = store.field_groups().await.unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Base", "Extra"]);
    let base_fields: Vec<i64> = groups[0].fields.iter().map(|f| f.id).collect();
    assert_eq!(base_fields, vec![colour, bio]);
    assert_eq!(groups[1].fields[0].id, pets);
    assert_eq!(groups[0].fields[1].field_order, 1);
}

#[tokio::test]
async fn test_get_field_missing_and_option_rows() {
    let (store, base) = seeded_store().await;
    assert!(store.get_field(999).await.unwrap().is_none());

    let colour = add_field(&store, base, "Colour", FieldType::Radio).await;
    let field = store.get_field(colour).await.unwrap().unwrap();
    assert_eq!(field.field_type, FieldType::Radio);
    assert_eq!(field.parent_id, 0);

    let option = store
        .insert_option(&NewFieldOption::for_field(&field, "Yes", 1))
        .await
        .unwrap();
    let row = store.get_field(option.id).await.unwrap().unwrap();
    assert_eq!(row.field_type, FieldType::Option);
    assert_eq!(row.parent_id, colour);
}

// ═════════════════════════════════════════════════════════════════════
// Option ordering
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_max_option_order_and_listing() {
    let (store, base) = seeded_store().await;
    let colour = add_field(&store, base, "Colour", FieldType::Selectbox).await;
    let other = add_field(&store, base, "Size", FieldType::Selectbox).await;
    let field = store.get_field(colour).await.unwrap().unwrap();
    let other_field = store.get_field(other).await.unwrap().unwrap();

    assert_eq!(store.max_option_order(colour).await.unwrap(), None);

    for (name, order) in [("Green", 4), ("Red", 3), ("Blue", 5)] {
        store
            .insert_option(&NewFieldOption::for_field(&field, name, order))
            .await
            .unwrap();
    }
    store
        .insert_option(&NewFieldOption::for_field(&other_field, "XL", 40))
        .await
        .unwrap();

    assert_eq!(store.max_option_order(colour).await.unwrap(), Some(5));
    assert_eq!(store.max_option_order(other).await.unwrap(), Some(40));

    let options = store.options_for(colour).await.unwrap();
    let listed: Vec<(&str, i64)> = options
        .iter()
        .map(|o| (o.name.as_str(), o.option_order))
        .collect();
    assert_eq!(listed, vec![("Red", 3), ("Green", 4), ("Blue", 5)]);
    assert!(options.iter().all(|o| o.group_id == base));
}

#[tokio::test]
async fn test_empty_option_text_is_stored() {
    let (store, base) = seeded_store().await;
    let colour = add_field(&store, base, "Colour", FieldType::Selectbox).await;
    let field = store.get_field(colour).await.unwrap().unwrap();
    store
        .insert_option(&NewFieldOption::for_field(&field, "", 1))
        .await
        .unwrap();
    let options = store.options_for(colour).await.unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].name, "");
}

// ═════════════════════════════════════════════════════════════════════
// Persistence and prefixes
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("xprofile.sqlite3");

    let colour = {
        let store = SqliteFieldStore::open(&path, "wp_bp_").unwrap();
        store.migrate().await.unwrap();
        let group = store
            .create_group(&NewFieldGroup {
                name: "Base".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        let colour = add_field(&store, group.id, "Colour", FieldType::Selectbox).await;
        let field = store.get_field(colour).await.unwrap().unwrap();
        store
            .insert_option(&NewFieldOption::for_field(&field, "Red", 1))
            .await
            .unwrap();
        colour
    };

    let reopened = SqliteFieldStore::open(&path, "wp_bp_").unwrap();
    reopened.migrate().await.unwrap();
    assert_eq!(reopened.max_option_order(colour).await.unwrap(), Some(1));
    assert_eq!(reopened.path(), &path);
}

#[tokio::test]
async fn test_prefixes_isolate_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.sqlite3");

    let site_a = SqliteFieldStore::open(&path, "a_").unwrap();
    site_a.migrate().await.unwrap();
    let group = site_a
        .create_group(&NewFieldGroup {
            name: "Base".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    add_field(&site_a, group.id, "Colour", FieldType::Selectbox).await;

    let site_b = SqliteFieldStore::open(&path, "b_").unwrap();
    site_b.migrate().await.unwrap();
    assert!(site_b.field_groups().await.unwrap().is_empty());
    assert_eq!(site_a.field_groups().await.unwrap().len(), 1);
    assert_eq!(site_b.tables().fields, "b_xprofile_fields");
}
