//! In-memory implementation of [`ProfileFieldStore`].
//!
//! Useful for tests and development. Rows live in a single table, like the
//! SQL layout, behind an `Arc<RwLock<...>>`.
//!
//! Writes can be made to fail on purpose with
//! [`InMemoryFieldStore::fail_inserts_named`], which lets tests exercise the
//! partial-batch path.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use xprofile_core::{XProfileError, XProfileResult};

use crate::models::{
    Field, FieldGroup, FieldId, FieldOption, FieldType, NewField, NewFieldGroup, NewFieldOption,
};
use crate::store::{FieldSeeder, ProfileFieldStore};

#[derive(Debug, Clone)]
struct GroupRow {
    id: i64,
    name: String,
    description: String,
    group_order: i64,
}

#[derive(Debug, Clone)]
struct FieldRow {
    id: FieldId,
    group_id: i64,
    parent_id: FieldId,
    field_type: FieldType,
    name: String,
    description: String,
    field_order: i64,
    option_order: i64,
}

impl FieldRow {
    fn to_field(&self) -> Field {
        Field {
            id: self.id,
            group_id: self.group_id,
            parent_id: self.parent_id,
            field_type: self.field_type.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            field_order: self.field_order,
        }
    }

    fn to_option(&self) -> FieldOption {
        FieldOption {
            id: self.id,
            group_id: self.group_id,
            parent_id: self.parent_id,
            name: self.name.clone(),
            option_order: self.option_order,
        }
    }

    fn is_option_of(&self, field_id: FieldId) -> bool {
        self.parent_id == field_id && self.field_type == FieldType::Option
    }
}

#[derive(Debug)]
struct Tables {
    groups: Vec<GroupRow>,
    rows: Vec<FieldRow>,
    next_group_id: i64,
    next_row_id: FieldId,
    failing_names: HashSet<String>,
    option_inserts: usize,
}

impl Tables {
    fn new() -> Self {
        Self {
            groups: Vec::new(),
            rows: Vec::new(),
            next_group_id: 1,
            next_row_id: 1,
            failing_names: HashSet::new(),
            option_inserts: 0,
        }
    }
}

/// Thread-safe in-memory profile field store.
///
/// # Example
///
/// ```
/// use xprofile_db::InMemoryFieldStore;
///
/// let store = InMemoryFieldStore::new();
/// assert_eq!(store.option_insert_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryFieldStore {
    tables: Arc<RwLock<Tables>>,
}

impl Default for InMemoryFieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFieldStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::new())),
        }
    }

    /// Makes every future option insert whose text equals `name` fail.
    pub fn fail_inserts_named(&self, name: impl Into<String>) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .failing_names
            .insert(name.into());
    }

    /// Returns how many option inserts have succeeded so far.
    pub fn option_insert_count(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .option_inserts
    }

    /// Inserts an option row with an explicit order, bypassing failure
    /// injection. Used to seed pre-existing options.
    pub fn seed_option(&self, option: &NewFieldOption) -> FieldOption {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Self::push_option(&mut tables, option)
    }

    fn push_option(tables: &mut Tables, option: &NewFieldOption) -> FieldOption {
        let row = FieldRow {
            id: tables.next_row_id,
            group_id: option.group_id,
            parent_id: option.parent_id,
            field_type: option.field_type(),
            name: option.name.clone(),
            description: String::new(),
            field_order: 0,
            option_order: option.option_order,
        };
        tables.next_row_id += 1;
        let created = row.to_option();
        tables.rows.push(row);
        created
    }
}

fn poisoned<T>(_: PoisonError<T>) -> XProfileError {
    XProfileError::DatabaseError("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl ProfileFieldStore for InMemoryFieldStore {
    async fn field_groups(&self) -> XProfileResult<Vec<FieldGroup>> {
        let tables = self.tables.read().map_err(poisoned)?;

        let mut groups: Vec<&GroupRow> = tables.groups.iter().collect();
        groups.sort_by_key(|g| (g.group_order, g.id));

        let result = groups
            .into_iter()
            .filter_map(|group| {
                let mut fields: Vec<Field> = tables
                    .rows
                    .iter()
                    .filter(|r| r.group_id == group.id && r.parent_id == 0)
                    .filter(|r| r.field_type != FieldType::Option)
                    .map(FieldRow::to_field)
                    .collect();
                if fields.is_empty() {
                    return None;
                }
                fields.sort_by_key(|f| (f.field_order, f.id));
                Some(FieldGroup {
                    id: group.id,
                    name: group.name.clone(),
                    description: group.description.clone(),
                    group_order: group.group_order,
                    fields,
                })
            })
            .collect();
        Ok(result)
    }

    async fn get_field(&self, id: FieldId) -> XProfileResult<Option<Field>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.rows.iter().find(|r| r.id == id).map(FieldRow::to_field))
    }

    async fn max_option_order(&self, field_id: FieldId) -> XProfileResult<Option<i64>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .rows
            .iter()
            .filter(|r| r.is_option_of(field_id))
            .map(|r| r.option_order)
            .max())
    }

    async fn insert_option(&self, option: &NewFieldOption) -> XProfileResult<FieldOption> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if tables.failing_names.contains(&option.name) {
            return Err(XProfileError::DatabaseError(format!(
                "insert rejected for option '{}'",
                option.name
            )));
        }
        let created = Self::push_option(&mut tables, option);
        tables.option_inserts += 1;
        Ok(created)
    }

    async fn options_for(&self, field_id: FieldId) -> XProfileResult<Vec<FieldOption>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut options: Vec<FieldOption> = tables
            .rows
            .iter()
            .filter(|r| r.is_option_of(field_id))
            .map(FieldRow::to_option)
            .collect();
        options.sort_by_key(|o| (o.option_order, o.id));
        Ok(options)
    }
}

#[async_trait]
impl FieldSeeder for InMemoryFieldStore {
    async fn create_group(&self, group: &NewFieldGroup) -> XProfileResult<FieldGroup> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let id = tables.next_group_id;
        tables.next_group_id += 1;
        let group_order = tables.groups.iter().map(|g| g.group_order + 1).max().unwrap_or(0);
        tables.groups.push(GroupRow {
            id,
            name: group.name.clone(),
            description: group.description.clone(),
            group_order,
        });
        Ok(FieldGroup {
            id,
            name: group.name.clone(),
            description: group.description.clone(),
            group_order,
            fields: Vec::new(),
        })
    }

    async fn create_field(&self, field: &NewField) -> XProfileResult<Field> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if !tables.groups.iter().any(|g| g.id == field.group_id) {
            return Err(XProfileError::DatabaseError(format!(
                "field group {} does not exist",
                field.group_id
            )));
        }
        let field_order = tables
            .rows
            .iter()
            .filter(|r| r.group_id == field.group_id && r.parent_id == 0)
            .map(|r| r.field_order + 1)
            .max()
            .unwrap_or(0);
        let row = FieldRow {
            id: tables.next_row_id,
            group_id: field.group_id,
            parent_id: 0,
            field_type: field.field_type.clone(),
            name: field.name.clone(),
            description: field.description.clone(),
            field_order,
            option_order: 0,
        };
        tables.next_row_id += 1;
        let created = row.to_field();
        tables.rows.push(row);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_field(field_type: FieldType) -> (InMemoryFieldStore, Field) {
        let store = InMemoryFieldStore::new();
        let group = store
            .create_group(&NewFieldGroup {
                name: "Base".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        let field = store
            .create_field(&NewField {
                group_id: group.id,
                field_type,
                name: "Colour".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        (store, field)
    }

    #[tokio::test]
    async fn test_max_option_order_empty() {
        let (store, field) = store_with_field(FieldType::Selectbox).await;
        assert_eq!(store.max_option_order(field.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_and_list_options() {
        let (store, field) = store_with_field(FieldType::Selectbox).await;
        store
            .insert_option(&NewFieldOption::for_field(&field, "B", 2))
            .await
            .unwrap();
        store
            .insert_option(&NewFieldOption::for_field(&field, "A", 1))
            .await
            .unwrap();

        let options = store.options_for(field.id).await.unwrap();
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(store.max_option_order(field.id).await.unwrap(), Some(2));
        assert_eq!(store.option_insert_count(), 2);
    }

    #[tokio::test]
    async fn test_option_rows_resolve_as_option_type() {
        let (store, field) = store_with_field(FieldType::Radio).await;
        let option = store
            .insert_option(&NewFieldOption::for_field(&field, "Yes", 1))
            .await
            .unwrap();
        let row = store.get_field(option.id).await.unwrap().unwrap();
        assert_eq!(row.field_type, FieldType::Option);
        assert_eq!(row.parent_id, field.id);
    }

    #[tokio::test]
    async fn test_field_groups_hide_empty_and_options() {
        let (store, field) = store_with_field(FieldType::Checkbox).await;
        store
            .create_group(&NewFieldGroup {
                name: "Empty".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        store
            .insert_option(&NewFieldOption::for_field(&field, "Cat", 1))
            .await
            .unwrap();

        let groups = store.field_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].fields.len(), 1);
        assert_eq!(groups[0].fields[0].id, field.id);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let (store, field) = store_with_field(FieldType::Selectbox).await;
        store.fail_inserts_named("Bad");
        let err = store
            .insert_option(&NewFieldOption::for_field(&field, "Bad", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, XProfileError::DatabaseError(_)));
        assert_eq!(store.option_insert_count(), 0);
        assert!(store.options_for(field.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_field_requires_group() {
        let store = InMemoryFieldStore::new();
        let err = store
            .create_field(&NewField {
                group_id: 99,
                field_type: FieldType::Selectbox,
                name: "Orphan".into(),
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_seed_option_does_not_count_as_insert() {
        let (store, field) = store_with_field(FieldType::Selectbox).await;
        store.seed_option(&NewFieldOption::for_field(&field, "Old", 5));
        assert_eq!(store.option_insert_count(), 0);
        assert_eq!(store.max_option_order(field.id).await.unwrap(), Some(5));
    }
}
