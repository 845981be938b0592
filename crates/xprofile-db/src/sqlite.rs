//! SQLite profile field store using `rusqlite`.
//!
//! The connection sits behind a `tokio::sync::Mutex` and every call runs in
//! `tokio::task::spawn_blocking`, so the async runtime is never blocked by
//! SQLite I/O.
//!
//! - WAL mode and foreign keys enabled for file databases
//! - `:memory:` path for tests
//! - Table names derived from a configurable prefix (see [`TableNames`])

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use xprofile_core::settings::DatabaseSettings;
use xprofile_core::{XProfileError, XProfileResult};

use crate::models::{
    Field, FieldGroup, FieldId, FieldOption, NewField, NewFieldGroup, NewFieldOption,
};
use crate::schema::TableNames;
use crate::store::{FieldSeeder, ProfileFieldStore};

/// A SQLite-backed [`ProfileFieldStore`].
pub struct SqliteFieldStore {
    path: PathBuf,
    tables: Arc<TableNames>,
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteFieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteFieldStore")
            .field("path", &self.path)
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

fn db_err(e: rusqlite::Error) -> XProfileError {
    XProfileError::DatabaseError(e.to_string())
}

impl SqliteFieldStore {
    /// Opens the database at `path` (or `:memory:`) using tables named with
    /// `table_prefix`.
    ///
    /// Tables are not created; call [`SqliteFieldStore::migrate`] for that.
    pub fn open(path: impl Into<PathBuf>, table_prefix: &str) -> XProfileResult<Self> {
        let path = path.into();
        let tables = TableNames::with_prefix(table_prefix)?;
        let in_memory = path.to_str() == Some(":memory:");

        let conn = if in_memory {
            Connection::open_in_memory()
        } else {
            Connection::open(&path)
        }
        .map_err(|e| XProfileError::OperationalError(format!("SQLite open failed: {e}")))?;

        let pragmas = if in_memory {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
        };
        conn.execute_batch(pragmas).map_err(|e| {
            XProfileError::OperationalError(format!("Failed to set pragmas: {e}"))
        })?;

        tracing::debug!(path = %path.display(), fields_table = %tables.fields, "opened SQLite store");

        Ok(Self {
            path,
            tables: Arc::new(tables),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database with the default prefix.
    pub fn memory() -> XProfileResult<Self> {
        Self::open(":memory:", &DatabaseSettings::default().table_prefix)
    }

    /// Opens the database described by `settings`.
    pub fn from_settings(settings: &DatabaseSettings) -> XProfileResult<Self> {
        Self::open(&settings.path, &settings.table_prefix)
    }

    /// Returns the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Returns the resolved table names.
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Creates the group and field tables if they do not exist.
    pub async fn migrate(&self) -> XProfileResult<()> {
        self.run(|conn, tables| {
            conn.execute_batch(&tables.create_statements())
                .map_err(|e| XProfileError::OperationalError(format!("Migration failed: {e}")))
        })
        .await?;
        tracing::info!(groups = %self.tables.groups, fields = %self.tables.fields, "schema ready");
        Ok(())
    }

    /// Runs `f` against the connection on the blocking thread pool.
    async fn run<T, F>(&self, f: F) -> XProfileResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &TableNames) -> XProfileResult<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        let tables = self.tables.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn, &tables)
        })
        .await
        .map_err(|e| XProfileError::DatabaseError(format!("Task join error: {e}")))?
    }

    fn map_field(row: &rusqlite::Row<'_>) -> rusqlite::Result<Field> {
        Ok(Field {
            id: row.get(0)?,
            group_id: row.get(1)?,
            parent_id: row.get(2)?,
            field_type: row.get::<_, String>(3)?.into(),
            name: row.get(4)?,
            description: row.get(5)?,
            field_order: row.get(6)?,
        })
    }

    fn map_option(row: &rusqlite::Row<'_>) -> rusqlite::Result<FieldOption> {
        Ok(FieldOption {
            id: row.get(0)?,
            group_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            option_order: row.get(4)?,
        })
    }
}

#[async_trait]
impl ProfileFieldStore for SqliteFieldStore {
    async fn field_groups(&self) -> XProfileResult<Vec<FieldGroup>> {
        self.run(|conn, tables| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT id, name, description, group_order FROM {} \
                     ORDER BY group_order ASC, id ASC",
                    tables.groups
                ))
                .map_err(db_err)?;
            let mut groups: Vec<FieldGroup> = stmt
                .query_map([], |row| {
                    Ok(FieldGroup {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        group_order: row.get(3)?,
                        fields: Vec::new(),
                    })
                })
                .map_err(db_err)?
                .collect::<Result<_, _>>()
                .map_err(db_err)?;

            let index: HashMap<i64, usize> =
                groups.iter().enumerate().map(|(i, g)| (g.id, i)).collect();

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT id, group_id, parent_id, type, name, description, field_order FROM {} \
                     WHERE parent_id = 0 AND type <> 'option' \
                     ORDER BY field_order ASC, id ASC",
                    tables.fields
                ))
                .map_err(db_err)?;
            let fields = stmt.query_map([], Self::map_field).map_err(db_err)?;
            for field in fields {
                let field = field.map_err(db_err)?;
                if let Some(&i) = index.get(&field.group_id) {
                    groups[i].fields.push(field);
                }
            }

            groups.retain(|g| !g.fields.is_empty());
            Ok(groups)
        })
        .await
    }

    async fn get_field(&self, id: FieldId) -> XProfileResult<Option<Field>> {
        self.run(move |conn, tables| {
            conn.query_row(
                &format!(
                    "SELECT id, group_id, parent_id, type, name, description, field_order \
                     FROM {} WHERE id = ?1",
                    tables.fields
                ),
                params![id],
                Self::map_field,
            )
            .optional()
            .map_err(db_err)
        })
        .await
    }

    async fn max_option_order(&self, field_id: FieldId) -> XProfileResult<Option<i64>> {
        self.run(move |conn, tables| {
            conn.query_row(
                &format!(
                    "SELECT MAX(option_order) FROM {} WHERE parent_id = ?1 AND type = 'option'",
                    tables.fields
                ),
                params![field_id],
                |row| row.get::<_, Option<i64>>(0),
            )
            .map_err(db_err)
        })
        .await
    }

    async fn insert_option(&self, option: &NewFieldOption) -> XProfileResult<FieldOption> {
        let option = option.clone();
        self.run(move |conn, tables| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (group_id, parent_id, type, name, option_order) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    tables.fields
                ),
                params![
                    option.group_id,
                    option.parent_id,
                    option.field_type().as_str(),
                    option.name,
                    option.option_order
                ],
            )
            .map_err(db_err)?;
            Ok(FieldOption {
                id: conn.last_insert_rowid(),
                group_id: option.group_id,
                parent_id: option.parent_id,
                name: option.name,
                option_order: option.option_order,
            })
        })
        .await
    }

    async fn options_for(&self, field_id: FieldId) -> XProfileResult<Vec<FieldOption>> {
        self.run(move |conn, tables| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT id, group_id, parent_id, name, option_order FROM {} \
                     WHERE parent_id = ?1 AND type = 'option' \
                     ORDER BY option_order ASC, id ASC",
                    tables.fields
                ))
                .map_err(db_err)?;
            let options = stmt
                .query_map(params![field_id], Self::map_option)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(options)
        })
        .await
    }
}

#[async_trait]
impl FieldSeeder for SqliteFieldStore {
    async fn create_group(&self, group: &NewFieldGroup) -> XProfileResult<FieldGroup> {
        let group = group.clone();
        self.run(move |conn, tables| {
            let group_order: i64 = conn
                .query_row(
                    &format!("SELECT COALESCE(MAX(group_order) + 1, 0) FROM {}", tables.groups),
                    [],
                    |row| row.get(0),
                )
                .map_err(db_err)?;
            conn.execute(
                &format!(
                    "INSERT INTO {} (name, description, group_order) VALUES (?1, ?2, ?3)",
                    tables.groups
                ),
                params![group.name, group.description, group_order],
            )
            .map_err(db_err)?;
            Ok(FieldGroup {
                id: conn.last_insert_rowid(),
                name: group.name,
                description: group.description,
                group_order,
                fields: Vec::new(),
            })
        })
        .await
    }

    async fn create_field(&self, field: &NewField) -> XProfileResult<Field> {
        let field = field.clone();
        self.run(move |conn, tables| {
            let field_order: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COALESCE(MAX(field_order) + 1, 0) FROM {} \
                         WHERE group_id = ?1 AND parent_id = 0",
                        tables.fields
                    ),
                    params![field.group_id],
                    |row| row.get(0),
                )
                .map_err(db_err)?;
            conn.execute(
                &format!(
                    "INSERT INTO {} (group_id, parent_id, type, name, description, field_order) \
                     VALUES (?1, 0, ?2, ?3, ?4, ?5)",
                    tables.fields
                ),
                params![
                    field.group_id,
                    field.field_type.as_str(),
                    field.name,
                    field.description,
                    field_order
                ],
            )
            .map_err(db_err)?;
            Ok(Field {
                id: conn.last_insert_rowid(),
                group_id: field.group_id,
                parent_id: 0,
                field_type: field.field_type,
                name: field.name,
                description: field.description,
                field_order,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;

    #[tokio::test]
    async fn test_open_rejects_bad_prefix() {
        let err = SqliteFieldStore::open(":memory:", "bad prefix").unwrap_err();
        assert!(matches!(err, XProfileError::ConfigurationError(_)));
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = SqliteFieldStore::memory().unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
        assert!(store.field_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queries_fail_before_migrate() {
        let store = SqliteFieldStore::memory().unwrap();
        let err = store.max_option_order(1).await.unwrap_err();
        assert!(matches!(err, XProfileError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_create_field_requires_existing_group() {
        let store = SqliteFieldStore::memory().unwrap();
        store.migrate().await.unwrap();
        let err = store
            .create_field(&NewField {
                group_id: 42,
                field_type: FieldType::Selectbox,
                name: "Orphan".into(),
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, XProfileError::DatabaseError(_)));
    }
}
