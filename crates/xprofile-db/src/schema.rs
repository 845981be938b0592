//! Table naming and DDL for the SQL layout.
//!
//! Two tables, both named with a configurable prefix:
//!
//! - `{prefix}xprofile_groups`
//! - `{prefix}xprofile_fields`, holding fields and their options
//!
//! The prefix is interpolated into SQL, so it is restricted to ASCII
//! alphanumerics and underscores.

use xprofile_core::XProfileError;

/// Resolved table names for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// The field groups table.
    pub groups: String,
    /// The fields (and options) table.
    pub fields: String,
}

impl TableNames {
    /// Builds table names for `prefix`, rejecting unsafe prefixes.
    ///
    /// # Examples
    ///
    /// ```
    /// use xprofile_db::schema::TableNames;
    ///
    /// let tables = TableNames::with_prefix("wp_bp_").unwrap();
    /// assert_eq!(tables.fields, "wp_bp_xprofile_fields");
    /// assert!(TableNames::with_prefix("x; DROP TABLE y").is_err());
    /// ```
    pub fn with_prefix(prefix: &str) -> Result<Self, XProfileError> {
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(XProfileError::ConfigurationError(format!(
                "Invalid table prefix '{prefix}': only ASCII letters, digits and '_' are allowed"
            )));
        }
        Ok(Self {
            groups: format!("{prefix}xprofile_groups"),
            fields: format!("{prefix}xprofile_fields"),
        })
    }

    /// Returns the `CREATE TABLE IF NOT EXISTS` statements for both tables.
    pub fn create_statements(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {groups} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                group_order INTEGER NOT NULL DEFAULT 0,
                can_delete INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS {fields} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                group_id INTEGER NOT NULL REFERENCES {groups}(id),
                parent_id INTEGER NOT NULL DEFAULT 0,
                type TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                is_required INTEGER NOT NULL DEFAULT 0,
                is_default_option INTEGER NOT NULL DEFAULT 0,
                field_order INTEGER NOT NULL DEFAULT 0,
                option_order INTEGER NOT NULL DEFAULT 0,
                can_delete INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS {fields}_parent_id ON {fields}(parent_id);
            CREATE INDEX IF NOT EXISTS {fields}_group_id ON {fields}(group_id);",
            groups = self.groups,
            fields = self.fields,
        )
    }
}
