//! Appending a batch of options to a field.
//!
//! [`OptionAppender::append_options`] reads the field's highest option order
//! and inserts one option per submitted line, numbered consecutively after
//! it. The read-then-insert sequence for one field runs under a per-field
//! async lock, so concurrent batches for the same field never receive the
//! same order values within a process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use xprofile_core::settings::OptionSettings;
use xprofile_core::{LineMode, XProfileError, XProfileResult};
use xprofile_db::{Field, FieldId, FieldOption, FieldType, NewFieldOption, ProfileFieldStore};

use crate::lines::split_lines;

/// The result of one append batch.
#[derive(Debug)]
pub struct AppendOutcome {
    /// The field the options were appended to.
    pub field_id: FieldId,
    /// Number of lines submitted after splitting.
    pub requested: usize,
    /// Number of options actually written.
    pub added: usize,
    /// The options written, in submission order.
    pub created: Vec<FieldOption>,
    /// One [`XProfileError::StoreWriteFailure`] per line that failed.
    pub failures: Vec<XProfileError>,
}

impl AppendOutcome {
    /// Returns `true` when every requested line was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.added == self.requested
    }
}

/// Appends options to choice fields through a [`ProfileFieldStore`].
pub struct OptionAppender {
    store: Arc<dyn ProfileFieldStore>,
    line_mode: LineMode,
    max_lines: usize,
    field_locks: Mutex<HashMap<FieldId, Arc<tokio::sync::Mutex<()>>>>,
}

impl OptionAppender {
    /// Creates an appender over `store` with the given option settings.
    pub fn new(store: Arc<dyn ProfileFieldStore>, options: &OptionSettings) -> Self {
        Self {
            store,
            line_mode: options.line_mode,
            max_lines: options.max_lines,
            field_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn ProfileFieldStore> {
        &self.store
    }

    /// Appends one option per line of `raw_text` to field `field_id`.
    ///
    /// New options get orders `max + 1, max + 2, ...` in line order, where
    /// `max` is the field's highest existing order (or 0). An insert that
    /// fails is recorded in [`AppendOutcome::failures`] and the batch carries
    /// on; its order value is left unused.
    ///
    /// # Errors
    ///
    /// Nothing is written when any of these is returned:
    ///
    /// - [`XProfileError::FieldNotFound`] for ids `<= 0`, unknown ids, and
    ///   option rows
    /// - [`XProfileError::FieldNotChoice`] for fields that take no options
    /// - [`XProfileError::EmptyOptions`] when no lines remain after splitting
    /// - [`XProfileError::ValidationError`] when the batch exceeds `max_lines`
    ///   or its orders would overflow `i64`
    /// - any store error raised while resolving the field or its order
    pub async fn append_options(
        &self,
        field_id: FieldId,
        raw_text: &str,
    ) -> XProfileResult<AppendOutcome> {
        if field_id <= 0 {
            return Err(XProfileError::FieldNotFound(field_id));
        }

        let lines = split_lines(raw_text, self.line_mode);
        if lines.is_empty() {
            return Err(XProfileError::EmptyOptions);
        }
        if lines.len() > self.max_lines {
            return Err(XProfileError::ValidationError(format!(
                "{} lines submitted; at most {} are allowed per batch",
                lines.len(),
                self.max_lines
            )));
        }

        let field = self.resolve_field(field_id).await?;
        let lock = self.field_lock(field.id);
        let _guard = lock.lock().await;

        let base = self.store.max_option_order(field.id).await?.unwrap_or(0);
        let last = i64::try_from(lines.len())
            .ok()
            .and_then(|count| base.checked_add(count))
            .ok_or_else(|| {
                XProfileError::ValidationError(format!(
                    "field {field_id} has no room for {} more option orders after {base}",
                    lines.len()
                ))
            })?;
        tracing::debug!(field_id, base, lines = lines.len(), "Appending options");

        let mut outcome = AppendOutcome {
            field_id,
            requested: lines.len(),
            added: 0,
            created: Vec::with_capacity(lines.len()),
            failures: Vec::new(),
        };

        for (order, (index, line)) in (base + 1..=last).zip(lines.into_iter().enumerate()) {
            let option = NewFieldOption::for_field(&field, line, order);
            match self.store.insert_option(&option).await {
                Ok(created) => {
                    outcome.added += 1;
                    outcome.created.push(created);
                }
                Err(e) => {
                    tracing::warn!(field_id, line = index + 1, order, error = %e, "Option insert failed");
                    outcome.failures.push(XProfileError::StoreWriteFailure {
                        line: index + 1,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            field_id,
            requested = outcome.requested,
            added = outcome.added,
            failures = outcome.failures.len(),
            "Options appended"
        );
        Ok(outcome)
    }

    async fn resolve_field(&self, field_id: FieldId) -> XProfileResult<Field> {
        let field = self
            .store
            .get_field(field_id)
            .await?
            .ok_or(XProfileError::FieldNotFound(field_id))?;
        if field.field_type == FieldType::Option {
            return Err(XProfileError::FieldNotFound(field_id));
        }
        if !field.field_type.accepts_options() {
            return Err(XProfileError::FieldNotChoice {
                id: field.id,
                field_type: field.field_type.to_string(),
            });
        }
        Ok(field)
    }

    fn field_lock(&self, field_id: FieldId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .field_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(field_id).or_default())
    }
}

impl std::fmt::Debug for OptionAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionAppender")
            .field("line_mode", &self.line_mode)
            .field("max_lines", &self.max_lines)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xprofile_db::{FieldSeeder, InMemoryFieldStore, NewField, NewFieldGroup};

    async fn setup(field_type: FieldType) -> (InMemoryFieldStore, Field) {
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

    fn appender(store: &InMemoryFieldStore) -> OptionAppender {
        OptionAppender::new(Arc::new(store.clone()), &OptionSettings::default())
    }

    fn orders(options: &[FieldOption]) -> Vec<(&str, i64)> {
        options
            .iter()
            .map(|o| (o.name.as_str(), o.option_order))
            .collect()
    }

    #[tokio::test]
    async fn test_first_batch_starts_at_one() {
        let (store, field) = setup(FieldType::Selectbox).await;
        let outcome = appender(&store)
            .append_options(field.id, "Red\nGreen")
            .await
            .unwrap();
        assert!(outcome.is_complete());
        assert_eq!(orders(&outcome.created), vec![("Red", 1), ("Green", 2)]);
    }

    #[tokio::test]
    async fn test_appends_after_existing_max() {
        let (store, field) = setup(FieldType::Radio).await;
        store.seed_option(&NewFieldOption::for_field(&field, "A", 1));
        store.seed_option(&NewFieldOption::for_field(&field, "B", 7));

        let outcome = appender(&store)
            .append_options(field.id, "C\nD")
            .await
            .unwrap();
        assert_eq!(outcome.requested, 2);
        assert_eq!(outcome.added, 2);
        assert_eq!(orders(&outcome.created), vec![("C", 8), ("D", 9)]);

        let all = store.options_for(field.id).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|o| o.group_id == field.group_id));
    }

    #[tokio::test]
    async fn test_not_idempotent() {
        let (store, field) = setup(FieldType::Checkbox).await;
        let appender = appender(&store);
        appender.append_options(field.id, "X\nY").await.unwrap();
        appender.append_options(field.id, "X\nY").await.unwrap();
        let all = store.options_for(field.id).await.unwrap();
        assert_eq!(orders(&all), vec![("X", 1), ("Y", 2), ("X", 3), ("Y", 4)]);
    }

    #[tokio::test]
    async fn test_non_positive_id_is_not_found() {
        let (store, _) = setup(FieldType::Selectbox).await;
        for id in [0, -3] {
            let err = appender(&store).append_options(id, "Red").await.unwrap_err();
            assert!(matches!(err, XProfileError::FieldNotFound(i) if i == id));
        }
        assert_eq!(store.option_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_field_is_not_found() {
        let (store, _) = setup(FieldType::Selectbox).await;
        let err = appender(&store).append_options(404, "Red").await.unwrap_err();
        assert!(matches!(err, XProfileError::FieldNotFound(404)));
        assert_eq!(store.option_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_option_row_is_not_found() {
        let (store, field) = setup(FieldType::Selectbox).await;
        let option = store.seed_option(&NewFieldOption::for_field(&field, "A", 1));
        let err = appender(&store)
            .append_options(option.id, "Red")
            .await
            .unwrap_err();
        assert!(matches!(err, XProfileError::FieldNotFound(_)));
    }

    #[tokio::test]
    async fn test_text_field_is_rejected() {
        let (store, field) = setup(FieldType::Textbox).await;
        let err = appender(&store)
            .append_options(field.id, "Red")
            .await
            .unwrap_err();
        assert!(matches!(err, XProfileError::FieldNotChoice { ref field_type, .. } if field_type == "textbox"));
        assert_eq!(store.option_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_writes_nothing() {
        let (store, field) = setup(FieldType::Selectbox).await;
        for text in ["", "   ", "\n\r\n  \n"] {
            let err = appender(&store)
                .append_options(field.id, text)
                .await
                .unwrap_err();
            assert!(matches!(err, XProfileError::EmptyOptions));
        }
        assert_eq!(store.option_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_max_lines_enforced_before_writing() {
        let (store, field) = setup(FieldType::Selectbox).await;
        let settings = OptionSettings {
            max_lines: 2,
            ..OptionSettings::default()
        };
        let appender = OptionAppender::new(Arc::new(store.clone()), &settings);
        let err = appender
            .append_options(field.id, "a\nb\nc")
            .await
            .unwrap_err();
        assert!(matches!(err, XProfileError::ValidationError(_)));
        assert_eq!(store.option_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_order_overflow_writes_nothing() {
        let (store, field) = setup(FieldType::Selectbox).await;
        store.seed_option(&NewFieldOption::for_field(&field, "Last", i64::MAX));
        let err = appender(&store)
            .append_options(field.id, "Next")
            .await
            .unwrap_err();
        assert!(matches!(err, XProfileError::ValidationError(_)));
        assert_eq!(store.option_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_may_end_at_max_order() {
        let (store, field) = setup(FieldType::Selectbox).await;
        store.seed_option(&NewFieldOption::for_field(&field, "A", i64::MAX - 2));
        let appender = appender(&store);
        let outcome = appender.append_options(field.id, "B\nC").await.unwrap();
        assert_eq!(
            orders(&outcome.created),
            vec![("B", i64::MAX - 1), ("C", i64::MAX)]
        );
        assert!(appender.append_options(field.id, "D").await.is_err());
        assert_eq!(store.option_insert_count(), 2);
    }

    #[tokio::test]
    async fn test_locks_only_kept_for_resolved_fields() {
        let (store, field) = setup(FieldType::Selectbox).await;
        let appender = appender(&store);
        for id in 100..150 {
            assert!(appender.append_options(id, "Red").await.is_err());
        }
        assert!(appender.field_locks.lock().unwrap().is_empty());

        appender.append_options(field.id, "Red").await.unwrap();
        appender.append_options(field.id, "Blue").await.unwrap();
        let locks = appender.field_locks.lock().unwrap();
        assert_eq!(locks.keys().copied().collect::<Vec<_>>(), vec![field.id]);
    }

    #[tokio::test]
    async fn test_verbatim_mode_blank_lines_take_slots() {
        let (store, field) = setup(FieldType::Selectbox).await;
        let settings = OptionSettings {
            line_mode: LineMode::Verbatim,
            ..OptionSettings::default()
        };
        let appender = OptionAppender::new(Arc::new(store.clone()), &settings);
        let outcome = appender
            .append_options(field.id, "Red\n\nBlue")
            .await
            .unwrap();
        assert_eq!(
            orders(&outcome.created),
            vec![("Red", 1), ("", 2), ("Blue", 3)]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_continues() {
        let (store, field) = setup(FieldType::Selectbox).await;
        store.fail_inserts_named("Green");
        let outcome = appender(&store)
            .append_options(field.id, "Red\nGreen\nBlue")
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.added, 2);
        assert_eq!(orders(&outcome.created), vec![("Red", 1), ("Blue", 3)]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0],
            XProfileError::StoreWriteFailure { line: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_batches_get_distinct_orders() {
        let (store, field) = setup(FieldType::Selectbox).await;
        let appender = Arc::new(appender(&store));

        let mut handles = Vec::new();
        for batch in 0..8 {
            let appender = Arc::clone(&appender);
            let field_id = field.id;
            handles.push(tokio::spawn(async move {
                let text = format!("b{batch}-1\nb{batch}-2\nb{batch}-3");
                appender.append_options(field_id, &text).await.unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_complete());
        }

        let mut all: Vec<i64> = store
            .options_for(field.id)
            .await
            .unwrap()
            .iter()
            .map(|o| o.option_order)
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=24).collect::<Vec<i64>>());
    }
}
