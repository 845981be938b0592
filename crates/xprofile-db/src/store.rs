//! Store traits.
//!
//! [`ProfileFieldStore`] is everything the option appender and the admin page
//! need: list fields, resolve one, read the highest option order, insert an
//! option. [`FieldSeeder`] adds the group/field creation used by fixtures and
//! tests; the appender never calls it.

use async_trait::async_trait;
use xprofile_core::XProfileResult;

use crate::models::{
    Field, FieldGroup, FieldId, FieldOption, NewField, NewFieldGroup, NewFieldOption,
};

/// Read/write access to profile fields and their options.
///
/// Implementations must be cheap to share behind an `Arc` and safe to call
/// from concurrent requests. None of the methods holds a lock across calls;
/// callers that need read-then-write atomicity must serialise themselves.
#[async_trait]
pub trait ProfileFieldStore: Send + Sync {
    /// Returns the non-empty field groups with their top-level fields.
    ///
    /// Groups are ordered by `group_order` then id; fields by `field_order`
    /// then id. Option rows are never included.
    async fn field_groups(&self) -> XProfileResult<Vec<FieldGroup>>;

    /// Looks up a row by id. Returns `None` when no row has that id.
    ///
    /// Option rows are returned too (with type [`FieldType::Option`]); callers
    /// decide whether that is acceptable.
    ///
    /// [`FieldType::Option`]: crate::models::FieldType::Option
    async fn get_field(&self, id: FieldId) -> XProfileResult<Option<Field>>;

    /// Returns the highest `option_order` among the options of `field_id`,
    /// or `None` when the field has no options.
    async fn max_option_order(&self, field_id: FieldId) -> XProfileResult<Option<i64>>;

    /// Inserts one option row and returns it with its assigned id.
    async fn insert_option(&self, option: &NewFieldOption) -> XProfileResult<FieldOption>;

    /// Returns the options of `field_id` ordered by `option_order` then id.
    async fn options_for(&self, field_id: FieldId) -> XProfileResult<Vec<FieldOption>>;
}

/// Creation of groups and fields, for fixtures and tests.
#[async_trait]
pub trait FieldSeeder: ProfileFieldStore {
    /// Creates a field group, appended after existing groups.
    async fn create_group(&self, group: &NewFieldGroup) -> XProfileResult<FieldGroup>;

    /// Creates a top-level field, appended after the group's existing fields.
    async fn create_field(&self, field: &NewField) -> XProfileResult<Field>;
}
