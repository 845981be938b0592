//! Profile field data model.
//!
//! Fields and their options share one record shape: an option is a field row
//! whose type is `option` and whose `parent_id` points at the owning field.
//! Top-level fields have `parent_id == 0`.

use serde::{Deserialize, Serialize};

/// Identifier of a field or option row.
pub type FieldId = i64;

/// The type tag of a field row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-choice dropdown.
    Selectbox,
    /// Multi-choice dropdown.
    Multiselectbox,
    /// Radio buttons.
    Radio,
    /// Checkboxes.
    Checkbox,
    /// Single-line text.
    Textbox,
    /// Multi-line text.
    Textarea,
    /// Number input.
    Number,
    /// URL input.
    Url,
    /// Date picker.
    Datebox,
    /// A choice value belonging to another field.
    Option,
    /// Any type tag this crate does not know about.
    Other(String),
}

impl FieldType {
    /// Returns the stored type tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Selectbox => "selectbox",
            Self::Multiselectbox => "multiselectbox",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Textbox => "textbox",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Url => "url",
            Self::Datebox => "datebox",
            Self::Option => "option",
            Self::Other(tag) => tag,
        }
    }

    /// Returns `true` for field types whose values are picked from options.
    pub const fn accepts_options(&self) -> bool {
        matches!(
            self,
            Self::Selectbox | Self::Multiselectbox | Self::Radio | Self::Checkbox
        )
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        match tag {
            "selectbox" => Self::Selectbox,
            "multiselectbox" => Self::Multiselectbox,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "textbox" => Self::Textbox,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "url" => Self::Url,
            "datebox" => Self::Datebox,
            "option" => Self::Option,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of fields, as shown on the profile edit screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// Group identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Position among groups.
    pub group_order: i64,
    /// Top-level fields in this group, in display order.
    pub fields: Vec<Field>,
}

/// A top-level profile field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field identifier.
    pub id: FieldId,
    /// Owning group.
    pub group_id: i64,
    /// Parent row; `0` for top-level fields.
    pub parent_id: FieldId,
    /// Type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Position within the group.
    pub field_order: i64,
}

/// One selectable value of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Row identifier, assigned by the store.
    pub id: FieldId,
    /// Group of the owning field.
    pub group_id: i64,
    /// The owning field.
    pub parent_id: FieldId,
    /// Display text.
    pub name: String,
    /// Display position among the field's options.
    pub option_order: i64,
}

/// Insert payload for a new option. The stored type is always `option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFieldOption {
    /// Group of the owning field.
    pub group_id: i64,
    /// The owning field.
    pub parent_id: FieldId,
    /// Display text.
    pub name: String,
    /// Display position.
    pub option_order: i64,
}

impl NewFieldOption {
    /// Builds the insert payload for an option of `field`.
    pub fn for_field(field: &Field, name: impl Into<String>, option_order: i64) -> Self {
        Self {
            group_id: field.group_id,
            parent_id: field.id,
            name: name.into(),
            option_order,
        }
    }

    /// The type tag stored for every option row.
    pub const fn field_type(&self) -> FieldType {
        FieldType::Option
    }
}

/// Insert payload for a new field group (fixtures only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFieldGroup {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Insert payload for a new top-level field (fixtures only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewField {
    /// Owning group.
    pub group_id: i64,
    /// Type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}
