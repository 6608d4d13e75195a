//! Owner capability
//!
//! Attachments keep no metadata of their own. Size, extension and identifier
//! are read from and written to the owning record through this trait, so one
//! attachment implementation serves any number of record types.

use std::fmt;

/// Metadata fields an owner stores for each of its attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachmentField {
    /// Sanitized original filename of the upload
    Identifier,
    /// Original extension with its leading dot, or empty
    Extension,
    /// Byte length of the original upload
    Size,
}

impl AttachmentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentField::Identifier => "identifier",
            AttachmentField::Extension => "extension",
            AttachmentField::Size => "size",
        }
    }

    /// Column name conventionally used for this field, e.g. `avatar_size`.
    pub fn column_name(&self, attachment: &str) -> String {
        format!("{}_{}", attachment, self.as_str())
    }
}

impl fmt::Display for AttachmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Size(u64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Size(_) => None,
        }
    }

    pub fn as_size(&self) -> Option<u64> {
        match self {
            FieldValue::Size(size) => Some(*size),
            FieldValue::Text(_) => None,
        }
    }
}

/// Implemented by any record that carries attachments.
pub trait AttachmentOwner {
    /// Record identifier substituted for `:id` in path templates
    fn id(&self) -> String;

    fn get_attachment_field(&self, name: &str, field: AttachmentField) -> Option<FieldValue>;

    fn set_attachment_field(&mut self, name: &str, field: AttachmentField, value: FieldValue);
}
