//! Ordered multipart form model.
//!
//! A [`FormBody`] is the transport-neutral view of a multipart body: a list
//! of named fields in transport order where the same name may repeat. The
//! client turns it into a real multipart request and the server builds one
//! from an incoming multipart stream, so the codec never touches raw
//! multipart bytes.

use super::file::ActionFile;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File(ActionFile),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&ActionFile> {
        match self {
            FieldValue::File(file) => Some(file),
            FieldValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

/// Multipart fields in transport order.
///
/// # Example
///
/// ```
/// use edgeaction_common::{ActionFile, FormBody};
///
/// let mut form = FormBody::new();
/// form.append_file("FILES_1", ActionFile::new("a.txt", "a"));
/// form.append_file("FILES_1", ActionFile::new("b.txt", "b"));
/// form.append_text("JSON_2", "42");
///
/// assert_eq!(form.len(), 3);
/// assert_eq!(form.get_all("FILES_1").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    fields: Vec<FormField>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push(FormField {
            name: name.into(),
            value,
        });
    }

    pub fn append_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.append(name, FieldValue::Text(text.into()));
    }

    pub fn append_file(&mut self, name: impl Into<String>, file: ActionFile) {
        self.append(name, FieldValue::File(file));
    }

    /// First value registered under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Every value registered under `name`, in transport order.
    pub fn get_all(&self, name: &str) -> Vec<&FieldValue> {
        self.fields
            .iter()
            .filter(|field| field.name == name)
            .map(|field| &field.value)
            .collect()
    }

    /// Field names in transport order, repeats included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for FormBody {
    type Item = FormField;
    type IntoIter = std::vec::IntoIter<FormField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FormBody {
    type Item = &'a FormField;
    type IntoIter = std::slice::Iter<'a, FormField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
