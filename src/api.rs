use crate::error::Result;
use crate::manager::Manager;
use crate::resource::Resource;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// The result of transforming a resource: the shaped document, or nothing
/// when the resource produced no output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    value: Option<Value>,
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl From<Option<Value>> for Document {
    fn from(value: Option<Value>) -> Self {
        Self { value }
    }
}

impl Document {
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// Serializes the document into a pretty-printed JSON string. An empty
    /// document is `null`.
    ///
    /// # Errors
    /// Returns `FractalError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the document into a YAML string.
    ///
    /// # Errors
    /// Returns `FractalError::Yaml` if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Transforms `resource` with the manager's configuration, building the whole
/// include tree in memory.
///
/// This is the primary entry point; use [`Manager::create_data`] directly to
/// name the root scope or to stream a collection element by element.
///
/// # Errors
///
/// Returns the first error raised by a transformer, unchanged, or a contract
/// error if the resource was already consumed.
pub fn transform<'a>(manager: &'a Manager, resource: Resource<'a>) -> Result<Document> {
    let value = manager.create_data(resource, None, None).to_value()?;
    Ok(Document::from(value))
}

/// Same output as [`transform`], computed one collection element at a time.
///
/// # Errors
///
/// See [`transform`].
pub fn transform_streamed<'a>(manager: &'a Manager, resource: Resource<'a>) -> Result<Document> {
    let value = manager
        .create_data(resource, None, None)
        .to_value_streamed()?;
    Ok(Document::from(value))
}
