use std::collections::HashMap;

use super::error::StoreError;
use super::ruleset_store::OptionStore;
use super::value::OptionValue;

/// Option store held in memory. Used for fixtures, tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryOptionStore {
    options: HashMap<String, OptionValue>,
}

impl MemoryOptionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object of option name to value. String values that hold a
    /// serialized payload are decoded, as if read from the options table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for invalid JSON, a non-object document, or a
    /// malformed serialized payload.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let doc: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(map) = doc else {
            return Err(StoreError::NotAnObject);
        };

        let mut options = HashMap::with_capacity(map.len());
        for (name, value) in map {
            let value = match value {
                serde_json::Value::String(raw) => OptionValue::from_stored(&raw)?,
                other => OptionValue::from(other),
            };
            options.insert(name, value);
        }
        Ok(Self { options })
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get_option(&self, name: &str) -> Option<OptionValue> {
        self.options.get(name).cloned()
    }

    fn update_option(&mut self, name: &str, value: OptionValue) -> Result<(), StoreError> {
        self.options.insert(name.to_owned(), value);
        Ok(())
    }

    fn delete_option(&mut self, name: &str) -> Result<(), StoreError> {
        self.options.remove(name);
        Ok(())
    }
}
