//! Placeholder allocation shared by all expressions of one request.

use std::collections::HashMap;

use tablekit_model::AttributeValue;
use tablekit_model::types::{ExpressionAttributeNames, ExpressionAttributeValues};

/// Allocates `#nK` name and `:vK` value placeholders.
///
/// Names are deduplicated: the same attribute always maps to the same
/// placeholder. Values are not; every occurrence gets its own slot.
#[derive(Debug, Default)]
pub struct Placeholders {
    by_attribute: HashMap<String, String>,
    names: ExpressionAttributeNames,
    values: ExpressionAttributeValues,
}

impl Placeholders {
    /// Placeholder for an attribute name.
    pub fn name(&mut self, attribute: &str) -> String {
        if let Some(existing) = self.by_attribute.get(attribute) {
            return existing.clone();
        }
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), attribute.to_owned());
        self.by_attribute
            .insert(attribute.to_owned(), placeholder.clone());
        placeholder
    }

    /// Placeholder for a value.
    pub fn value(&mut self, value: AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value);
        placeholder
    }

    /// The name and value tables.
    #[must_use]
    pub fn into_parts(self) -> (ExpressionAttributeNames, ExpressionAttributeValues) {
        (self.names, self.values)
    }
}
