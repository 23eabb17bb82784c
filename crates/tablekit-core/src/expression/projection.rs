//! Projection lists.

use super::placeholder::Placeholders;

/// Attributes to return, in order. Empty means the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionSpec {
    fields: Vec<String>,
}

impl ProjectionSpec {
    /// Build from field names; later duplicates are dropped.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::default();
        for field in fields {
            spec.push(field);
        }
        spec
    }

    /// Add a field unless it is already present.
    pub fn push(&mut self, field: impl Into<String>) {
        let field = field.into();
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    /// `true` when the whole record is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field names in order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Render as `#n0, #n1, ...`; `None` when empty.
    pub fn render(&self, placeholders: &mut Placeholders) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }
        let names: Vec<String> = self.fields.iter().map(|f| placeholders.name(f)).collect();
        Some(names.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for ProjectionSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
