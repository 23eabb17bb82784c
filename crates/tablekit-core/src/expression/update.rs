//! Update mutations.

use std::collections::BTreeMap;

use tablekit_model::AttributeValue;

use super::placeholder::Placeholders;

/// What happens to one field in an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Overwrite with a value.
    Set(AttributeValue),
    /// Delete the attribute.
    Remove,
    /// Add one, starting from zero when absent.
    Increment,
    /// Append one element to a list, starting from an empty list when absent.
    /// The value is always a single element, so a list value becomes a nested
    /// list.
    Append(AttributeValue),
}

/// Field mutations of one update, at most one per field.
///
/// Registering a field again replaces its earlier mutation. Fields render in
/// name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    mutations: BTreeMap<String, Mutation>,
}

impl UpdateSpec {
    /// An empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mutation` for `field`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, mutation: Mutation) -> Self {
        self.insert(field, mutation);
        self
    }

    /// `SET field = value`.
    #[must_use]
    pub fn set(self, field: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.with(field, Mutation::Set(value.into()))
    }

    /// `REMOVE field`.
    #[must_use]
    pub fn remove(self, field: impl Into<String>) -> Self {
        self.with(field, Mutation::Remove)
    }

    /// Increment `field` by one.
    #[must_use]
    pub fn increment(self, field: impl Into<String>) -> Self {
        self.with(field, Mutation::Increment)
    }

    /// Append `value` as one element to the list in `field`.
    ///
    /// A list `value` is not spliced: appending `["a", "b"]` to `["x"]`
    /// yields `["x", ["a", "b"]]`.
    #[must_use]
    pub fn append(self, field: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.with(field, Mutation::Append(value.into()))
    }

    /// Register `mutation` for `field`, returning the one it replaced.
    pub fn insert(&mut self, field: impl Into<String>, mutation: Mutation) -> Option<Mutation> {
        self.mutations.insert(field.into(), mutation)
    }

    /// The mutation registered for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Mutation> {
        self.mutations.get(field)
    }

    /// `true` when no field is mutated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Number of mutated fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Fields and their mutations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Mutation)> {
        self.mutations.iter().map(|(f, m)| (f.as_str(), m))
    }

    /// Render as `SET ... REMOVE ...`; `None` when empty.
    pub fn render(&self, placeholders: &mut Placeholders) -> Option<String> {
        let mut sets = Vec::new();
        let mut removes = Vec::new();

        for (field, mutation) in &self.mutations {
            let name = placeholders.name(field);
            match mutation {
                Mutation::Set(value) => {
                    let value = placeholders.value(value.clone());
                    sets.push(format!("{name} = {value}"));
                }
                Mutation::Remove => removes.push(name),
                Mutation::Increment => {
                    let zero = placeholders.value(AttributeValue::number(0));
                    let one = placeholders.value(AttributeValue::number(1));
                    sets.push(format!("{name} = if_not_exists({name}, {zero}) + {one}"));
                }
                Mutation::Append(value) => {
                    let empty = placeholders.value(AttributeValue::L(Vec::new()));
                    let tail = placeholders.value(AttributeValue::L(vec![value.clone()]));
                    sets.push(format!(
                        "{name} = list_append(if_not_exists({name}, {empty}), {tail})"
                    ));
                }
            }
        }

        let mut clauses = Vec::with_capacity(2);
        if !sets.is_empty() {
            clauses.push(format!("SET {}", sets.join(", ")));
        }
        if !removes.is_empty() {
            clauses.push(format!("REMOVE {}", removes.join(", ")));
        }
        (!clauses.is_empty()).then(|| clauses.join(" "))
    }
}
