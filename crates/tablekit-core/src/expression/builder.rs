//! Assembles the expressions of one request over a shared placeholder table.

use tablekit_model::types::{ExpressionAttributeNames, ExpressionAttributeValues};

use super::condition::ConditionExpr;
use super::placeholder::Placeholders;
use super::projection::ProjectionSpec;
use super::update::UpdateSpec;

/// Rendered expressions plus the placeholder tables they reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    /// Key condition of a query.
    pub key_condition: Option<String>,
    /// Post-read filter of a query.
    pub filter: Option<String>,
    /// Write precondition.
    pub condition: Option<String>,
    /// Attributes to return.
    pub projection: Option<String>,
    /// `SET ... REMOVE ...` expression.
    pub update: Option<String>,
    /// `#nK` to attribute names.
    pub names: ExpressionAttributeNames,
    /// `:vK` to values.
    pub values: ExpressionAttributeValues,
}

/// Collects the parts of a request and renders them together.
///
/// Parts render in a fixed order (key condition, filter, condition,
/// projection, update), so placeholder numbering is deterministic.
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    key_condition: Option<ConditionExpr>,
    filter: Option<ConditionExpr>,
    condition: Option<ConditionExpr>,
    projection: ProjectionSpec,
    update: UpdateSpec,
}

impl ExpressionBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key condition.
    #[must_use]
    pub fn key_condition(mut self, expr: ConditionExpr) -> Self {
        self.key_condition = Some(expr);
        self
    }

    /// Set the filter; `None` leaves it unset.
    #[must_use]
    pub fn filter(mut self, expr: Option<ConditionExpr>) -> Self {
        self.filter = expr;
        self
    }

    /// Set the write precondition; `None` leaves it unset.
    #[must_use]
    pub fn condition(mut self, expr: Option<ConditionExpr>) -> Self {
        self.condition = expr;
        self
    }

    /// Set the projection.
    #[must_use]
    pub fn projection(mut self, projection: ProjectionSpec) -> Self {
        self.projection = projection;
        self
    }

    /// Set the update.
    #[must_use]
    pub fn update(mut self, update: UpdateSpec) -> Self {
        self.update = update;
        self
    }

    /// Render every part that was set.
    #[must_use]
    pub fn build(self) -> Expression {
        let mut placeholders = Placeholders::default();
        let key_condition = self
            .key_condition
            .map(|e| e.render(&mut placeholders));
        let filter = self.filter.map(|e| e.render(&mut placeholders));
        let condition = self.condition.map(|e| e.render(&mut placeholders));
        let projection = self.projection.render(&mut placeholders);
        let update = self.update.render(&mut placeholders);
        let (names, values) = placeholders.into_parts();

        Expression {
            key_condition,
            filter,
            condition,
            projection,
            update,
            names,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use tablekit_model::AttributeValue;

    use super::*;
    use crate::config::KeySchema;
    use crate::expression::condition::{Condition, all_of, key_condition};

    #[test]
    fn test_should_share_placeholders_across_parts() {
        let schema = KeySchema::default();
        let expr = ExpressionBuilder::new()
            .key_condition(key_condition(&schema, "user#1", None).unwrap())
            .filter(all_of(&[Condition::equal("status", "open")], "filter").unwrap())
            .projection(ProjectionSpec::new(["status", "total"]))
            .build();

        assert_eq!(expr.key_condition.as_deref(), Some("#n0 = :v0"));
        assert_eq!(expr.filter.as_deref(), Some("#n1 = :v1"));
        assert_eq!(expr.projection.as_deref(), Some("#n1, #n2"));
        assert!(expr.condition.is_none());
        assert!(expr.update.is_none());
        assert_eq!(expr.names.len(), 3);
        assert_eq!(expr.values[":v1"], AttributeValue::from("open"));
    }

    #[test]
    fn test_should_build_empty_expression() {
        let expr = ExpressionBuilder::new().build();
        assert_eq!(expr, Expression::default());
    }
}
