//! Conditions and their rendering.
//!
//! Callers describe predicates as [`Condition`]s. They are lowered into a
//! small [`ConditionExpr`] tree (validating operators for the position they
//! are used in) and the tree is rendered with placeholders when the request
//! is built.

use std::fmt;
use std::str::FromStr;

use tablekit_model::AttributeValue;

use super::placeholder::Placeholders;
use crate::config::KeySchema;
use crate::error::{StoreError, StoreResult};

/// Supported comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Field equals operand.
    Equal,
    /// Field starts with the operand's string form.
    BeginsWith,
    /// Field is greater than or equal to operand.
    GreaterThanEqual,
}

impl Operator {
    /// Canonical operator name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::BeginsWith => "BeginsWith",
            Self::GreaterThanEqual => "GreaterThanEqual",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = StoreError;

    /// Accepts the canonical names and their expression-language spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Equal" | "=" => Ok(Self::Equal),
            "BeginsWith" | "begins_with" => Ok(Self::BeginsWith),
            "GreaterThanEqual" | ">=" => Ok(Self::GreaterThanEqual),
            other => Err(StoreError::unsupported(other, "operator name")),
        }
    }
}

/// A single predicate over one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Attribute the predicate reads.
    pub field: String,
    /// How the attribute is compared.
    pub operator: Operator,
    /// Right-hand side.
    pub operand: AttributeValue,
}

/// Conditions combined with AND, in order.
pub type ConditionList = Vec<Condition>;

impl Condition {
    /// Create a condition.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        operand: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: operand.into(),
        }
    }

    /// `field = operand`.
    #[must_use]
    pub fn equal(field: impl Into<String>, operand: impl Into<AttributeValue>) -> Self {
        Self::new(field, Operator::Equal, operand)
    }

    /// `begins_with(field, operand)`.
    #[must_use]
    pub fn begins_with(field: impl Into<String>, operand: impl Into<AttributeValue>) -> Self {
        Self::new(field, Operator::BeginsWith, operand)
    }

    /// `field >= operand`.
    #[must_use]
    pub fn greater_than_equal(
        field: impl Into<String>,
        operand: impl Into<AttributeValue>,
    ) -> Self {
        Self::new(field, Operator::GreaterThanEqual, operand)
    }

    /// Create a condition from an operator name.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperator` for names outside the supported set.
    pub fn from_parts(
        field: impl Into<String>,
        operator: &str,
        operand: impl Into<AttributeValue>,
    ) -> StoreResult<Self> {
        Ok(Self::new(field, operator.parse()?, operand))
    }
}

// ---------------------------------------------------------------------------
// Condition tree
// ---------------------------------------------------------------------------

/// Binary comparators that can appear in a rendered condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `=`
    Eq,
    /// `>=`
    Ge,
}

impl Comparator {
    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ge => ">=",
        }
    }
}

/// A validated condition, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    /// `field <op> value`
    Compare {
        /// Attribute name.
        field: String,
        /// Comparator.
        comparator: Comparator,
        /// Right-hand side.
        operand: AttributeValue,
    },
    /// `begins_with(field, prefix)`
    BeginsWith {
        /// Attribute name.
        field: String,
        /// String prefix.
        prefix: String,
    },
    /// `attribute_not_exists(field)`
    AttributeNotExists {
        /// Attribute name.
        field: String,
    },
    /// `(a) AND (b) AND ...`
    And(Vec<ConditionExpr>),
}

impl ConditionExpr {
    /// Render with placeholders allocated from `placeholders`.
    pub fn render(&self, placeholders: &mut Placeholders) -> String {
        match self {
            Self::Compare {
                field,
                comparator,
                operand,
            } => {
                let name = placeholders.name(field);
                let value = placeholders.value(operand.clone());
                format!("{name} {} {value}", comparator.symbol())
            }
            Self::BeginsWith { field, prefix } => {
                let name = placeholders.name(field);
                let value = placeholders.value(AttributeValue::S(prefix.clone()));
                format!("begins_with({name}, {value})")
            }
            Self::AttributeNotExists { field } => {
                format!("attribute_not_exists({})", placeholders.name(field))
            }
            Self::And(clauses) => clauses
                .iter()
                .map(|c| format!("({})", c.render(placeholders)))
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }

    /// Number of leaf clauses.
    #[must_use]
    pub fn clause_count(&self) -> usize {
        match self {
            Self::And(clauses) => clauses.iter().map(Self::clause_count).sum(),
            _ => 1,
        }
    }

    fn all(mut clauses: Vec<ConditionExpr>) -> Option<Self> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Self::And(clauses)),
        }
    }
}

/// String form of a `begins_with` operand.
///
/// Scalars render the way the backend would print them; sets, lists, maps and
/// binaries have no prefix form.
fn prefix_operand(operand: &AttributeValue, context: &'static str) -> StoreResult<String> {
    match operand {
        AttributeValue::S(s) | AttributeValue::N(s) => Ok(s.clone()),
        AttributeValue::Bool(b) => Ok(b.to_string()),
        other => Err(StoreError::unsupported(
            format!("BeginsWith({})", other.type_descriptor()),
            context,
        )),
    }
}

fn lower(condition: &Condition, context: &'static str) -> StoreResult<ConditionExpr> {
    let field = condition.field.clone();
    Ok(match condition.operator {
        Operator::Equal => ConditionExpr::Compare {
            field,
            comparator: Comparator::Eq,
            operand: condition.operand.clone(),
        },
        Operator::GreaterThanEqual => ConditionExpr::Compare {
            field,
            comparator: Comparator::Ge,
            operand: condition.operand.clone(),
        },
        Operator::BeginsWith => ConditionExpr::BeginsWith {
            field,
            prefix: prefix_operand(&condition.operand, context)?,
        },
    })
}

/// Key condition: partition equality plus an optional sort predicate.
///
/// The sort predicate always targets the schema's sort key; only `Equal` and
/// `BeginsWith` are allowed there.
///
/// # Errors
///
/// Returns `UnsupportedOperator` for any other sort operator.
pub fn key_condition(
    schema: &KeySchema,
    partition_key: &str,
    sort: Option<&Condition>,
) -> StoreResult<ConditionExpr> {
    const CONTEXT: &str = "sort key condition";

    let partition = ConditionExpr::Compare {
        field: schema.partition_key.clone(),
        comparator: Comparator::Eq,
        operand: AttributeValue::S(partition_key.to_owned()),
    };
    let Some(sort) = sort else {
        return Ok(partition);
    };

    let sort_clause = match sort.operator {
        Operator::Equal | Operator::BeginsWith => lower(
            &Condition {
                field: schema.sort_key.clone(),
                operator: sort.operator,
                operand: sort.operand.clone(),
            },
            CONTEXT,
        )?,
        Operator::GreaterThanEqual => {
            return Err(StoreError::unsupported(sort.operator.as_str(), CONTEXT));
        }
    };
    Ok(ConditionExpr::And(vec![partition, sort_clause]))
}

/// AND of all conditions in order; `None` for an empty list.
///
/// # Errors
///
/// Returns `UnsupportedOperator` when any condition cannot be rendered; no
/// partial expression is produced.
pub fn all_of(conditions: &[Condition], context: &'static str) -> StoreResult<Option<ConditionExpr>> {
    let clauses = conditions
        .iter()
        .map(|c| lower(c, context))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(ConditionExpr::all(clauses))
}

/// `attribute_not_exists` on every given field, AND-ed.
#[must_use]
pub fn attributes_absent<S: AsRef<str>>(fields: &[S]) -> Option<ConditionExpr> {
    ConditionExpr::all(
        fields
            .iter()
            .map(|f| ConditionExpr::AttributeNotExists {
                field: f.as_ref().to_owned(),
            })
            .collect(),
    )
}
