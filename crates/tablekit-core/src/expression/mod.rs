//! Expression building.
//!
//! Pure functions from structured request parts to the store's expression
//! language. Nothing here touches the network:
//!
//! 1. **Lowering**: caller [`Condition`]s become a validated [`ConditionExpr`]
//!    tree; operators that are not allowed at their position fail here with
//!    `UnsupportedOperator`.
//! 2. **Rendering**: the [`ExpressionBuilder`] renders every part of a request
//!    over one shared [`Placeholders`] table.

pub mod builder;
pub mod condition;
pub mod placeholder;
pub mod projection;
pub mod update;

pub use builder::{Expression, ExpressionBuilder};
pub use condition::{
    Comparator, Condition, ConditionExpr, ConditionList, Operator, all_of, attributes_absent,
    key_condition,
};
pub use placeholder::Placeholders;
pub use projection::ProjectionSpec;
pub use update::{Mutation, UpdateSpec};
