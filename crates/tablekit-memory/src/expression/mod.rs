//! The expression dialect rendered by `tablekit-core`, parsed and evaluated.
//!
//! Lexing and recursive-descent parsing produce an AST ([`ast`]); the
//! [`EvalContext`] then evaluates conditions, applies updates and projects
//! attributes against one item.

pub mod ast;
pub mod evaluator;
pub mod parser;

pub use ast::{AttributePath, Expr, UpdateExpr};
pub use evaluator::EvalContext;
pub use parser::{parse_condition, parse_projection, parse_update};
