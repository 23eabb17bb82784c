//! Syntax tree for the expression dialect understood by the memory engine.
//!
//! Condition, key-condition and filter expressions parse into [`Expr`];
//! update expressions into [`UpdateExpr`]; projections into a list of
//! [`AttributePath`]s.

use std::fmt;

/// A boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left op right`.
    Compare {
        /// Left-hand operand.
        left: Operand,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Operand,
    },
    /// `left AND right` or `left OR right`.
    Logical {
        /// Connective.
        op: LogicalOp,
        /// Left-hand expression.
        left: Box<Expr>,
        /// Right-hand expression.
        right: Box<Expr>,
    },
    /// `NOT expr`.
    Not(Box<Expr>),
    /// `function(args...)`.
    Function {
        /// Function name.
        name: FunctionName,
        /// Arguments in call order.
        args: Vec<Operand>,
    },
}

impl Expr {
    /// Visit this expression and every `AND` operand below it.
    ///
    /// `OR` and `NOT` subtrees are yielded whole, never descended into.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Self::Logical {
                op: LogicalOp::And,
                left,
                right,
            } => {
                let mut all = left.conjuncts();
                all.extend(right.conjuncts());
                all
            }
            other => vec![other],
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        })
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

/// Functions usable as conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    /// `attribute_exists(path)`
    AttributeExists,
    /// `attribute_not_exists(path)`
    AttributeNotExists,
    /// `begins_with(path, prefix)`
    BeginsWith,
    /// `contains(path, operand)`
    Contains,
}

impl FunctionName {
    /// Name as written in an expression.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttributeExists => "attribute_exists",
            Self::AttributeNotExists => "attribute_not_exists",
            Self::BeginsWith => "begins_with",
            Self::Contains => "contains",
        }
    }

    /// Number of arguments the function takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::AttributeExists | Self::AttributeNotExists => 1,
            Self::BeginsWith | Self::Contains => 2,
        }
    }
}

/// A value-producing term.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A document path into the item.
    Path(AttributePath),
    /// A `:placeholder`, stored with its colon.
    Value(String),
}

/// A path such as `#n0`, `info.rating` or `lines[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// Path segments from the top-level attribute down.
    pub elements: Vec<PathElement>,
}

impl AttributePath {
    /// A single top-level attribute.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            elements: vec![PathElement::Attribute(name.into())],
        }
    }
}

/// One path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// A map key or top-level attribute; `#placeholders` keep their hash.
    Attribute(String),
    /// A list index.
    Index(usize),
}

/// A parsed update expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpr {
    /// `SET` assignments in written order.
    pub set_actions: Vec<SetAction>,
    /// `REMOVE` targets in written order.
    pub remove_paths: Vec<AttributePath>,
}

impl UpdateExpr {
    /// Whether the expression has no action at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_actions.is_empty() && self.remove_paths.is_empty()
    }
}

/// `path = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetAction {
    /// Target.
    pub path: AttributePath,
    /// Right-hand side.
    pub value: SetValue,
}

/// Right-hand side of a `SET` assignment.
///
/// Function terms nest: `list_append(if_not_exists(#l, :empty), :tail)` and
/// `if_not_exists(#c, :zero) + :one` are both valid.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    /// A plain operand.
    Operand(Operand),
    /// `a + b`
    Plus(Box<SetValue>, Box<SetValue>),
    /// `a - b`
    Minus(Box<SetValue>, Box<SetValue>),
    /// `if_not_exists(path, fallback)`
    IfNotExists(AttributePath, Operand),
    /// `list_append(a, b)`
    ListAppend(Box<SetValue>, Box<SetValue>),
}
