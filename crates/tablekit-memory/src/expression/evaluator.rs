//! Evaluation of parsed expressions against one item.
//!
//! Placeholders are resolved through the request's name and value maps.
//! Every `SET` right-hand side is evaluated against the item as it was before
//! the update, so `SET a = :x, b = a` copies the old `a`.

use std::cmp::Ordering;

use tablekit_model::AttributeValue;
use tablekit_model::types::{ExpressionAttributeNames, ExpressionAttributeValues, Item};

use super::ast::{
    AttributePath, CompareOp, Expr, FunctionName, LogicalOp, Operand, PathElement, SetValue,
    UpdateExpr,
};
use crate::error::ExpressionError;

/// An item bound to the placeholder maps of one request.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// The item under evaluation; empty when no item is stored yet.
    pub item: &'a Item,
    /// `#name` substitutions.
    pub names: &'a ExpressionAttributeNames,
    /// `:value` substitutions.
    pub values: &'a ExpressionAttributeValues,
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

impl<'a> EvalContext<'a> {
    /// Evaluate a condition to a boolean.
    ///
    /// Comparisons against a missing attribute are false.
    ///
    /// # Errors
    ///
    /// `ExpressionError` for unresolved placeholders or ill-typed operands.
    pub fn evaluate(&self, expr: &Expr) -> Result<bool, ExpressionError> {
        match expr {
            Expr::Compare { left, op, right } => {
                let (Some(left), Some(right)) =
                    (self.resolve_operand(left)?, self.resolve_operand(right)?)
                else {
                    return Ok(false);
                };
                compare_values(left, right, *op)
            }
            Expr::Logical { op, left, right } => match op {
                LogicalOp::And => Ok(self.evaluate(left)? && self.evaluate(right)?),
                LogicalOp::Or => Ok(self.evaluate(left)? || self.evaluate(right)?),
            },
            Expr::Not(inner) => self.evaluate(inner).map(|holds| !holds),
            Expr::Function { name, args } => self.eval_function(*name, args),
        }
    }

    fn eval_function(&self, name: FunctionName, args: &[Operand]) -> Result<bool, ExpressionError> {
        let [target, rest @ ..] = args else {
            return Err(ExpressionError::InvalidOperand {
                operation: name.as_str(),
                message: "missing arguments".to_owned(),
            });
        };
        let Operand::Path(path) = target else {
            return Err(ExpressionError::InvalidOperand {
                operation: name.as_str(),
                message: "first argument must be an attribute path".to_owned(),
            });
        };
        let attribute = self.resolve_path(path)?;

        match name {
            FunctionName::AttributeExists => Ok(attribute.is_some()),
            FunctionName::AttributeNotExists => Ok(attribute.is_none()),
            FunctionName::BeginsWith | FunctionName::Contains => {
                let [needle] = rest else {
                    return Err(ExpressionError::InvalidOperand {
                        operation: name.as_str(),
                        message: "expected two arguments".to_owned(),
                    });
                };
                let (Some(attribute), Some(needle)) = (attribute, self.resolve_operand(needle)?)
                else {
                    return Ok(false);
                };
                if name == FunctionName::BeginsWith {
                    begins_with(attribute, needle)
                } else {
                    Ok(contains(attribute, needle))
                }
            }
        }
    }
}

fn begins_with(
    attribute: &AttributeValue,
    prefix: &AttributeValue,
) -> Result<bool, ExpressionError> {
    match (attribute, prefix) {
        (AttributeValue::S(s), AttributeValue::S(p)) => Ok(s.starts_with(p.as_str())),
        (AttributeValue::B(b), AttributeValue::B(p)) => Ok(b.starts_with(p)),
        (_, AttributeValue::S(_) | AttributeValue::B(_)) => Ok(false),
        (_, other) => Err(ExpressionError::TypeMismatch {
            message: format!("begins_with prefix must be S or B, got {}", other.type_descriptor()),
        }),
    }
}

fn contains(attribute: &AttributeValue, needle: &AttributeValue) -> bool {
    match (attribute, needle) {
        (AttributeValue::S(s), AttributeValue::S(sub)) => s.contains(sub.as_str()),
        (AttributeValue::Ss(set), AttributeValue::S(member))
        | (AttributeValue::Ns(set), AttributeValue::N(member)) => set.contains(member),
        (AttributeValue::Bs(set), AttributeValue::B(member)) => set.contains(member),
        (AttributeValue::L(list), member) => list.contains(member),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl<'a> EvalContext<'a> {
    /// Resolve an operand; `None` when a path does not exist in the item.
    ///
    /// # Errors
    ///
    /// `UnresolvedValue` / `UnresolvedName` for unknown placeholders.
    pub fn resolve_operand(
        &self,
        operand: &Operand,
    ) -> Result<Option<&'a AttributeValue>, ExpressionError> {
        match operand {
            Operand::Path(path) => self.resolve_path(path),
            Operand::Value(name) => self
                .values
                .get(name)
                .map(Some)
                .ok_or_else(|| ExpressionError::UnresolvedValue { name: name.clone() }),
        }
    }

    /// Walk a document path through maps and lists.
    ///
    /// # Errors
    ///
    /// `UnresolvedName` for an unknown `#placeholder`.
    pub fn resolve_path(
        &self,
        path: &AttributePath,
    ) -> Result<Option<&'a AttributeValue>, ExpressionError> {
        let mut current: Option<&'a AttributeValue> = None;
        for (depth, element) in path.elements.iter().enumerate() {
            current = match (element, current) {
                (PathElement::Attribute(name), _) if depth == 0 => {
                    self.item.get(self.resolve_name(name)?)
                }
                (PathElement::Attribute(name), Some(AttributeValue::M(map))) => {
                    map.get(self.resolve_name(name)?)
                }
                (PathElement::Index(index), Some(AttributeValue::L(list))) => list.get(*index),
                _ => None,
            };
            if current.is_none() {
                return Ok(None);
            }
        }
        Ok(current)
    }

    /// Substitute a `#placeholder`; plain names pass through.
    ///
    /// # Errors
    ///
    /// `UnresolvedName` if the placeholder is not in the name map.
    pub fn resolve_name<'s>(&'s self, name: &'s str) -> Result<&'s str, ExpressionError> {
        if name.starts_with('#') {
            self.names
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| ExpressionError::UnresolvedName {
                    name: name.to_owned(),
                })
        } else {
            Ok(name)
        }
    }

    fn required(
        &self,
        operand: &Operand,
        operation: &'static str,
    ) -> Result<&'a AttributeValue, ExpressionError> {
        self.resolve_operand(operand)?
            .ok_or_else(|| ExpressionError::InvalidOperand {
                operation,
                message: "the expression refers to an attribute that does not exist in the item"
                    .to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

impl EvalContext<'_> {
    /// Apply an update to a copy of the item and return the copy.
    ///
    /// # Errors
    ///
    /// `ExpressionError` if an operand is missing or ill-typed, or a nested
    /// target's parent does not exist.
    pub fn apply_update(&self, update: &UpdateExpr) -> Result<Item, ExpressionError> {
        let mut result = self.item.clone();
        for action in &update.set_actions {
            let value = self.resolve_set_value(&action.value)?;
            self.assign(&mut result, &action.path, value)?;
        }
        for path in &update.remove_paths {
            self.remove(&mut result, path)?;
        }
        Ok(result)
    }

    fn resolve_set_value(&self, value: &SetValue) -> Result<AttributeValue, ExpressionError> {
        match value {
            SetValue::Operand(operand) => self.required(operand, "SET").cloned(),
            SetValue::Plus(left, right) => numeric_arithmetic(
                &self.resolve_set_value(left)?,
                &self.resolve_set_value(right)?,
                Arithmetic::Add,
            ),
            SetValue::Minus(left, right) => numeric_arithmetic(
                &self.resolve_set_value(left)?,
                &self.resolve_set_value(right)?,
                Arithmetic::Subtract,
            ),
            SetValue::IfNotExists(path, fallback) => match self.resolve_path(path)? {
                Some(existing) => Ok(existing.clone()),
                None => self.required(fallback, "if_not_exists").cloned(),
            },
            SetValue::ListAppend(head, tail) => {
                match (self.resolve_set_value(head)?, self.resolve_set_value(tail)?) {
                    (AttributeValue::L(mut head), AttributeValue::L(tail)) => {
                        head.extend(tail);
                        Ok(AttributeValue::L(head))
                    }
                    (head, tail) => Err(ExpressionError::TypeMismatch {
                        message: format!(
                            "list_append needs two lists, got {} and {}",
                            head.type_descriptor(),
                            tail.type_descriptor()
                        ),
                    }),
                }
            }
        }
    }

    fn assign(
        &self,
        item: &mut Item,
        path: &AttributePath,
        value: AttributeValue,
    ) -> Result<(), ExpressionError> {
        let (top, rest) = self.split_top(path, "SET")?;
        if rest.is_empty() {
            item.insert(top.to_owned(), value);
            return Ok(());
        }
        let slot = item.get_mut(top).ok_or_else(|| missing_parent("SET"))?;
        self.assign_nested(slot, rest, value)
    }

    fn assign_nested(
        &self,
        slot: &mut AttributeValue,
        path: &[PathElement],
        value: AttributeValue,
    ) -> Result<(), ExpressionError> {
        let Some((element, rest)) = path.split_first() else {
            *slot = value;
            return Ok(());
        };
        match (element, slot) {
            (PathElement::Attribute(name), AttributeValue::M(map)) => {
                let name = self.resolve_name(name)?;
                if rest.is_empty() {
                    map.insert(name.to_owned(), value);
                    return Ok(());
                }
                let child = map.get_mut(name).ok_or_else(|| missing_parent("SET"))?;
                self.assign_nested(child, rest, value)
            }
            (PathElement::Index(index), AttributeValue::L(list)) => {
                if rest.is_empty() && *index >= list.len() {
                    list.push(value);
                    return Ok(());
                }
                let child = list.get_mut(*index).ok_or_else(|| missing_parent("SET"))?;
                self.assign_nested(child, rest, value)
            }
            _ => Err(shape_mismatch("SET")),
        }
    }

    fn remove(&self, item: &mut Item, path: &AttributePath) -> Result<(), ExpressionError> {
        let (top, rest) = self.split_top(path, "REMOVE")?;
        let Some((last, parents)) = rest.split_last() else {
            item.remove(top);
            return Ok(());
        };
        let mut slot = item.get_mut(top);
        for element in parents {
            slot = match (element, slot) {
                (PathElement::Attribute(name), Some(AttributeValue::M(map))) => {
                    map.get_mut(self.resolve_name(name)?)
                }
                (PathElement::Index(index), Some(AttributeValue::L(list))) => list.get_mut(*index),
                _ => None,
            };
        }
        match (last, slot) {
            (PathElement::Attribute(name), Some(AttributeValue::M(map))) => {
                map.remove(self.resolve_name(name)?);
            }
            (PathElement::Index(index), Some(AttributeValue::L(list))) if *index < list.len() => {
                list.remove(*index);
            }
            _ => {}
        }
        Ok(())
    }

    fn split_top<'p>(
        &'p self,
        path: &'p AttributePath,
        operation: &'static str,
    ) -> Result<(&'p str, &'p [PathElement]), ExpressionError> {
        match path.elements.split_first() {
            Some((PathElement::Attribute(name), rest)) => Ok((self.resolve_name(name)?, rest)),
            _ => Err(ExpressionError::InvalidOperand {
                operation,
                message: "path must start with an attribute name".to_owned(),
            }),
        }
    }
}

fn missing_parent(operation: &'static str) -> ExpressionError {
    ExpressionError::InvalidOperand {
        operation,
        message: "the document path does not exist in the item".to_owned(),
    }
}

fn shape_mismatch(operation: &'static str) -> ExpressionError {
    ExpressionError::InvalidOperand {
        operation,
        message: "the document path does not match the item's shape".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

impl EvalContext<'_> {
    /// Keep only the projected attributes.
    ///
    /// A nested path keeps its whole top-level attribute when the path
    /// resolves.
    ///
    /// # Errors
    ///
    /// `UnresolvedName` for an unknown `#placeholder`.
    pub fn apply_projection(&self, paths: &[AttributePath]) -> Result<Item, ExpressionError> {
        let mut projected = Item::new();
        for path in paths {
            if self.resolve_path(path)?.is_none() {
                continue;
            }
            let (top, _) = self.split_top(path, "projection")?;
            if let Some(value) = self.item.get(top) {
                projected.insert(top.to_owned(), value.clone());
            }
        }
        Ok(projected)
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

fn compare_values(
    left: &AttributeValue,
    right: &AttributeValue,
    op: CompareOp,
) -> Result<bool, ExpressionError> {
    let ordering = match (left, right) {
        (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (AttributeValue::N(a), AttributeValue::N(b)) => {
            parse_number(a)?.partial_cmp(&parse_number(b)?)
        }
        (AttributeValue::B(a), AttributeValue::B(b)) => Some(a.cmp(b)),
        // Other types only support equality.
        _ if matches!(op, CompareOp::Eq | CompareOp::Ne) => Some(if left == right {
            Ordering::Equal
        } else {
            Ordering::Less
        }),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

fn parse_number(s: &str) -> Result<f64, ExpressionError> {
    s.parse::<f64>().map_err(|_| ExpressionError::TypeMismatch {
        message: format!("'{s}' is not a valid number"),
    })
}

#[derive(Debug, Clone, Copy)]
enum Arithmetic {
    Add,
    Subtract,
}

/// Integer operands stay exact; anything else goes through `f64`.
fn numeric_arithmetic(
    left: &AttributeValue,
    right: &AttributeValue,
    arithmetic: Arithmetic,
) -> Result<AttributeValue, ExpressionError> {
    let (AttributeValue::N(a), AttributeValue::N(b)) = (left, right) else {
        return Err(ExpressionError::TypeMismatch {
            message: format!(
                "arithmetic needs two numbers, got {} and {}",
                left.type_descriptor(),
                right.type_descriptor()
            ),
        });
    };
    if let (Ok(a), Ok(b)) = (a.parse::<i128>(), b.parse::<i128>()) {
        let exact = match arithmetic {
            Arithmetic::Add => a.checked_add(b),
            Arithmetic::Subtract => a.checked_sub(b),
        };
        if let Some(exact) = exact {
            return Ok(AttributeValue::number(exact));
        }
    }
    let (a, b) = (parse_number(a)?, parse_number(b)?);
    let result = match arithmetic {
        Arithmetic::Add => a + b,
        Arithmetic::Subtract => a - b,
    };
    Ok(AttributeValue::N(format_number(result)))
}

fn format_number(v: f64) -> String {
    // Integral and well inside i64, so the cast is exact.
    #[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
    if v == v.trunc() && v.abs() < 1e15 {
        (v as i64).to_string()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::expression::parser::{parse_condition, parse_projection, parse_update};

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn names(pairs: &[(&str, &str)]) -> ExpressionAttributeNames {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn check(target: &Item, expression: &str, values: &ExpressionAttributeValues) -> bool {
        let names = names(&[("#n0", "pk"), ("#n1", "sk")]);
        let ctx = EvalContext {
            item: target,
            names: &names,
            values,
        };
        ctx.evaluate(&parse_condition(expression).unwrap()).unwrap()
    }

    fn update(target: &Item, expression: &str, values: &ExpressionAttributeValues) -> Item {
        let names = names(&[("#n0", "count"), ("#n1", "lines"), ("#n2", "note")]);
        let ctx = EvalContext {
            item: target,
            names: &names,
            values,
        };
        ctx.apply_update(&parse_update(expression).unwrap()).unwrap()
    }

    #[test]
    fn test_should_compare_strings_and_numbers() {
        let stored = item(&[("pk", "cart#1".into()), ("qty", AttributeValue::number(10))]);
        let values = item(&[(":v0", "cart#1".into()), (":v1", AttributeValue::number(9.5))]);
        assert!(check(&stored, "#n0 = :v0", &values));
        assert!(check(&stored, "qty > :v1", &values));
        assert!(check(&stored, "qty >= :v1 AND #n0 <> :v1", &values));
        assert!(!check(&stored, "qty <= :v1", &values));
    }

    #[test]
    fn test_should_treat_missing_attribute_as_false() {
        let stored = item(&[("pk", "cart#1".into())]);
        let values = item(&[(":v0", AttributeValue::number(1))]);
        assert!(!check(&stored, "qty = :v0", &values));
        assert!(check(&stored, "NOT qty = :v0", &values));
    }

    #[test]
    fn test_should_evaluate_existence_functions() {
        let stored = item(&[("pk", "cart#1".into()), ("sk", "line#1".into())]);
        let none = HashMap::new();
        assert!(check(&stored, "attribute_exists(#n0) AND attribute_exists(#n1)", &none));
        assert!(!check(&Item::new(), "attribute_exists(#n0)", &none));
        assert!(check(
            &Item::new(),
            "attribute_not_exists(#n0) AND attribute_not_exists(#n1)",
            &none
        ));
    }

    #[test]
    fn test_should_match_prefix_and_containment() {
        let stored = item(&[
            ("sk", "line#42".into()),
            ("tags", AttributeValue::Ss(vec!["veg".to_owned(), "hot".to_owned()])),
        ]);
        let values = item(&[
            (":v0", "line#".into()),
            (":v1", "veg".into()),
            (":v2", "order#".into()),
        ]);
        assert!(check(&stored, "begins_with(#n1, :v0)", &values));
        assert!(!check(&stored, "begins_with(#n1, :v2)", &values));
        assert!(check(&stored, "contains(tags, :v1) OR begins_with(#n1, :v2)", &values));
    }

    #[test]
    fn test_should_fail_on_unknown_placeholders() {
        let ctx = EvalContext {
            item: &Item::new(),
            names: &HashMap::new(),
            values: &HashMap::new(),
        };
        let err = ctx
            .evaluate(&parse_condition("#n9 = :v0").unwrap())
            .unwrap_err();
        assert!(matches!(err, ExpressionError::UnresolvedName { .. }));
        let err = ctx
            .evaluate(&parse_condition("plain = :v0").unwrap())
            .unwrap_err();
        assert!(matches!(err, ExpressionError::UnresolvedValue { .. }));
    }

    #[test]
    fn test_should_increment_absent_counter_from_zero() {
        let values = item(&[(":v0", AttributeValue::number(0)), (":v1", AttributeValue::number(1))]);
        let expression = "SET #n0 = if_not_exists(#n0, :v0) + :v1";
        let once = update(&Item::new(), expression, &values);
        assert_eq!(once["count"], AttributeValue::number(1));
        let twice = update(&once, expression, &values);
        assert_eq!(twice["count"], AttributeValue::number(2));
    }

    #[test]
    fn test_should_keep_large_counters_exact() {
        let stored = item(&[("count", AttributeValue::N("9007199254740993".to_owned()))]);
        let values = item(&[(":v0", AttributeValue::number(0)), (":v1", AttributeValue::number(1))]);
        let next = update(&stored, "SET #n0 = if_not_exists(#n0, :v0) + :v1", &values);
        assert_eq!(next["count"], AttributeValue::N("9007199254740994".to_owned()));
    }

    #[test]
    fn test_should_append_to_absent_list() {
        let values = item(&[
            (":v0", AttributeValue::L(vec![])),
            (":v1", AttributeValue::L(vec!["a".into()])),
        ]);
        let expression = "SET #n1 = list_append(if_not_exists(#n1, :v0), :v1)";
        let once = update(&Item::new(), expression, &values);
        let twice = update(&once, expression, &values);
        assert_eq!(twice["lines"], AttributeValue::L(vec!["a".into(), "a".into()]));
    }

    #[test]
    fn test_should_set_and_remove_in_one_update() {
        let stored = item(&[("note", "old".into()), ("info", AttributeValue::M(HashMap::new()))]);
        let values = item(&[(":v0", "x".into())]);
        let next = update(&stored, "SET info.source = :v0 REMOVE #n2", &values);
        assert!(!next.contains_key("note"));
        assert_eq!(
            next["info"],
            AttributeValue::M(HashMap::from([("source".to_owned(), "x".into())]))
        );
    }

    #[test]
    fn test_should_reject_set_from_missing_attribute() {
        let names = HashMap::new();
        let values = HashMap::new();
        let ctx = EvalContext {
            item: &Item::new(),
            names: &names,
            values: &values,
        };
        let err = ctx
            .apply_update(&parse_update("SET a = b").unwrap())
            .unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidOperand { operation: "SET", .. }));
    }

    #[test]
    fn test_should_project_requested_attributes() {
        let stored = item(&[
            ("pk", "cart#1".into()),
            ("qty", AttributeValue::number(2)),
            ("info", AttributeValue::M(HashMap::from([("a".to_owned(), "b".into())]))),
        ]);
        let names = names(&[("#n0", "qty")]);
        let ctx = EvalContext {
            item: &stored,
            names: &names,
            values: &HashMap::new(),
        };
        let projected = ctx
            .apply_projection(&parse_projection("#n0, info.a, missing").unwrap())
            .unwrap();
        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("qty"));
        assert!(projected.contains_key("info"));
    }
}
