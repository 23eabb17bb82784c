//! Lexer and recursive-descent parser.
//!
//! Keywords and function names match case-insensitively. Operator precedence,
//! loosest first: `OR`, `AND`, `NOT`, then comparisons and function calls.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::{
    AttributePath, CompareOp, Expr, FunctionName, LogicalOp, Operand, PathElement, SetAction,
    SetValue, UpdateExpr,
};
use crate::error::ExpressionError;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    /// `#name`, hash included.
    NamePlaceholder(String),
    /// `:value`, colon included.
    ValuePlaceholder(String),
    Number(usize),
    Compare(CompareOp),
    Plus,
    Minus,
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    And,
    Or,
    Not,
    Set,
    Remove,
    Function(FunctionName),
    IfNotExists,
    ListAppend,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::NamePlaceholder(s) | Self::ValuePlaceholder(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Compare(op) => write!(f, "'{op}'"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Dot => f.write_str("'.'"),
            Self::Comma => f.write_str("','"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBracket => f.write_str("'['"),
            Self::RBracket => f.write_str("']'"),
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
            Self::Not => f.write_str("NOT"),
            Self::Set => f.write_str("SET"),
            Self::Remove => f.write_str("REMOVE"),
            Self::Function(name) => f.write_str(name.as_str()),
            Self::IfNotExists => f.write_str("if_not_exists"),
            Self::ListAppend => f.write_str("list_append"),
            Self::Eof => f.write_str("end of expression"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn bump(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn next_token(&mut self) -> Result<Token, ExpressionError> {
        while self.chars.peek().is_some_and(char::is_ascii_whitespace) {
            self.chars.next();
        }
        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '#' | ':' => self.read_placeholder(ch)?,
            '=' => self.bump(Token::Compare(CompareOp::Eq)),
            '<' => {
                self.chars.next();
                match self.chars.peek().copied() {
                    Some('=') => self.bump(Token::Compare(CompareOp::Le)),
                    Some('>') => self.bump(Token::Compare(CompareOp::Ne)),
                    _ => Token::Compare(CompareOp::Lt),
                }
            }
            '>' => {
                self.chars.next();
                if self.chars.peek() == Some(&'=') {
                    self.bump(Token::Compare(CompareOp::Ge))
                } else {
                    Token::Compare(CompareOp::Gt)
                }
            }
            '+' => self.bump(Token::Plus),
            '-' => self.bump(Token::Minus),
            '.' => self.bump(Token::Dot),
            ',' => self.bump(Token::Comma),
            '(' => self.bump(Token::LParen),
            ')' => self.bump(Token::RParen),
            '[' => self.bump(Token::LBracket),
            ']' => self.bump(Token::RBracket),
            c if c.is_ascii_digit() => self.read_index()?,
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(),
            other => {
                return Err(ExpressionError::UnexpectedToken {
                    expected: "a token".to_owned(),
                    found: format!("'{other}'"),
                });
            }
        };
        Ok(token)
    }

    fn read_placeholder(&mut self, sigil: char) -> Result<Token, ExpressionError> {
        self.chars.next();
        let body = self.read_ident_chars();
        if body.is_empty() {
            return Err(ExpressionError::UnexpectedToken {
                expected: format!("a name after '{sigil}'"),
                found: "nothing".to_owned(),
            });
        }
        let placeholder = format!("{sigil}{body}");
        Ok(if sigil == '#' {
            Token::NamePlaceholder(placeholder)
        } else {
            Token::ValuePlaceholder(placeholder)
        })
    }

    fn read_index(&mut self) -> Result<Token, ExpressionError> {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.chars.next();
        }
        digits
            .parse()
            .map(Token::Number)
            .map_err(|_| ExpressionError::InvalidOperand {
                operation: "list index",
                message: format!("'{digits}' is not a valid index"),
            })
    }

    fn read_ident_chars(&mut self) -> String {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            s.push(c);
            self.chars.next();
        }
        s
    }

    fn read_word(&mut self) -> Token {
        let word = self.read_ident_chars();
        match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "set" => Token::Set,
            "remove" => Token::Remove,
            "attribute_exists" => Token::Function(FunctionName::AttributeExists),
            "attribute_not_exists" => Token::Function(FunctionName::AttributeNotExists),
            "begins_with" => Token::Function(FunctionName::BeginsWith),
            "contains" => Token::Function(FunctionName::Contains),
            "if_not_exists" => Token::IfNotExists,
            "list_append" => Token::ListAppend,
            _ => Token::Identifier(word),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExpressionError> {
        let token = self.advance();
        if &token == expected {
            Ok(())
        } else {
            Err(ExpressionError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            })
        }
    }

    fn finish<T>(&self, parsed: T) -> Result<T, ExpressionError> {
        match self.peek() {
            Token::Eof => Ok(parsed),
            other => Err(ExpressionError::UnexpectedToken {
                expected: Token::Eof.to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Parse `item (, item)*`.
    fn comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ExpressionError>,
    ) -> Result<Vec<T>, ExpressionError> {
        let mut items = vec![item(self)?];
        while self.peek() == &Token::Comma {
            self.advance();
            items.push(item(self)?);
        }
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

impl Parser {
    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_and()?;
        while self.peek() == &Token::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_not()?;
        while self.peek() == &Token::And {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ExpressionError> {
        if self.peek() == &Token::Not {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.peek().clone() {
            Token::LParen => {
                self.advance();
                let expr = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Token::Function(name) => {
                self.advance();
                self.expect(&Token::LParen)?;
                let args = self.comma_separated(Self::parse_operand)?;
                self.expect(&Token::RParen)?;
                if args.len() != name.arity() {
                    return Err(ExpressionError::InvalidOperand {
                        operation: name.as_str(),
                        message: format!("expected {} argument(s), got {}", name.arity(), args.len()),
                    });
                }
                Ok(Expr::Function { name, args })
            }
            _ => {
                let left = self.parse_operand()?;
                let op = match self.advance() {
                    Token::Compare(op) => op,
                    other => {
                        return Err(ExpressionError::UnexpectedToken {
                            expected: "a comparison operator".to_owned(),
                            found: other.to_string(),
                        });
                    }
                };
                let right = self.parse_operand()?;
                Ok(Expr::Compare { left, op, right })
            }
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ExpressionError> {
        if let Token::ValuePlaceholder(name) = self.peek() {
            let name = name.clone();
            self.advance();
            return Ok(Operand::Value(name));
        }
        self.parse_path().map(Operand::Path)
    }

    fn parse_path(&mut self) -> Result<AttributePath, ExpressionError> {
        let mut elements = vec![self.parse_path_segment()?];
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    elements.push(self.parse_path_segment()?);
                }
                Token::LBracket => {
                    self.advance();
                    let index = match self.advance() {
                        Token::Number(index) => index,
                        other => {
                            return Err(ExpressionError::UnexpectedToken {
                                expected: "a list index".to_owned(),
                                found: other.to_string(),
                            });
                        }
                    };
                    self.expect(&Token::RBracket)?;
                    elements.push(PathElement::Index(index));
                }
                _ => return Ok(AttributePath { elements }),
            }
        }
    }

    fn parse_path_segment(&mut self) -> Result<PathElement, ExpressionError> {
        match self.advance() {
            Token::Identifier(name) | Token::NamePlaceholder(name) => {
                Ok(PathElement::Attribute(name))
            }
            other => Err(ExpressionError::UnexpectedToken {
                expected: "an attribute name or #placeholder".to_owned(),
                found: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

impl Parser {
    fn parse_update(&mut self) -> Result<UpdateExpr, ExpressionError> {
        let mut update = UpdateExpr::default();
        loop {
            match self.advance() {
                Token::Set => {
                    let actions = self.comma_separated(Self::parse_set_action)?;
                    update.set_actions.extend(actions);
                }
                Token::Remove => {
                    let paths = self.comma_separated(Self::parse_path)?;
                    update.remove_paths.extend(paths);
                }
                Token::Eof => return Ok(update),
                other => {
                    return Err(ExpressionError::UnexpectedToken {
                        expected: "SET or REMOVE".to_owned(),
                        found: other.to_string(),
                    });
                }
            }
        }
    }

    fn parse_set_action(&mut self) -> Result<SetAction, ExpressionError> {
        let path = self.parse_path()?;
        self.expect(&Token::Compare(CompareOp::Eq))?;
        let value = self.parse_set_value()?;
        Ok(SetAction { path, value })
    }

    /// `term ((+ | -) term)?`
    fn parse_set_value(&mut self) -> Result<SetValue, ExpressionError> {
        let left = self.parse_set_term()?;
        match self.peek() {
            Token::Plus => {
                self.advance();
                let right = self.parse_set_term()?;
                Ok(SetValue::Plus(Box::new(left), Box::new(right)))
            }
            Token::Minus => {
                self.advance();
                let right = self.parse_set_term()?;
                Ok(SetValue::Minus(Box::new(left), Box::new(right)))
            }
            _ => Ok(left),
        }
    }

    fn parse_set_term(&mut self) -> Result<SetValue, ExpressionError> {
        match self.peek() {
            Token::IfNotExists => {
                self.advance();
                self.expect(&Token::LParen)?;
                let path = self.parse_path()?;
                self.expect(&Token::Comma)?;
                let fallback = self.parse_operand()?;
                self.expect(&Token::RParen)?;
                Ok(SetValue::IfNotExists(path, fallback))
            }
            Token::ListAppend => {
                self.advance();
                self.expect(&Token::LParen)?;
                let head = self.parse_set_term()?;
                self.expect(&Token::Comma)?;
                let tail = self.parse_set_term()?;
                self.expect(&Token::RParen)?;
                Ok(SetValue::ListAppend(Box::new(head), Box::new(tail)))
            }
            _ => self.parse_operand().map(SetValue::Operand),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a condition, key-condition or filter expression.
///
/// # Errors
///
/// `ExpressionError` if the input is not a well-formed expression.
pub fn parse_condition(input: &str) -> Result<Expr, ExpressionError> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_or()?;
    parser.finish(expr)
}

/// Parse an update expression made of `SET` and `REMOVE` clauses.
///
/// # Errors
///
/// `ExpressionError` if the input is malformed or has no action.
pub fn parse_update(input: &str) -> Result<UpdateExpr, ExpressionError> {
    let update = Parser::new(input)?.parse_update()?;
    if update.is_empty() {
        return Err(ExpressionError::UnexpectedToken {
            expected: "SET or REMOVE".to_owned(),
            found: "an empty update expression".to_owned(),
        });
    }
    Ok(update)
}

/// Parse a projection expression: comma-separated paths.
///
/// # Errors
///
/// `ExpressionError` if the input is not a path list.
pub fn parse_projection(input: &str) -> Result<Vec<AttributePath>, ExpressionError> {
    let mut parser = Parser::new(input)?;
    let paths = parser.comma_separated(Parser::parse_path)?;
    parser.finish(paths)
}
