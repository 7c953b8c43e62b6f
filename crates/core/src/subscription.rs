//! Subscription predicates such as `type = "track" and event = "Order Completed"`.
//!
//! A predicate is a disjunction of conjunctions of string comparisons against
//! dot paths in the event. `and` binds tighter than `or`.

use serde_json::Value;

use crate::error::{ActionError, ActionResult};
use crate::mapping::resolve_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub path: String,
    pub comparison: Comparison,
    pub value: String,
}

impl Condition {
    fn matches(&self, event: &Value) -> bool {
        let actual = resolve_path(event, &self.path).and_then(Value::as_str);
        match self.comparison {
            Comparison::Equals => actual == Some(self.value.as_str()),
            Comparison::NotEquals => actual != Some(self.value.as_str()),
        }
    }
}

/// Parsed subscription predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    source: String,
    any_of: Vec<Vec<Condition>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Literal(String),
    Eq,
    NotEq,
    And,
    Or,
}

impl Subscription {
    pub fn parse(source: &str) -> ActionResult<Self> {
        let tokens = tokenize(source)?;
        let mut any_of = vec![Vec::new()];
        let mut iter = tokens.into_iter();

        loop {
            let path = match iter.next() {
                Some(Token::Ident(path)) => path,
                other => return Err(unexpected(source, "field name", other)),
            };
            let comparison = match iter.next() {
                Some(Token::Eq) => Comparison::Equals,
                Some(Token::NotEq) => Comparison::NotEquals,
                other => return Err(unexpected(source, "`=` or `!=`", other)),
            };
            let value = match iter.next() {
                Some(Token::Literal(value)) => value,
                other => return Err(unexpected(source, "quoted string", other)),
            };

            if let Some(group) = any_of.last_mut() {
                group.push(Condition { path, comparison, value });
            }

            match iter.next() {
                None => break,
                Some(Token::And) => {}
                Some(Token::Or) => any_of.push(Vec::new()),
                other => return Err(unexpected(source, "`and` or `or`", other)),
            }
        }

        Ok(Self {
            source: source.to_string(),
            any_of,
        })
    }

    pub fn matches(&self, event: &Value) -> bool {
        self.any_of
            .iter()
            .any(|group| group.iter().all(|c| c.matches(event)))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn unexpected(source: &str, expected: &str, found: Option<Token>) -> ActionError {
    ActionError::Subscription(format!(
        "expected {} in `{}`, found {:?}",
        expected, source, found
    ))
}

fn tokenize(source: &str) -> ActionResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(ActionError::Subscription(format!(
                        "dangling `!` in `{}`",
                        source
                    )));
                }
                tokens.push(Token::NotEq);
            }
            '"' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => literal.push(escaped),
                            None => break,
                        },
                        Some(other) => literal.push(other),
                        None => {
                            return Err(ActionError::Subscription(format!(
                                "unterminated string in `{}`",
                                source
                            )))
                        }
                    }
                }
                tokens.push(Token::Literal(literal));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if word.is_empty() {
                    return Err(ActionError::Subscription(format!(
                        "unexpected character `{}` in `{}`",
                        c, source
                    )));
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    _ => Token::Ident(word),
                });
            }
        }
    }

    Ok(tokens)
}
