//! The tree produced by a parse.
//!
//! A [`Node`] is named after the rule that built it. Its properties are keyed
//! by symbol alias and kept in the order they were first stored, so printing
//! and default traversal are deterministic.

use crate::error::{Result, TypeMismatch};
use crate::utils::escape_string;
use crate::visitor::Visitor;
use indexmap::IndexMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub text: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Token {
            kind: kind.into(),
            text: text.into(),
        }
    }

    pub fn print_to_string(&self) -> String {
        format!("({}, \"{}\")", self.kind, escape_string(&self.text))
    }
}

/// One element of an accumulated sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Token(Token),
    Node(Node),
}

impl Element {
    pub fn print_to_string(&self) -> String {
        match self {
            Element::Token(token) => token.print_to_string(),
            Element::Node(node) => node.print_to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Element::Token(_) => "token",
            Element::Node(_) => "node",
        }
    }
}

/// A matched value: what a property holds, and what a rule match returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Token(Token),
    Node(Node),
    Sequence(Vec<Element>),
}

impl Value {
    /// Append `other` to this value, turning it into a sequence first.
    /// Sequences are flattened.
    pub(crate) fn append(self, other: Value) -> Value {
        let mut list = self.into_elements();
        list.extend(other.into_elements());
        Value::Sequence(list)
    }

    fn into_elements(self) -> Vec<Element> {
        match self {
            Value::Token(token) => vec![Element::Token(token)],
            Value::Node(node) => vec![Element::Node(node)],
            Value::Sequence(list) => list,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Token(_) => "token",
            Value::Node(_) => "node",
            Value::Sequence(_) => "sequence",
        }
    }

    /// Dispatch every node in this value to the visitor.
    pub fn accept<S>(&self, visitor: &mut Visitor<S>) -> Result<()> {
        match self {
            Value::Token(_) => Ok(()),
            Value::Node(node) => visitor.visit(node),
            Value::Sequence(list) => {
                for element in list {
                    if let Element::Node(node) = element {
                        visitor.visit(node)?;
                    }
                }
                Ok(())
            }
        }
    }

    pub fn print_to_string(&self) -> String {
        match self {
            Value::Token(token) => token.print_to_string(),
            Value::Node(node) => node.print_to_string(),
            Value::Sequence(list) => format!(
                "[{}]",
                list.iter()
                    .map(Element::print_to_string)
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub properties: IndexMap<String, Value>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Store a matched value. With `accumulate` the property becomes (or
    /// stays) a sequence and the value is appended, otherwise it is replaced.
    pub(crate) fn store(&mut self, alias: &str, value: Value, accumulate: bool) {
        if accumulate {
            let slot = self
                .properties
                .entry(alias.to_owned())
                .or_insert_with(|| Value::Sequence(Vec::new()));
            let prev = std::mem::replace(slot, Value::Sequence(Vec::new()));
            *slot = prev.append(value);
        } else {
            self.properties.insert(alias.to_owned(), value);
        }
    }

    pub fn accept<S>(&self, visitor: &mut Visitor<S>) -> Result<()> {
        visitor.visit(self)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.properties.contains_key(alias)
    }

    pub fn get(&self, alias: &str) -> Result<&Value, TypeMismatch> {
        self.properties
            .get(alias)
            .ok_or_else(|| self.mismatch(alias, "a value", "nothing"))
    }

    pub fn token(&self, alias: &str) -> Result<&Token, TypeMismatch> {
        match self.get(alias)? {
            Value::Token(token) => Ok(token),
            other => Err(self.mismatch(alias, "token", other.kind())),
        }
    }

    /// Text of a token property.
    pub fn text(&self, alias: &str) -> Result<&str, TypeMismatch> {
        self.token(alias).map(|token| token.text.as_str())
    }

    pub fn node(&self, alias: &str) -> Result<&Node, TypeMismatch> {
        match self.get(alias)? {
            Value::Node(node) => Ok(node),
            other => Err(self.mismatch(alias, "node", other.kind())),
        }
    }

    pub fn elements(&self, alias: &str) -> Result<&[Element], TypeMismatch> {
        match self.get(alias)? {
            Value::Sequence(list) => Ok(list),
            other => Err(self.mismatch(alias, "sequence", other.kind())),
        }
    }

    pub fn tokens(&self, alias: &str) -> Result<Vec<&Token>, TypeMismatch> {
        self.elements(alias)?
            .iter()
            .map(|element| match element {
                Element::Token(token) => Ok(token),
                other => Err(self.mismatch(alias, "sequence of tokens", other.kind())),
            })
            .collect()
    }

    pub fn nodes(&self, alias: &str) -> Result<Vec<&Node>, TypeMismatch> {
        self.elements(alias)?
            .iter()
            .map(|element| match element {
                Element::Node(node) => Ok(node),
                other => Err(self.mismatch(alias, "sequence of nodes", other.kind())),
            })
            .collect()
    }

    fn mismatch(&self, alias: &str, expected: &'static str, found: &'static str) -> TypeMismatch {
        TypeMismatch {
            node: self.name.clone(),
            property: alias.to_owned(),
            expected,
            found,
        }
    }

    pub fn print_to_string(&self) -> String {
        let properties = if self.properties.is_empty() {
            String::new()
        } else {
            format!(
                ", {}",
                self.properties
                    .iter()
                    .map(|(alias, value)| format!("{}: {}", alias, value.print_to_string()))
                    .collect::<Vec<String>>()
                    .join(", ")
            )
        };

        format!("({}{})", self.name, properties)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_to_string())
    }
}
