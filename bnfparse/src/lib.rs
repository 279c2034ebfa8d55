//! A grammar-driven parser engine.
//!
//! Grammars are written in a small BNF-like notation. Lexer rules bind a
//! token kind to a regular expression, parser rules list alternatives of
//! aliased symbols:
//!
//! ```text
//! NUMBER = "\d+";
//! PLUS   = "[+]";
//! sum    = LEFT:NUMBER, PLUS!, RIGHT:NUMBER;
//! ```
//!
//! Quoted literals inside parser rules, like `"("` in `group = "(", expr, ")";`,
//! become lexer rules of their own. They are tried before the named lexer
//! rules and match anywhere, so a literal `"a"` also splits the word `and`;
//! keywords next to identifier rules are better declared as lexer rules
//! with `\b` boundaries.
//!
//! A compiled [`Grammar`] tokenizes and parses input into a tree of
//! [`Node`]s, which a [`Visitor`] can then walk.
//!
//! ```
//! let grammar = bnfparse::compile_grammar(r#"NUMBER = "\d+"; PLUS = "[+]"; sum = LEFT:NUMBER, PLUS!, RIGHT:NUMBER;"#).unwrap();
//! let node = grammar.parse("sum", "1 + 2").unwrap();
//!
//! assert_eq!(node.text("LEFT").unwrap(), "1");
//! assert_eq!(node.text("RIGHT").unwrap(), "2");
//! ```

mod check;
mod context;
pub mod error;
pub mod grammar;
mod lexer;
mod meta;
pub mod node;
mod parser;
mod utils;
pub mod visitor;

pub use error::{Error, GrammarError, LexError, ParseError, Result, TypeMismatch};
pub use grammar::{Grammar, Options, ProductionRule, RuleKind, Symbol};
pub use node::{Element, Node, Token, Value};
pub use visitor::{Handler, Visitor};

/// Compile grammar text with default options: case-insensitive lexer rules,
/// nothing ignored.
pub fn compile_grammar(source: &str) -> Result<Grammar> {
    parser::compile(source, Options::default())
}

pub fn compile_grammar_with(source: &str, options: Options) -> Result<Grammar> {
    parser::compile(source, options)
}
