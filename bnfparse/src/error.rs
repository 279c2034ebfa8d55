//! Errors raised while compiling grammars, tokenizing, parsing and visiting.

/// The grammar text (or a hand-built rule list) is not a usable grammar.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid grammar: no production rules found")]
    NoRules,

    /// `position` is a byte offset when the notation could not be tokenized,
    /// otherwise the index of the furthest token reached.
    #[error("invalid grammar: syntax error at {position} near {near}")]
    Syntax { position: usize, near: String },

    #[error("production rule `{0}` not found")]
    UndefinedRule(String),

    #[error("production rule `{0}` has an empty alternative")]
    EmptyRule(String),

    #[error("lexer rule `{0}` must have exactly one pattern")]
    InvalidLexerRule(String),

    #[error("`{0}` is defined both as a lexer rule and as a parser rule")]
    ConflictingRule(String),

    #[error("invalid pattern for lexer rule `{rule}`: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// No lexer rule matches the input at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at offset {offset} near [{preview}...]")]
pub struct LexError {
    pub offset: usize,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Every alternative of the root rule failed, or none consumed all tokens.
    #[error("input cannot be parsed: no alternative of `{rule}` matches, gave up at token {index} near {near}")]
    NoMatch {
        rule: String,
        index: usize,
        near: String,
    },

    /// The root rule passed a token or a sequence through instead of building a node.
    #[error("root rule `{rule}` did not produce a node")]
    NotANode { rule: String },

    #[error("recursion limit of {limit} nested rules exceeded")]
    RecursionLimit { limit: usize },
}

/// A visitor asked for a property shape the tree does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("property `{property}` of node `{node}`: expected {expected}, found {found}")]
pub struct TypeMismatch {
    pub node: String,
    pub property: String,
    pub expected: &'static str,
    pub found: &'static str,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
