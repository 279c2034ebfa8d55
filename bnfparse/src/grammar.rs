use crate::check::check_grammar;
use crate::context::ParseContext;
use crate::error::{GrammarError, LexError, Result};
use crate::lexer::{self, Lexer};
use crate::node::{Node, Token};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One element of an alternative's right-hand side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    /// Property key in the owning node. Empty means the value replaces the
    /// owning rule's result.
    pub alias: String,
    pub optional: bool,
    pub repeatable: bool,
    pub ignore: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        Symbol {
            alias: name.clone(),
            name,
            optional: false,
            repeatable: false,
            ignore: false,
        }
    }

    /// Build a symbol from the compact `[alias:]name[modifier]` notation,
    /// e.g. `"ITEMS:item*"`, `":expr"` or `"LPAREN!"`.
    pub fn parse(spec: &str) -> Self {
        let (alias, rest) = match spec.split_once(':') {
            Some((alias, rest)) => (Some(alias), rest),
            None => (None, spec),
        };

        let (name, modifier) = match rest.chars().last() {
            Some(ch @ ('?' | '*' | '+' | '!')) => (&rest[..rest.len() - 1], Some(ch)),
            _ => (rest, None),
        };

        let mut symbol = Symbol::new(name);
        if let Some(alias) = alias {
            symbol.alias = alias.to_owned();
        }
        symbol.set_modifier(modifier);
        symbol
    }

    pub(crate) fn set_modifier(&mut self, modifier: Option<char>) {
        self.optional = matches!(modifier, Some('?' | '*'));
        self.repeatable = matches!(modifier, Some('+' | '*'));
        self.ignore = modifier == Some('!');
    }

    pub fn is_passthrough(&self) -> bool {
        self.alias.is_empty()
    }

    fn modifier(&self) -> &'static str {
        match (self.ignore, self.optional, self.repeatable) {
            (true, _, _) => "!",
            (false, true, true) => "*",
            (false, true, false) => "?",
            (false, false, true) => "+",
            (false, false, false) => "",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alias != self.name {
            write!(f, "{}:", self.alias)?;
        }
        write!(f, "{}{}", self.name, self.modifier())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Terminal: a single symbol whose name is a regular expression.
    Lexer,
    /// Non-terminal: an ordered sequence of symbols.
    Parser,
}

/// One alternative of a named rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductionRule {
    pub name: String,
    pub kind: RuleKind,
    pub symbols: Vec<Symbol>,
}

impl ProductionRule {
    pub fn lexer(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        ProductionRule {
            name: name.into(),
            kind: RuleKind::Lexer,
            symbols: vec![Symbol::new(pattern)],
        }
    }

    /// A parser alternative written with [`Symbol::parse`] notation.
    pub fn parser(name: impl Into<String>, symbols: &[&str]) -> Self {
        ProductionRule {
            name: name.into(),
            kind: RuleKind::Parser,
            symbols: symbols.iter().map(|s| Symbol::parse(s)).collect(),
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        match self.kind {
            RuleKind::Lexer => self.symbols.first().map(|s| s.name.as_str()),
            RuleKind::Parser => None,
        }
    }

    /// Whether values stored under `alias` accumulate into a sequence: the
    /// alias is repeatable, or more than one stored symbol shares it.
    pub fn is_enumerated(&self, alias: &str) -> bool {
        let mut count = 0;

        for symbol in self.symbols.iter().filter(|s| !s.ignore && s.alias == alias) {
            if symbol.repeatable {
                return true;
            }
            count += 1;
        }

        count > 1
    }
}

impl fmt::Display for ProductionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern() {
            Some(pattern) => write!(f, "{} = \"{}\";", self.name, pattern.replace('"', "\\\"")),
            None => {
                let symbols = self
                    .symbols
                    .iter()
                    .map(Symbol::to_string)
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{} = {};", self.name, symbols)
            }
        }
    }
}

/// Grammar construction settings.
#[derive(Clone, Debug)]
pub struct Options {
    /// Token kinds the tokenizer drops, e.g. comments.
    pub ignored: Vec<String>,
    pub case_insensitive: bool,
    /// Maximum number of nested rule matches.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            ignored: Vec::new(),
            case_insensitive: true,
            max_depth: 512,
        }
    }
}

impl Options {
    pub fn ignore(mut self, kind: impl Into<String>) -> Self {
        self.ignored.push(kind.into());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// A compiled grammar. Immutable once built; any number of parses can run
/// against it, each with its own context.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<ProductionRule>,
    alternatives: HashMap<String, Vec<usize>>,
    pub(crate) lexers: Vec<Lexer>,
    pub(crate) ignored: HashSet<String>,
    pub(crate) max_depth: usize,
}

impl Grammar {
    /// Compile grammar text with default options.
    pub fn compile(source: &str) -> Result<Grammar> {
        crate::parser::compile(source, Options::default())
    }

    pub fn new(rules: Vec<ProductionRule>, options: Options) -> Result<Grammar, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::NoRules);
        }

        let mut lexers = Vec::new();
        let mut alternatives: HashMap<String, Vec<usize>> = HashMap::new();
        let mut lexer_names = HashSet::new();

        for (rule_no, rule) in rules.iter().enumerate() {
            match rule.kind {
                RuleKind::Lexer => {
                    let pattern = match rule.symbols.as_slice() {
                        [symbol] => &symbol.name,
                        _ => return Err(GrammarError::InvalidLexerRule(rule.name.clone())),
                    };
                    lexers.push(Lexer::new(&rule.name, pattern, options.case_insensitive)?);
                    lexer_names.insert(rule.name.as_str());
                }
                RuleKind::Parser => {
                    if rule.symbols.is_empty() {
                        return Err(GrammarError::EmptyRule(rule.name.clone()));
                    }
                    alternatives.entry(rule.name.clone()).or_default().push(rule_no);
                }
            }
        }

        if let Some(name) = alternatives.keys().find(|name| lexer_names.contains(name.as_str())) {
            return Err(GrammarError::ConflictingRule(name.clone()));
        }

        let grammar = Grammar {
            rules,
            alternatives,
            lexers,
            ignored: options.ignored.into_iter().collect(),
            max_depth: options.max_depth,
        };

        for warning in grammar.check() {
            log::warn!("{}", warning);
        }

        Ok(grammar)
    }

    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    /// The parser alternatives sharing `name`, in declaration order.
    pub fn alternatives_of<'g>(&'g self, name: &str) -> impl Iterator<Item = &'g ProductionRule> + 'g {
        self.alternatives
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |rule_no| &self.rules[*rule_no])
    }

    pub fn is_lexer_rule(&self, name: &str) -> bool {
        self.lexers.iter().any(|lexer| lexer.kind == name)
    }

    pub fn is_parser_rule(&self, name: &str) -> bool {
        self.alternatives.contains_key(name)
    }

    /// Static diagnostics: undefined references, unused and left-recursive rules.
    pub fn check(&self) -> Vec<String> {
        check_grammar(self)
    }

    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        lexer::tokenize(self, input)
    }

    /// Tokenize `input` and parse it starting at rule `root`.
    pub fn parse(&self, root: &str, input: &str) -> Result<Node> {
        let tokens = self.tokenize(input)?;

        self.parse_tokens(root, &tokens)
    }

    pub fn parse_tokens(&self, root: &str, tokens: &[Token]) -> Result<Node> {
        if !self.is_parser_rule(root) {
            return Err(GrammarError::UndefinedRule(root.to_owned()).into());
        }

        let node = ParseContext::new(self, tokens).parse(root)?;

        Ok(node)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_notation() {
        let symbol = Symbol::parse("ITEMS:item*");
        assert_eq!(symbol.name, "item");
        assert_eq!(symbol.alias, "ITEMS");
        assert!(symbol.optional && symbol.repeatable && !symbol.ignore);

        let symbol = Symbol::parse(":expr");
        assert_eq!(symbol.name, "expr");
        assert!(symbol.is_passthrough());

        let symbol = Symbol::parse("LPAREN!");
        assert_eq!(symbol.alias, "LPAREN");
        assert!(symbol.ignore && !symbol.optional);

        let symbol = Symbol::parse("VALUE+");
        assert!(symbol.repeatable && !symbol.optional);

        let symbol = Symbol::parse("value?");
        assert!(!symbol.repeatable && symbol.optional);
    }

    #[test]
    fn symbol_display() {
        for spec in ["ITEMS:item*", ":expr", "LPAREN!", "a+", "b?", "c"] {
            assert_eq!(Symbol::parse(spec).to_string(), spec);
        }
    }

    #[test]
    fn enumerated_aliases() {
        let rule = ProductionRule::parser("r", &["A:x", "A:y", "B:z*", "C:w", "D!", "D!"]);

        assert!(rule.is_enumerated("A"));
        assert!(rule.is_enumerated("B"));
        assert!(!rule.is_enumerated("C"));
        assert!(!rule.is_enumerated("D"));
        assert!(!rule.is_enumerated("E"));
    }

    #[test]
    fn alternatives_keep_declaration_order() {
        let grammar = Grammar::new(
            vec![
                ProductionRule::lexer("A", "a"),
                ProductionRule::parser("r", &["FIRST:A"]),
                ProductionRule::parser("s", &["r"]),
                ProductionRule::parser("r", &["SECOND:A"]),
            ],
            Options::default(),
        )
        .unwrap();

        let alts: Vec<String> = grammar.alternatives_of("r").map(|r| r.to_string()).collect();
        assert_eq!(alts, vec!["r = FIRST:A;", "r = SECOND:A;"]);
        assert_eq!(grammar.alternatives_of("A").count(), 0);
        assert!(grammar.is_lexer_rule("A"));
        assert!(grammar.is_parser_rule("s"));
    }

    #[test]
    fn invalid_rule_lists() {
        assert!(matches!(
            Grammar::new(Vec::new(), Options::default()),
            Err(GrammarError::NoRules)
        ));

        assert!(matches!(
            Grammar::new(vec![ProductionRule::parser("r", &[])], Options::default()),
            Err(GrammarError::EmptyRule(name)) if name == "r"
        ));

        assert!(matches!(
            Grammar::new(
                vec![
                    ProductionRule::lexer("A", "a"),
                    ProductionRule::parser("A", &["B"]),
                ],
                Options::default()
            ),
            Err(GrammarError::ConflictingRule(name)) if name == "A"
        ));

        assert!(matches!(
            Grammar::new(vec![ProductionRule::lexer("A", "(")], Options::default()),
            Err(GrammarError::InvalidPattern { rule, .. }) if rule == "A"
        ));

        let mut rule = ProductionRule::lexer("A", "a");
        rule.symbols.push(Symbol::new("b"));
        assert!(matches!(
            Grammar::new(vec![rule], Options::default()),
            Err(GrammarError::InvalidLexerRule(_))
        ));
    }

    #[test]
    fn shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
