//! The matching engine: ordered-choice, backtracking recursive descent over
//! a token stream.
//!
//! Alternatives are tried in declaration order and the first one that
//! succeeds is kept. Once a rule has returned success it is never re-tried
//! with a different outcome, so a greedy repetition is not shortened to let
//! a later symbol match.

use crate::error::ParseError;
use crate::grammar::{Grammar, ProductionRule, Symbol};
use crate::node::{Node, Token, Value};

pub(crate) struct ParseContext<'g, 't> {
    grammar: &'g Grammar,
    tokens: &'t [Token],
    pos: usize,
    /// Furthest position ever reached, for error reporting.
    best: usize,
    depth: usize,
}

/// The result under construction for one active rule match.
struct Frame<'g> {
    rule: &'g ProductionRule,
    node: Node,
    passthrough: Option<Value>,
}

impl<'g> Frame<'g> {
    fn new(rule: &'g ProductionRule) -> Self {
        Frame {
            rule,
            node: Node::new(&rule.name),
            passthrough: None,
        }
    }

    fn store(&mut self, alias: &str, value: Value) {
        let accumulate = self.rule.is_enumerated(alias);

        if alias.is_empty() {
            self.passthrough = Some(match self.passthrough.take() {
                Some(prev) if accumulate => prev.append(value),
                None if accumulate => Value::Sequence(Vec::new()).append(value),
                _ => value,
            });
        } else {
            self.node.store(alias, value, accumulate);
        }
    }

    fn finish(self) -> Value {
        match self.passthrough {
            Some(value) => value,
            None if self.rule.is_enumerated("") => Value::Sequence(Vec::new()),
            None => Value::Node(self.node),
        }
    }
}

impl<'g, 't> ParseContext<'g, 't> {
    pub fn new(grammar: &'g Grammar, tokens: &'t [Token]) -> Self {
        ParseContext {
            grammar,
            tokens,
            pos: 0,
            best: 0,
            depth: 0,
        }
    }

    /// Match the whole token stream against the alternatives of `root`.
    pub fn parse(mut self, root: &str) -> Result<Node, ParseError> {
        let grammar = self.grammar;

        for rule in grammar.alternatives_of(root) {
            self.pos = 0;

            if let Some(value) = self.attempt(|ctx| ctx.match_rule(rule))? {
                if self.at_end() {
                    return match value {
                        Value::Node(node) => Ok(node),
                        _ => Err(ParseError::NotANode {
                            rule: root.to_owned(),
                        }),
                    };
                }

                log::debug!(
                    "alternative `{}` of `{}` stopped at token {} of {}",
                    rule,
                    root,
                    self.pos,
                    self.tokens.len()
                );
            }
        }

        Err(ParseError::NoMatch {
            rule: root.to_owned(),
            index: self.best,
            near: self.describe(self.best),
        })
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) {
        self.pos += 1;
        if self.pos > self.best {
            self.best = self.pos;
        }
    }

    fn describe(&self, index: usize) -> String {
        match self.tokens.get(index) {
            Some(token) => format!("{} `{}`", token.kind, token.text),
            None => String::from("end of input"),
        }
    }

    /// Run `f` from the current position. Unless it produces a value the
    /// position is rewound to where it started.
    fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Option<T>, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        let start = self.pos;
        let res = f(self);

        if !matches!(res, Ok(Some(_))) {
            self.pos = start;
        }

        res
    }

    /// Match one alternative: every symbol, in order.
    fn match_rule(&mut self, rule: &'g ProductionRule) -> Result<Option<Value>, ParseError> {
        if self.depth >= self.grammar.max_depth {
            return Err(ParseError::RecursionLimit {
                limit: self.grammar.max_depth,
            });
        }

        self.depth += 1;
        log::trace!("{:indent$}{} @{}", "", rule, self.pos, indent = self.depth);

        let res = self.match_symbols(rule);

        log::trace!(
            "{:indent$}{} {} @{}",
            "",
            rule.name,
            if matches!(res, Ok(Some(_))) { "ok" } else { "failed" },
            self.pos,
            indent = self.depth
        );
        self.depth -= 1;

        res
    }

    fn match_symbols(&mut self, rule: &'g ProductionRule) -> Result<Option<Value>, ParseError> {
        let mut frame = Frame::new(rule);

        for symbol in &rule.symbols {
            if !self.match_symbol(symbol, &mut frame)? {
                return Ok(None);
            }
        }

        Ok(Some(frame.finish()))
    }

    /// Match one symbol, repeating while it is repeatable and making progress.
    fn match_symbol(&mut self, symbol: &'g Symbol, frame: &mut Frame<'g>) -> Result<bool, ParseError> {
        if symbol.optional && self.at_end() {
            return Ok(true);
        }

        let start = self.pos;
        let mut matched = false;

        loop {
            let before = self.pos;

            let value = match self.match_once(symbol)? {
                Some(value) => value,
                None => break,
            };

            matched = true;

            if !symbol.ignore {
                frame.store(&symbol.alias, value);
            }

            if !symbol.repeatable || self.pos == before {
                break;
            }
        }

        if !matched {
            self.pos = start;
            return Ok(symbol.optional);
        }

        Ok(true)
    }

    /// One attempt at a symbol: a token of that kind, else the first
    /// alternative of the rule with that name that matches.
    fn match_once(&mut self, symbol: &'g Symbol) -> Result<Option<Value>, ParseError> {
        let tokens = self.tokens;

        if let Some(token) = tokens.get(self.pos) {
            if token.kind == symbol.name {
                self.advance();
                return Ok(Some(Value::Token(token.clone())));
            }
        }

        let grammar = self.grammar;

        for rule in grammar.alternatives_of(&symbol.name) {
            if let Some(value) = self.attempt(|ctx| ctx.match_rule(rule))? {
                return Ok(Some(value));
            }
        }

        Ok(None)
    }
}
