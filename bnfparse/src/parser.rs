//! Compiles grammar notation into production rules by walking the tree the
//! meta grammar produces.

use crate::error::{Error, GrammarError, ParseError, Result};
use crate::grammar::{Grammar, Options, ProductionRule, RuleKind, Symbol};
use crate::meta::{META, ROOT};
use crate::node::Node;
use crate::utils::{unquote, unquote_pattern};
use crate::visitor::Visitor;
use std::collections::HashSet;

#[derive(Default)]
struct Compiler {
    rules: Vec<ProductionRule>,
    /// Lexer rules synthesized from quoted literals inside parser rules.
    literals: Vec<ProductionRule>,
    defined_literals: HashSet<String>,
    /// Rule names written in the grammar text. Generated names skip these.
    named_rules: HashSet<String>,
    /// Name of the rule whose alternatives are being collected.
    current: String,
    sub_rules: usize,
}

impl Compiler {
    /// The token kind for an inline literal is its quoted text.
    ///
    /// Literal rules are tried before every named lexer rule and are not
    /// bounded by word breaks, so a word-like literal such as `"a"` also
    /// matches the start of `and`. Grammars that mix word literals with an
    /// identifier rule should name the keyword as a lexer rule with `\b`.
    fn literal(&mut self, quoted: &str) -> String {
        if self.defined_literals.insert(quoted.to_owned()) {
            self.literals
                .push(ProductionRule::lexer(quoted, regex::escape(&unquote(quoted))));
        }

        quoted.to_owned()
    }

    fn sub_rule_name(&mut self) -> String {
        loop {
            let name = format!("anonymous_{}", self.sub_rules);
            self.sub_rules += 1;

            if !self.named_rules.contains(&name) {
                return name;
            }
        }
    }
}

pub(crate) fn compile(source: &str, options: Options) -> Result<Grammar> {
    let tokens = META.tokenize(source).map_err(|err| GrammarError::Syntax {
        position: err.offset,
        near: format!("[{}...]", err.preview),
    })?;

    if tokens.is_empty() {
        return Err(GrammarError::NoRules.into());
    }

    let tree = META.parse_tokens(ROOT, &tokens).map_err(|err| match err {
        Error::Parse(ParseError::NoMatch { index, near, .. }) => GrammarError::Syntax {
            position: index,
            near,
        }
        .into(),
        err => err,
    })?;

    let mut visitor = Visitor::new(Compiler::default())
        .on("grammar", visit_grammar)
        .on("rule", visit_rule)
        .on("alternation", visit_alternation)
        .on("sequence", visit_sequence);

    tree.accept(&mut visitor)?;

    let Compiler {
        mut literals,
        rules,
        sub_rules,
        ..
    } = visitor.into_state();

    log::debug!(
        "compiled {} rules, {} inline literals, {} sub-rules",
        rules.len(),
        literals.len(),
        sub_rules
    );

    literals.extend(rules);

    Ok(Grammar::new(literals, options)?)
}

fn visit_grammar(visitor: &mut Visitor<Compiler>, node: &Node) -> Result<()> {
    let rules = node.nodes("RULES")?;

    for rule in &rules {
        visitor.state.named_rules.insert(rule.text("NAME")?.to_owned());
    }

    for rule in rules {
        rule.accept(visitor)?;
    }

    Ok(())
}

fn visit_rule(visitor: &mut Visitor<Compiler>, node: &Node) -> Result<()> {
    let name = node.text("NAME")?;

    if node.contains("PATTERN") {
        let pattern = unquote_pattern(node.text("PATTERN")?);
        visitor.state.rules.push(ProductionRule::lexer(name, pattern));
    } else {
        visitor.state.current = name.to_owned();
        node.node("EXPANSION")?.accept(visitor)?;
    }

    Ok(())
}

fn visit_alternation(visitor: &mut Visitor<Compiler>, node: &Node) -> Result<()> {
    for sequence in node.nodes("ALTERNATE")? {
        sequence.accept(visitor)?;
    }

    Ok(())
}

fn visit_sequence(visitor: &mut Visitor<Compiler>, node: &Node) -> Result<()> {
    let mut symbols = Vec::new();

    for item in node.nodes("SYMBOL")? {
        let name = if item.contains("IDENTIFIER") {
            item.text("IDENTIFIER")?.to_owned()
        } else if item.contains("LITERAL") {
            visitor.state.literal(item.text("LITERAL")?)
        } else {
            // sub-rule alternatives land before the alternative using them
            let name = visitor.state.sub_rule_name();
            let outer = std::mem::replace(&mut visitor.state.current, name.clone());
            item.node("SUBRULE")?.accept(visitor)?;
            visitor.state.current = outer;
            name
        };

        let mut symbol = Symbol::new(name);

        if item.contains("ALIAS") {
            let alias = item.node("ALIAS")?;
            symbol.alias = if alias.contains("NAME") {
                alias.text("NAME")?.to_owned()
            } else {
                String::new()
            };
        }

        if item.contains("MODIFIER") {
            symbol.set_modifier(item.text("MODIFIER")?.chars().next());
        }

        symbols.push(symbol);
    }

    let rule = ProductionRule {
        name: visitor.state.current.clone(),
        kind: RuleKind::Parser,
        symbols,
    };

    log::trace!("compiled alternative {}", rule);

    visitor.state.rules.push(rule);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn compile(source: &str) -> Result<Grammar> {
        super::compile(source, Options::default())
    }

    fn listing(grammar: &Grammar) -> String {
        grammar
            .rules()
            .iter()
            .map(ProductionRule::to_string)
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn valid_grammars() {
        for source in [
            r#"A = "a";"#,
            r#"A = "a"; B = "b"; start = A, B;"#,
            r#"start = A? | B*; A = "a"; B = "b";"#,
            r#"/* comment */ start = X:"x"+, :rest; rest = "y"!;"#,
            "x = (a | b), c';",
        ] {
            assert!(compile(source).is_ok(), "{}", source);
        }
    }

    #[test]
    fn invalid_grammars() {
        for source in ["", "   ", "/* JUST A COMMENT */"] {
            assert!(
                matches!(compile(source), Err(Error::Grammar(GrammarError::NoRules))),
                "{:?}",
                source
            );
        }

        for source in ["rule1", "rule1 ", "(* JUST A COMMENT *)", r#"test = "ABC"#, "a = ;"] {
            assert!(
                matches!(compile(source), Err(Error::Grammar(GrammarError::Syntax { .. }))),
                "{:?}",
                source
            );
        }
    }

    fn syntax_error(source: &str) -> (usize, String) {
        match compile(source) {
            Err(Error::Grammar(GrammarError::Syntax { position, near })) => (position, near),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn syntax_error_names_the_token() {
        assert_eq!(syntax_error("a = ;"), (2, String::from("SEMICOLON `;`")));
        assert_eq!(
            syntax_error("a = b; c = d; e = f; g = ;"),
            (14, String::from("SEMICOLON `;`"))
        );
        assert_eq!(syntax_error("rule1"), (1, String::from("end of input")));

        // unknown characters are reported by byte offset
        assert_eq!(syntax_error("a = $;"), (4, String::from("[$;...]")));
        assert_eq!(
            compile("a = b;\nc = $;").unwrap_err().to_string(),
            "invalid grammar: syntax error at 11 near [$;...]"
        );
    }

    #[test]
    fn lexer_and_parser_rules() {
        let g = compile(r#"A = "[a-c]\"+"; start = A, "x";"#).unwrap();

        assert!(g.is_lexer_rule("A"));
        assert!(g.is_lexer_rule("\"x\""));
        assert!(g.is_parser_rule("start"));
        assert_eq!(g.rules()[1].pattern(), Some(r#"[a-c]"+"#));
    }

    #[test]
    fn sub_rules_are_named_and_come_first() {
        let g = compile("e = TERMS:(:t, :(OP:P, t | OP:M, t)*);").unwrap();

        assert_eq!(
            listing(&g),
            indoc! {"
                anonymous_1 = OP:P, t;
                anonymous_1 = OP:M, t;
                anonymous_0 = :t, :anonymous_1*;
                e = TERMS:anonymous_0;"
            }
        );

        // numbering restarts with every compilation
        let again = compile("f = (x);").unwrap();
        assert_eq!(listing(&again), "anonymous_0 = x;\nf = anonymous_0;");
    }

    #[test]
    fn sub_rule_names_avoid_named_rules() {
        let g = compile(r#"A = "a"; B = "b"; anonymous_0 = A; r = (B);"#).unwrap();

        assert_eq!(g.alternatives_of("anonymous_0").count(), 1);
        assert_eq!(
            listing(&g),
            indoc! {r#"
                A = "a";
                B = "b";
                anonymous_0 = A;
                anonymous_1 = B;
                r = anonymous_1;"#
            }
        );

        assert!(g.parse("r", "a").is_err());
        assert_eq!(
            g.parse("r", "b").unwrap().print_to_string(),
            r#"(r, anonymous_1: (anonymous_1, B: (B, "b")))"#
        );
    }

    #[test]
    fn inline_literals_become_lexer_rules() {
        let g = compile(r#"wrapped = "("!, VALUE:"x", ")"!; again = "(", "x";"#).unwrap();

        assert_eq!(
            listing(&g),
            indoc! {r#"
                "(" = "\(";
                "x" = "x";
                ")" = "\)";
                wrapped = "("!, VALUE:"x", ")"!;
                again = "(", "x";"#
            }
        );

        let node = g.parse("wrapped", "( x )").unwrap();
        assert_eq!(node.print_to_string(), r#"(wrapped, VALUE: ("x", "x"))"#);
    }

    #[test]
    fn literals_tokenize_before_named_rules() {
        let g = compile(r#"IDENT = "[a-z]+"; r = "a", NAME:IDENT;"#).unwrap();

        let kinds: Vec<String> = g
            .tokenize("a and")
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect();
        assert_eq!(kinds, vec![r#""a""#, r#""a""#, "IDENT"]);
        assert!(g.parse("r", "a and").is_err());
        assert!(g.parse("r", "a xyz").is_ok());

        let g = compile(r#"A = "\ba\b"; IDENT = "[a-z]+"; r = A, NAME:IDENT;"#).unwrap();
        assert_eq!(g.parse("r", "a and").unwrap().text("NAME").unwrap(), "and");
    }

    #[test]
    fn repeated_literal() {
        let g = compile(r#"list = ITEM:"a"+;"#).unwrap();
        let node = g.parse("list", "aaa").unwrap();

        assert_eq!(node.tokens("ITEM").unwrap().len(), 3);
    }

    #[test]
    fn every_notation_feature() {
        let g = compile(indoc! {r#"
            /* every notation feature */
            NUMBER = "\d+";
            NAME   = "[a-z]+";
            list   = ITEMS:item, ITEMS:(","!, :item)*;
            item   = NUMBER | NAME, SUFFIX:"?"?;
            pair   = "(", KEY:NAME+, ")";
        "#})
        .unwrap();

        assert_eq!(g.rules().len(), 11);

        let node = g.parse("list", "1, abc?, 2").unwrap();

        assert_eq!(
            node.print_to_string(),
            concat!(
                r#"(list, ITEMS: [(item, NUMBER: (NUMBER, "1")), "#,
                r#"(item, NAME: (NAME, "abc"), SUFFIX: ("?", "?")), "#,
                r#"(item, NUMBER: (NUMBER, "2"))])"#
            )
        );
    }

    #[test]
    fn all_tokens_must_be_consumed() {
        let g = compile(r#"X = "X"; Y = "Y"; a = X;"#).unwrap();

        assert!(g.parse("a", "X").is_ok());
        assert!(matches!(
            g.parse("a", "XY"),
            Err(Error::Parse(ParseError::NoMatch { .. }))
        ));

        // without a lexer rule for `Y` the input cannot even be tokenized
        let g = compile(r#"a = "X";"#).unwrap();
        assert!(matches!(g.parse("a", "XY"), Err(Error::Lex(_))));
    }

    #[test]
    fn conflicting_definitions() {
        assert!(matches!(
            compile(r#"A = "a"; A = b;"#),
            Err(Error::Grammar(GrammarError::ConflictingRule(_)))
        ));
    }
}
