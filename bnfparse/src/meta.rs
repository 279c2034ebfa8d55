//! The grammar of the grammar notation, built directly from rule values.
//!
//! ```text
//! /* comment */
//! NUMBER = "\d+";
//! expr   = TERMS:(:term, :(OP:PLUS, term)*) | "(", expr, ")"!;
//! ```

use crate::grammar::{Grammar, Options, ProductionRule};
use once_cell::sync::Lazy;

pub(crate) const ROOT: &str = "grammar";

pub(crate) static META: Lazy<Grammar> = Lazy::new(|| {
    Grammar::new(rules(), Options::default().case_sensitive().ignore("COMMENT"))
        .expect("the meta grammar is well formed")
});

fn rules() -> Vec<ProductionRule> {
    vec![
        ProductionRule::lexer("COMMENT", r"/\*[\s\S]*?\*/"),
        ProductionRule::lexer("EQ", "="),
        ProductionRule::lexer("COMMA", ","),
        ProductionRule::lexer("COLON", ":"),
        ProductionRule::lexer("SEMICOLON", ";"),
        ProductionRule::lexer("MODIFIER", r"[?!+*]"),
        ProductionRule::lexer("OR", r"\|"),
        ProductionRule::lexer("QUOTEDLITERAL", r#""(?:[^"\\]|\\.)*""#),
        ProductionRule::lexer("IDENTIFIER", r"[a-zA-Z_][a-zA-Z0-9_']*"),
        ProductionRule::lexer("LPAREN", r"\("),
        ProductionRule::lexer("RPAREN", r"\)"),
        ProductionRule::parser(ROOT, &["RULES:rule+"]),
        // `alias:` or `:` on its own
        ProductionRule::parser("alias", &["NAME:IDENTIFIER?", "COLON!"]),
        ProductionRule::parser("subrule", &["LPAREN!", ":alternation", "RPAREN!"]),
        ProductionRule::parser("symbol", &["ALIAS:alias?", "SUBRULE:subrule", "MODIFIER:MODIFIER?"]),
        ProductionRule::parser("symbol", &["ALIAS:alias?", "IDENTIFIER:IDENTIFIER", "MODIFIER:MODIFIER?"]),
        ProductionRule::parser("symbol", &["ALIAS:alias?", "LITERAL:QUOTEDLITERAL", "MODIFIER:MODIFIER?"]),
        ProductionRule::parser("sequence_tail", &["COMMA!", ":symbol"]),
        ProductionRule::parser("sequence", &["SYMBOL:symbol", "SYMBOL:sequence_tail*"]),
        ProductionRule::parser("alternation_tail", &["OR!", ":sequence"]),
        ProductionRule::parser("alternation", &["ALTERNATE:sequence", "ALTERNATE:alternation_tail*"]),
        ProductionRule::parser("rule", &["NAME:IDENTIFIER", "EQ!", "PATTERN:QUOTEDLITERAL", "SEMICOLON!"]),
        ProductionRule::parser("rule", &["NAME:IDENTIFIER", "EQ!", "EXPANSION:alternation", "SEMICOLON!"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_grammar_is_clean() {
        assert!(META.check().is_empty());
        assert_eq!(META.alternatives_of("symbol").count(), 3);
    }

    #[test]
    fn tokenize_notation() {
        let tokens = META
            .tokenize(r#"/* c */ r = A:"x\"y"?, :(b | c)+;"#)
            .unwrap();
        let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();

        assert_eq!(
            kinds,
            vec![
                "IDENTIFIER", "EQ", "IDENTIFIER", "COLON", "QUOTEDLITERAL", "MODIFIER", "COMMA",
                "COLON", "LPAREN", "IDENTIFIER", "OR", "IDENTIFIER", "RPAREN", "MODIFIER",
                "SEMICOLON",
            ]
        );
        assert_eq!(tokens[4].text, r#""x\"y""#);
    }

    #[test]
    fn parse_rule_tree() {
        let node = META.parse(ROOT, r#"wrapped = "("!, VALUE:x;"#).unwrap();

        assert_eq!(
            node.print_to_string(),
            concat!(
                r#"(grammar, RULES: [(rule, NAME: (IDENTIFIER, "wrapped"), EXPANSION: (alternation, "#,
                r#"ALTERNATE: [(sequence, SYMBOL: [(symbol, LITERAL: (QUOTEDLITERAL, "\"(\""), MODIFIER: (MODIFIER, "!")), "#,
                r#"(symbol, ALIAS: (alias, NAME: (IDENTIFIER, "VALUE")), IDENTIFIER: (IDENTIFIER, "x"))])]))])"#
            )
        );
    }
}
