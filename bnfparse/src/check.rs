use crate::grammar::{Grammar, RuleKind};
use std::collections::HashSet;

pub fn check_grammar(grammar: &Grammar) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut used = HashSet::new();

    for rule in grammar.rules().iter().filter(|r| r.kind == RuleKind::Parser) {
        for symbol in &rule.symbols {
            if !grammar.is_parser_rule(&symbol.name) && !grammar.is_lexer_rule(&symbol.name) {
                warnings.push(format!(
                    "rule {} references {} which is not defined",
                    rule.name, symbol.name
                ));
            }
            used.insert(symbol.name.as_str());
        }
    }

    let mut reported = HashSet::new();

    // the first parser rule is taken as the entry point
    for rule in grammar
        .rules()
        .iter()
        .filter(|r| r.kind == RuleKind::Parser)
        .skip(1)
    {
        if !used.contains(rule.name.as_str()) && reported.insert(rule.name.as_str()) {
            warnings.push(format!("rule {} is not used anywhere", rule.name));
        }
    }

    let mut reported = HashSet::new();

    for rule in grammar.rules().iter().filter(|r| r.kind == RuleKind::Parser) {
        if !reported.contains(rule.name.as_str())
            && is_left_recursive(grammar, &rule.name, &rule.name, &mut Vec::new())
        {
            reported.insert(rule.name.as_str());
            warnings.push(format!("rule {} is left recursive", rule.name));
        }
    }

    warnings
}

/// Whether `target` can be reached again from `name` without consuming a
/// token. Leading optional symbols are looked through.
fn is_left_recursive<'g>(
    grammar: &'g Grammar,
    target: &str,
    name: &'g str,
    examined: &mut Vec<&'g str>,
) -> bool {
    for rule in grammar.alternatives_of(name) {
        for symbol in &rule.symbols {
            if symbol.name == target {
                return true;
            }

            if !examined.contains(&symbol.name.as_str()) {
                examined.push(&symbol.name);
                if is_left_recursive(grammar, target, &symbol.name, examined) {
                    return true;
                }
            }

            if !symbol.optional {
                break;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, Options, ProductionRule};

    #[test]
    fn clean_grammar() {
        let g = Grammar::new(
            vec![
                ProductionRule::lexer("A", "a"),
                ProductionRule::parser("start", &["item+"]),
                ProductionRule::parser("item", &["A"]),
            ],
            Options::default(),
        )
        .unwrap();

        assert!(g.check().is_empty());
    }

    #[test]
    fn undefined_and_unused() {
        let g = Grammar::new(
            vec![
                ProductionRule::lexer("A", "a"),
                ProductionRule::parser("start", &["A", "missing"]),
                ProductionRule::parser("orphan", &["A"]),
                ProductionRule::parser("orphan", &["A", "A"]),
            ],
            Options::default(),
        )
        .unwrap();

        assert_eq!(
            g.check(),
            vec![
                "rule start references missing which is not defined",
                "rule orphan is not used anywhere",
            ]
        );
    }

    #[test]
    fn left_recursion() {
        let g = Grammar::new(
            vec![
                ProductionRule::lexer("PLUS", "[+]"),
                ProductionRule::lexer("NUM", "[0-9]+"),
                ProductionRule::parser("expr", &["sum"]),
                ProductionRule::parser("expr", &["NUM"]),
                ProductionRule::parser("sum", &["PLUS?", "expr", "PLUS", "NUM"]),
                ProductionRule::parser("list", &["PLUS", "list"]),
            ],
            Options::default(),
        )
        .unwrap();

        let warnings = g.check();
        assert!(warnings.contains(&String::from("rule expr is left recursive")));
        assert!(warnings.contains(&String::from("rule sum is left recursive")));
        assert!(!warnings.contains(&String::from("rule list is left recursive")));
    }
}
