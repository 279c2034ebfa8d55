use crate::error::{GrammarError, LexError};
use crate::grammar::Grammar;
use crate::node::Token;
use crate::utils::preview;
use regex::{Regex, RegexBuilder};

const PREVIEW_LEN: usize = 50;

/// A lexer rule with its pattern compiled and anchored to the start of the
/// remaining input.
#[derive(Debug)]
pub(crate) struct Lexer {
    pub kind: String,
    regex: Regex,
}

impl Lexer {
    pub fn new(kind: &str, pattern: &str, case_insensitive: bool) -> Result<Self, GrammarError> {
        let regex = RegexBuilder::new(&format!(r"\A(?:{})", pattern))
            .case_insensitive(case_insensitive)
            .multi_line(true)
            .build()
            .map_err(|source| GrammarError::InvalidPattern {
                rule: kind.to_owned(),
                source,
            })?;

        Ok(Lexer {
            kind: kind.to_owned(),
            regex,
        })
    }

    /// Length of the prefix of `input` this rule matches. Empty matches do
    /// not count, they would never make progress.
    fn match_len(&self, input: &str) -> Option<usize> {
        self.regex
            .find(input)
            .map(|m| m.end())
            .filter(|len| *len > 0)
    }
}

/// Split `input` into tokens. Leading whitespace is skipped before each
/// token; the first lexer rule that matches wins.
pub(crate) fn tokenize(grammar: &Grammar, input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let rest = &input[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.is_empty() {
            break;
        }

        let (lexer, len) = grammar
            .lexers
            .iter()
            .find_map(|lexer| lexer.match_len(trimmed).map(|len| (lexer, len)))
            .ok_or_else(|| LexError {
                offset: pos,
                preview: preview(trimmed, PREVIEW_LEN),
            })?;

        let text = &trimmed[..len];
        pos += len;

        if grammar.ignored.contains(&lexer.kind) {
            log::trace!("skipped {} {:?}", lexer.kind, text);
            continue;
        }

        log::trace!("token {} {:?}", lexer.kind, text);
        tokens.push(Token::new(&lexer.kind, text));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, Options, ProductionRule};
    use crate::node::Token;

    fn grammar(rules: &[(&str, &str)], options: Options) -> Grammar {
        let mut list: Vec<ProductionRule> = rules
            .iter()
            .map(|(name, pattern)| ProductionRule::lexer(*name, *pattern))
            .collect();
        list.push(ProductionRule::parser("start", &["any"]));

        Grammar::new(list, options).unwrap()
    }

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn first_match_wins() {
        let g = grammar(&[("KEYWORD", "select"), ("IDENT", "[a-z]+")], Options::default());

        let tokens = g.tokenize("select selection").unwrap();
        assert_eq!(kinds(&tokens), vec!["KEYWORD", "KEYWORD", "IDENT"]);
        assert_eq!(tokens[2].text, "ion");

        let g = grammar(&[("KEYWORD", r"select\b"), ("IDENT", "[a-z]+")], Options::default());
        let tokens = g.tokenize("select selection").unwrap();
        assert_eq!(kinds(&tokens), vec!["KEYWORD", "IDENT"]);
    }

    #[test]
    fn whitespace_is_skipped() {
        let g = grammar(&[("COLON", "[:]"), ("WORD", r"\w+")], Options::default());

        let tokens = g.tokenize("\n  : there\n  is:").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("COLON", ":"),
                Token::new("WORD", "there"),
                Token::new("WORD", "is"),
                Token::new("COLON", ":"),
            ]
        );
    }

    #[test]
    fn empty_input() {
        let g = grammar(&[("WORD", r"\w+")], Options::default());

        assert!(g.tokenize("").unwrap().is_empty());
        assert!(g.tokenize(" \t\n ").unwrap().is_empty());
    }

    #[test]
    fn ignored_kinds() {
        let g = grammar(
            &[("COMMENT", r"/\*[\s\S]*?\*/"), ("WORD", r"\w+")],
            Options::default().ignore("COMMENT"),
        );

        let tokens = g.tokenize("a /* b */ c /* d\n e */").unwrap();
        assert_eq!(kinds(&tokens), vec!["WORD", "WORD"]);
        assert_eq!(tokens[1].text, "c");
    }

    #[test]
    fn case_sensitivity() {
        let g = grammar(&[("AND", r"\bAND\b"), ("WORD", r"\w+")], Options::default());
        assert_eq!(kinds(&g.tokenize("and").unwrap()), vec!["AND"]);

        let g = grammar(
            &[("AND", r"\bAND\b"), ("WORD", r"\w+")],
            Options::default().case_sensitive(),
        );
        assert_eq!(kinds(&g.tokenize("and").unwrap()), vec!["WORD"]);
    }

    #[test]
    fn empty_matches_are_skipped() {
        let g = grammar(&[("MAYBE", "x*"), ("Y", "y")], Options::default());

        assert_eq!(kinds(&g.tokenize("xxy").unwrap()), vec!["MAYBE", "Y"]);
    }

    #[test]
    fn unmatched_input() {
        let g = grammar(&[("LPAREN", "[(]")], Options::default());

        let err = g.tokenize(" ( ( a( b").unwrap_err();
        assert_eq!(err.offset, 5);
        assert_eq!(err.preview, "a( b");

        let long = "z".repeat(80);
        let err = g.tokenize(&long).unwrap_err();
        assert_eq!(err.preview.len(), 50);
    }
}
