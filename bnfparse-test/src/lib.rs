#![cfg(test)]

mod arithmetic;
mod sqlish;

use bnfparse::{compile_grammar, compile_grammar_with, Error, Options, ParseError, Visitor};
use indoc::indoc;
use rstest::rstest;

#[rstest]
#[case("FOO", 1)]
#[case("FOOBAR", 2)]
#[case("FOOBARBAZ", 3)]
#[case("FOOBARBAZBAZ", 4)]
#[case("FOOBARBAZBAZBAZ", 5)]
#[case("FOOBARBAR", 3)]
#[case("FOOBARBARBAZ", 4)]
#[case("FOOBARBARBARBAZ", 5)]
fn foo_bar_baz(#[case] input: &str, #[case] expected: usize) {
    let g = compile_grammar(indoc! {r#"
        FOO     = "FOO";
        BAR     = "BAR";
        BAZ     = "BAZ";
        fb      = :FOO,:BAR*;
        fbb     = ITEMS:fb,ITEMS:BAZ*;
    "#})
    .unwrap();

    let node = g.parse("fbb", input).unwrap();

    let mut visitor = Visitor::new(0).on("fbb", |v, n| {
        v.state = n.elements("ITEMS")?.len();
        Ok(())
    });
    node.accept(&mut visitor).unwrap();

    assert_eq!(visitor.into_state(), expected);
    // pass-through values are flattened into one token list
    assert_eq!(node.tokens("ITEMS").unwrap().len(), expected);
}

const QUERY_LANGUAGE: &str = indoc! {r#"
    /* Lexer rules */

    /* keywords */
    DATA_TYPE_INTEGER = "\bINT\b";
    DATA_TYPE_REAL = "\bREAL\b";
    DATA_TYPE_TEXT = "\bTEXT\b";
    DATA_TYPE_DATETIME = "\bDATETIME\b";
    NULL = "\bNULL\b";
    NOT = "\bNOT\b";

    CREATE = "\bCREATE\b";
    COLLECTION = "\bCOLLECTION\b";
    LEFT_PAREN = "[(]";
    RIGHT_PAREN = "[)]";
    COMMA = ",";
    IDENTIFIER      = "[A-Z_][A-Z_0-9]*";

    /* Parser rules */

    column_name = :IDENTIFIER;
    not_null = :(:NOT, :NULL);
    data_type = :DATA_TYPE_INTEGER | :DATA_TYPE_REAL | :DATA_TYPE_TEXT | :DATA_TYPE_DATETIME;
    column_definition = COLUMN_NAME:column_name, DATA_TYPE:data_type, NOT_NULL:not_null?;
    collection_element_list = LEFT_PAREN!, :column_definition, :(COMMA!, :column_definition)*, RIGHT_PAREN!;
    table_definition = CREATE!, COLLECTION!, NAME:IDENTIFIER, COLUMNS:collection_element_list;
    statement = STATEMENT:table_definition;
"#};

#[test]
fn query_language_rules() {
    let g = compile_grammar(QUERY_LANGUAGE).unwrap();

    assert_eq!(g.rules().len(), 24);
    assert_eq!(g.alternatives_of("data_type").count(), 4);
    assert_eq!(g.alternatives_of("anonymous_0").count(), 1);
}

#[test]
fn query_language_statement() {
    let g = compile_grammar(QUERY_LANGUAGE).unwrap();

    let node = g
        .parse(
            "statement",
            "CREATE COLLECTION MyCollection ( a int NOT NULL , b TEXT , c DATETIME )",
        )
        .unwrap();

    assert_eq!(
        node.print_to_string(),
        concat!(
            r#"(statement, STATEMENT: (table_definition, NAME: (IDENTIFIER, "MyCollection"), COLUMNS: ["#,
            r#"(column_definition, COLUMN_NAME: (IDENTIFIER, "a"), DATA_TYPE: (DATA_TYPE_INTEGER, "int"), NOT_NULL: [(NOT, "NOT"), (NULL, "NULL")]), "#,
            r#"(column_definition, COLUMN_NAME: (IDENTIFIER, "b"), DATA_TYPE: (DATA_TYPE_TEXT, "TEXT")), "#,
            r#"(column_definition, COLUMN_NAME: (IDENTIFIER, "c"), DATA_TYPE: (DATA_TYPE_DATETIME, "DATETIME"))]))"#
        )
    );

    let table = node.node("STATEMENT").unwrap();
    let columns: Vec<&str> = table
        .nodes("COLUMNS")
        .unwrap()
        .into_iter()
        .map(|column| column.text("COLUMN_NAME").unwrap())
        .collect();
    assert_eq!(columns, vec!["a", "b", "c"]);
}

#[test]
fn deterministic() {
    let g = compile_grammar(QUERY_LANGUAGE).unwrap();
    let input = "create collection t (x real, y int not null)";

    assert_eq!(g.parse("statement", input).unwrap(), g.parse("statement", input).unwrap());
}

#[test]
fn first_alternative_wins() {
    let g = compile_grammar(indoc! {r#"
        WORD = "[a-z]+";
        start = FIRST:WORD | SECOND:WORD;
    "#})
    .unwrap();

    let node = g.parse("start", "abc").unwrap();

    assert!(node.contains("FIRST"));
    assert!(!node.contains("SECOND"));
}

#[test]
fn one_or_more() {
    let g = compile_grammar(r#"list = ITEM:"a"+;"#).unwrap();

    assert_eq!(g.parse("list", "aaa").unwrap().tokens("ITEM").unwrap().len(), 3);
    assert!(g.parse("list", "").is_err());
}

#[test]
fn ignored_symbols() {
    let g = compile_grammar(r#"wrapped = "("!, VALUE:"x", ")"!;"#).unwrap();
    let node = g.parse("wrapped", "(x)").unwrap();

    assert_eq!(node.properties.keys().collect::<Vec<_>>(), vec!["VALUE"]);
}

#[test]
fn trailing_tokens() {
    let g = compile_grammar(r#"X = "X"; Y = "Y"; a = X;"#).unwrap();

    assert!(matches!(
        g.parse("a", "X Y"),
        Err(Error::Parse(ParseError::NoMatch { index: 1, .. }))
    ));
}

#[test]
fn options() {
    let source = indoc! {r#"
        KEYWORD = "select";
        COMMENT = "--[^\n]*";
        query   = KEYWORD;
    "#};

    let g = compile_grammar(source).unwrap();
    assert!(g.parse("query", "SELECT").is_ok());
    assert!(g.parse("query", "select -- all").is_err());

    let g = compile_grammar_with(source, Options::default().case_sensitive().ignore("COMMENT")).unwrap();
    assert!(g.parse("query", "select -- all").is_ok());
    assert!(g.parse("query", "SELECT").is_err());
}

#[test]
fn recursion_limit() {
    let source = indoc! {r#"
        OPEN  = "[(]";
        CLOSE = "[)]";
        X     = "x";
        nest  = OPEN!, INNER:nest, CLOSE! | X;
    "#};
    let input = format!("{}x{}", "(".repeat(20), ")".repeat(20));

    let g = compile_grammar(source).unwrap();
    assert!(g.parse("nest", &input).is_ok());

    let g = compile_grammar_with(source, Options::default().max_depth(10)).unwrap();
    assert!(matches!(
        g.parse("nest", &input),
        Err(Error::Parse(ParseError::RecursionLimit { limit: 10 }))
    ));
}
