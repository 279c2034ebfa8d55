//! A small filter language evaluated against an in-memory table. The
//! visitor turns each predicate into a closure and combines them.

use bnfparse::{compile_grammar, Grammar, Node, Result, Visitor};
use indoc::indoc;
use rstest::rstest;
use std::cmp::Ordering;

const GRAMMAR: &str = indoc! {r#"
    /* Lexer rules */

    AND             = "\bAND\b";
    OR              = "\bOR\b";
    EQ_OP           = "\bEQ\b";
    NE_OP           = "\bNE\b";
    LT_OP           = "\bLT\b";
    LE_OP           = "\bLE\b";
    GT_OP           = "\bGT\b";
    GE_OP           = "\bGE\b";
    LEFT_PAREN      = "[(]";
    RIGHT_PAREN     = "[)]";
    COMMA           = ",";
    IN              = "\bIN\b";
    CONTAINS        = "\bCONTAINS\b";
    BETWEEN         = "\bBETWEEN\b";
    ISBLANK         = "\bISBLANK\b";
    NOT             = "\bNOT\b";
    LITERAL_STRING  = "'[^']*'";
    LITERAL_NUMBER  = "[+-]?(\d+(\.\d*)?|\.\d+)";
    IDENTIFIER      = "[A-Z_][A-Z_0-9]*";

    /* Parser rules */

    comparison_operator =   :EQ_OP | :NE_OP | :LT_OP | :LE_OP | :GT_OP | :GE_OP;
    comparison_operand  =   :LITERAL_STRING | :LITERAL_NUMBER | :IDENTIFIER;
    comparison_predicate=   LHV:comparison_operand, OPERATOR:comparison_operator, RHV:comparison_operand;
    in_factor           =   COMMA!, :comparison_operand;
    in_predicate        =   LHV:comparison_operand, NOT:NOT?, IN!, LEFT_PAREN!, RHV:comparison_operand, RHV:in_factor*, RIGHT_PAREN!;
    between_predicate   =   LHV:comparison_operand, NOT:NOT?, BETWEEN!, OP1:comparison_operand, AND!, OP2:comparison_operand;
    contains_predicate  =   LHV:comparison_operand, NOT:NOT?, CONTAINS!, RHV:comparison_operand;
    blank_predicate     =   LHV:comparison_operand, NOT:NOT?, ISBLANK!;
    predicate           =   :comparison_predicate | :in_predicate | :between_predicate | :contains_predicate | :blank_predicate;
    boolean_primary     =   :predicate;
    boolean_primary     =   LEFT_PAREN!, CONDITION:search_condition, RIGHT_PAREN!;
    boolean_factor      =   AND!, :boolean_primary;
    boolean_term        =   AND:boolean_primary, AND:boolean_factor*;
    search_factor       =   OR!, :boolean_term;
    search_condition    =   OR:boolean_term, OR:search_factor*;
"#};

struct Customer {
    name: &'static str,
    age: u32,
    country: &'static str,
    sex: &'static str,
    rating: &'static str,
}

impl Customer {
    fn field(&self, column: &str) -> String {
        match column.to_lowercase().as_str() {
            "name" => self.name.to_owned(),
            "age" => self.age.to_string(),
            "country" => self.country.to_owned(),
            "sex" => self.sex.to_owned(),
            "rating" => self.rating.to_owned(),
            other => panic!("no column {}", other),
        }
    }
}

#[rustfmt::skip]
const CUSTOMERS: &[Customer] = &[
    Customer { name: "john", age: 40, country: "Australia", sex: "M", rating: "A" },
    Customer { name: "peter", age: 23, country: "UK", sex: "M", rating: "C" },
    Customer { name: "fred", age: 42, country: "USA", sex: "M", rating: "A" },
    Customer { name: "ian", age: 71, country: "France", sex: "M", rating: "B" },
    Customer { name: "tony", age: 18, country: "Canada", sex: "M", rating: "B" },
    Customer { name: "mark", age: 35, country: "Germany", sex: "M", rating: "C" },
    Customer { name: "david", age: 37, country: "Italy", sex: "M", rating: "C" },
    Customer { name: "jane", age: 52, country: "USA", sex: "F", rating: "" },
    Customer { name: "sarah", age: 55, country: "UK", sex: "F", rating: "A" },
    Customer { name: "sue", age: 61, country: "Italy", sex: "F", rating: "C" },
    Customer { name: "alice", age: 76, country: "France", sex: "F", rating: "B" },
    Customer { name: "karen", age: 39, country: "Australia", sex: "F", rating: "C" },
    Customer { name: "kate", age: 26, country: "Germany", sex: "F", rating: "A" },
    Customer { name: "lucy", age: 46, country: "Australia", sex: "F", rating: "A" },
    Customer { name: "brian", age: 30, country: "UK", sex: "M", rating: "C" },
    Customer { name: "paul", age: 49, country: "USA", sex: "M", rating: "C" },
];

type Filter = Box<dyn Fn(&Customer) -> bool>;

/// Numbers compare numerically, everything else as text.
fn compare(left: &str, right: &str) -> Ordering {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

fn literal(text: &str) -> String {
    text.trim_matches('\'').to_owned()
}

/// Push `filter`, inverted when the predicate carries `NOT`.
fn push(v: &mut Visitor<Vec<Filter>>, n: &Node, filter: Filter) {
    if n.contains("NOT") {
        v.state.push(Box::new(move |row: &Customer| !filter(row)));
    } else {
        v.state.push(filter);
    }
}

/// Build a filter for every node in the list.
fn filters(v: &mut Visitor<Vec<Filter>>, nodes: Vec<&Node>) -> Result<Vec<Filter>> {
    let mut list = Vec::new();

    for node in nodes {
        node.accept(v)?;
        list.extend(v.state.pop());
    }

    Ok(list)
}

fn filter_builder() -> Visitor<Vec<Filter>> {
    Visitor::new(Vec::<Filter>::new())
        .on("search_condition", |v, n| {
            let any = filters(v, n.nodes("OR")?)?;
            v.state.push(Box::new(move |row: &Customer| any.iter().any(|f| f(row))));
            Ok(())
        })
        .on("boolean_term", |v, n| {
            let all = filters(v, n.nodes("AND")?)?;
            v.state.push(Box::new(move |row: &Customer| all.iter().all(|f| f(row))));
            Ok(())
        })
        .on("comparison_predicate", |v, n| {
            let column = n.text("LHV")?.to_owned();
            let operator = n.token("OPERATOR")?.kind.clone();
            let value = literal(n.text("RHV")?);

            v.state.push(Box::new(move |row: &Customer| {
                let ordering = compare(&row.field(&column), &value);
                match operator.as_str() {
                    "EQ_OP" => ordering == Ordering::Equal,
                    "NE_OP" => ordering != Ordering::Equal,
                    "LT_OP" => ordering == Ordering::Less,
                    "LE_OP" => ordering != Ordering::Greater,
                    "GT_OP" => ordering == Ordering::Greater,
                    "GE_OP" => ordering != Ordering::Less,
                    _ => false,
                }
            }));
            Ok(())
        })
        .on("in_predicate", |v, n| {
            let column = n.text("LHV")?.to_owned();
            let values: Vec<String> = n
                .tokens("RHV")?
                .into_iter()
                .map(|token| literal(&token.text))
                .collect();

            push(v, n, Box::new(move |row: &Customer| values.contains(&row.field(&column))));
            Ok(())
        })
        .on("between_predicate", |v, n| {
            let column = n.text("LHV")?.to_owned();
            let low = literal(n.text("OP1")?);
            let high = literal(n.text("OP2")?);

            push(
                v,
                n,
                Box::new(move |row: &Customer| {
                    let value = row.field(&column);
                    compare(&value, &low) != Ordering::Less
                        && compare(&value, &high) != Ordering::Greater
                }),
            );
            Ok(())
        })
        .on("contains_predicate", |v, n| {
            let column = n.text("LHV")?.to_owned();
            let value = literal(n.text("RHV")?);

            push(v, n, Box::new(move |row: &Customer| row.field(&column).contains(&value)));
            Ok(())
        })
        .on("blank_predicate", |v, n| {
            let column = n.text("LHV")?.to_owned();

            push(v, n, Box::new(move |row: &Customer| row.field(&column).is_empty()));
            Ok(())
        })
}

fn grammar() -> Grammar {
    compile_grammar(GRAMMAR).unwrap()
}

#[test]
fn production_rules() {
    assert_eq!(grammar().rules().len(), 45);
}

#[rstest]
#[case("age BETWEEN 40 AND 60", 6)]
#[case("age NOT BETWEEN 40 AND 60", 10)]
#[case("country EQ 'UK'", 3)]
#[case("sex EQ 'F' AND age GT 50", 4)]
#[case("country IN ('USA', 'France')", 5)]
#[case("country NOT IN ('UK')", 13)]
#[case("rating ISBLANK", 1)]
#[case("rating NOT ISBLANK", 15)]
#[case("name CONTAINS 'ar'", 3)]
#[case("(country EQ 'UK' OR country EQ 'USA') AND sex EQ 'M'", 4)]
#[case("age LT 20 OR age GE 70", 3)]
fn filter_rows(#[case] input: &str, #[case] expected: usize) {
    let node = grammar().parse("search_condition", input).unwrap();

    let mut visitor = filter_builder();
    node.accept(&mut visitor).unwrap();

    let keep = visitor.into_state().pop().unwrap();
    let rows = CUSTOMERS.iter().filter(|&row| keep(row)).count();

    assert_eq!(rows, expected, "{}", input);
}

#[test]
fn predicate_shape() {
    let node = grammar()
        .parse("search_condition", "country NOT IN ('UK', 'USA')")
        .unwrap();

    assert_eq!(
        node.print_to_string(),
        concat!(
            r#"(search_condition, OR: [(boolean_term, AND: [(in_predicate, LHV: (IDENTIFIER, "country"), "#,
            r#"NOT: (NOT, "NOT"), RHV: [(LITERAL_STRING, "'UK'"), (LITERAL_STRING, "'USA'")])])])"#
        )
    );
}

#[test]
fn malformed_filters() {
    let g = grammar();

    for input in ["age BETWEEN 40", "country IN 'UK'", "(age LT 20", "age EQ"] {
        assert!(g.parse("search_condition", input).is_err(), "{}", input);
    }
}
