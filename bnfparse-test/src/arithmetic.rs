use bnfparse::{compile_grammar, Grammar, Node, Result, Visitor};
use indoc::indoc;
use rstest::rstest;

const LEXER_RULES: &str = indoc! {r#"
    NUMBER_LITERAL  = "\d+";
    PLUS_OP         = "[+]";
    MINUS_OP        = "-";
    MUL_OP          = "[*]";
    DIV_OP          = "/";
    LPAREN          = "[(]";
    RPAREN          = "[)]";
"#};

/// One rule per precedence level, repetition through helper rules.
const LAYERED: &str = indoc! {"
    expression      = minus_plus_expr | term;
    minus_plus_expr = TERMS:term, TERMS:minus_plus_expr_*;
    minus_plus_expr_
                    = OP:MINUS_OP, term | OP:PLUS_OP, term;

    term            = mul_div_term | factor;
    mul_div_term    = FACTORS:factor, FACTORS:mul_div_term_*;
    mul_div_term_   = OP:DIV_OP, factor | OP:MUL_OP, factor;

    factor          = primary | PLUS_OP, primary | MINUS_OP, primary;
    primary         = NUMBER_LITERAL | LPAREN!, expression, RPAREN!;
"};

/// The same language with the helper rules written inline.
const SUB_RULES: &str = indoc! {"
    expression      = TERMS:(:term, :(OP:MINUS_OP, term | OP:PLUS_OP, term)*);
    term            = FACTORS:(:factor, :(OP:DIV_OP, factor | OP:MUL_OP, factor)*);
    factor          = primary | PLUS_OP, primary | MINUS_OP, primary;
    primary         = NUMBER_LITERAL | LPAREN!, expression, RPAREN!;
"};

fn grammar(parser_rules: &str) -> Grammar {
    compile_grammar(&format!("{}{}", LEXER_RULES, parser_rules)).unwrap()
}

/// Visit every operand, folding it into the running result with the
/// operator stored next to it. The first operand has no operator.
fn fold(v: &mut Visitor<Vec<i64>>, operands: Vec<&Node>) -> Result<i64> {
    let mut acc = 0;

    for operand in operands {
        operand.accept(v)?;
        let value = v.state.pop().unwrap();

        acc = if operand.contains("OP") {
            match operand.text("OP")? {
                "+" => acc + value,
                "-" => acc - value,
                "*" => acc * value,
                "/" => acc / value,
                op => panic!("unexpected operator {}", op),
            }
        } else {
            value
        };
    }

    Ok(acc)
}

/// A stack calculator. `sum` and `product` name the rules holding the
/// `TERMS` and `FACTORS` lists.
fn calculator(sum: &str, product: &str) -> Visitor<Vec<i64>> {
    Visitor::new(Vec::<i64>::new())
        .on(sum, |v, n| {
            let value = fold(v, n.nodes("TERMS")?)?;
            v.state.push(value);
            Ok(())
        })
        .on(product, |v, n| {
            let value = fold(v, n.nodes("FACTORS")?)?;
            v.state.push(value);
            Ok(())
        })
        .on("factor", |v, n| {
            n.node("primary")?.accept(v)?;
            if n.contains("MINUS_OP") {
                let value = v.state.pop().unwrap();
                v.state.push(-value);
            }
            Ok(())
        })
        .on("primary", |v, n| {
            if n.contains("NUMBER_LITERAL") {
                v.state.push(n.text("NUMBER_LITERAL")?.parse().unwrap());
                Ok(())
            } else {
                n.node("expression")?.accept(v)
            }
        })
}

fn evaluate(grammar: &Grammar, mut visitor: Visitor<Vec<i64>>, input: &str) -> i64 {
    let node = grammar.parse("expression", input).unwrap();

    node.accept(&mut visitor).unwrap();

    let mut stack = visitor.into_state();
    assert_eq!(stack.len(), 1, "{}", input);
    stack.pop().unwrap()
}

#[rstest]
#[case("4", 4)]
#[case("-4", -4)]
#[case("9+9", 18)]
#[case("1+2+3+4", 10)]
#[case("2*3", 6)]
#[case("1+2*3", 7)]
#[case("(1+2)*3", 9)]
#[case("2*-3", -6)]
#[case("-2*-3", 6)]
#[case("3*4+5*6", 42)]
#[case("7-4", 3)]
#[case("10-3+2", 9)]
#[case("10-2*3+4*5", 24)]
#[case("10--2*3+4*5", 36)]
#[case("10+8/2-2*5", 4)]
#[case("((((1+7)/(3-1))/2)*(5+2)+(-7+15)-(-2*-4))", 14)]
#[case("6*2/3", 4)]
fn arithmetic(#[case] input: &str, #[case] expected: i64) {
    let layered = grammar(LAYERED);
    assert_eq!(
        evaluate(&layered, calculator("minus_plus_expr", "mul_div_term"), input),
        expected
    );

    let sub_rules = grammar(SUB_RULES);
    assert_eq!(
        evaluate(&sub_rules, calculator("expression", "term"), input),
        expected
    );
}

#[test]
fn sub_rule_tree() {
    let g = grammar(SUB_RULES);
    let node = g.parse("expression", "1-2").unwrap();

    assert_eq!(
        node.print_to_string(),
        concat!(
            r#"(expression, TERMS: [(term, FACTORS: [(factor, primary: (primary, NUMBER_LITERAL: (NUMBER_LITERAL, "1")))]), "#,
            r#"(anonymous_1, OP: (MINUS_OP, "-"), term: (term, FACTORS: [(factor, primary: (primary, NUMBER_LITERAL: (NUMBER_LITERAL, "2")))]))])"#
        )
    );
}

#[test]
fn incomplete_expressions() {
    let g = grammar(SUB_RULES);

    for input in ["1+", "(1+2", "1 2", "*3"] {
        assert!(g.parse("expression", input).is_err(), "{}", input);
    }
}
