use bnfparse::{compile_grammar, Node, Value};
use std::error::Error;

const CALCULATOR: &str = r#"
NUM        = "[0-9]+";

calculator = :expr;
expr       = FIRST:term, REST:(OP:"+", RIGHT:term | OP:"-", RIGHT:term)*;
term       = FIRST:factor, REST:(OP:"*", RIGHT:factor | OP:"/", RIGHT:factor | OP:"%", RIGHT:factor)*;
factor     = "("!, :expr, ")"! | :NUM;
"#;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage {} EXPRESSION", &args[0]);
        std::process::exit(2);
    }

    let input = &args[1];

    println!("parsing: {}", input);

    match calculate(input) {
        Ok(result) => println!("result: {}", result),
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}

fn calculate(input: &str) -> Result<u64, Box<dyn Error>> {
    let grammar = compile_grammar(CALCULATOR)?;
    let node = grammar.parse("calculator", input)?;

    walk(&node)
}

fn walk(node: &Node) -> Result<u64, Box<dyn Error>> {
    let mut acc = operand(node.get("FIRST")?)?;

    if node.contains("REST") {
        for rest in node.nodes("REST")? {
            let right = operand(rest.get("RIGHT")?)?;

            acc = match rest.text("OP")? {
                "+" => acc.checked_add(right),
                "-" => acc.checked_sub(right),
                "*" => acc.checked_mul(right),
                "/" => acc.checked_div(right),
                "%" => acc.checked_rem(right),
                op => return Err(format!("unknown operator {}", op).into()),
            }
            .ok_or("arithmetic overflow or division by zero")?;
        }
    }

    Ok(acc)
}

/// A factor is either a number or a parenthesized expression.
fn operand(value: &Value) -> Result<u64, Box<dyn Error>> {
    match value {
        Value::Token(token) => Ok(token.text.parse()?),
        Value::Node(node) => walk(node),
        Value::Sequence(_) => Err("unexpected sequence".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::calculate;

    #[test]
    fn calculator() {
        assert_eq!(calculate("1 + 2 * 3").unwrap(), 7);
        assert_eq!(calculate("(1 + 2) * 3").unwrap(), 9);
        assert_eq!(calculate("17 % 5 - 1").unwrap(), 1);
        assert_eq!(calculate("100 / (2 * 5) / 5").unwrap(), 2);
        assert!(calculate("1 / 0").is_err());
        assert!(calculate("1 +").is_err());
    }
}
