use bnfparse::compile_grammar;
use std::process::ExitCode;
use std::str::FromStr;
use std::{env, fs};

fn main() -> ExitCode {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_owned());
    let level = log::LevelFilter::from_str(&level).unwrap_or(log::LevelFilter::Warn);

    let _ = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    );

    let mut args = env::args();

    args.next();

    let Some(filename) = args.next() else {
        eprintln!("usage: bnfparse GRAMMAR_FILE [ROOT INPUT]");
        return ExitCode::FAILURE;
    };

    match run(&filename, args.next(), args.next()) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {}", filename, err);
            ExitCode::FAILURE
        }
    }
}

fn run(
    filename: &str,
    root: Option<String>,
    input: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(filename)?;

    let grammar = compile_grammar(&src)?;

    match (root, input) {
        (Some(root), Some(input)) => Ok(grammar.parse(&root, &input)?.print_to_string()),
        (Some(_), None) => Err("missing INPUT after ROOT".into()),
        _ => Ok(grammar.to_string()),
    }
}
