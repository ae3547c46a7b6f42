use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser as ClapParser;

use loxlet::error::LoxError;
use loxlet::interpreter::Interpreter;
use loxlet::parser::Parser;
use loxlet::resolver::Resolver;
use loxlet::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(
    name = "interp",
    version,
    about = "Tree-walking interpreter for a Lox-family language with ML-style let bindings"
)]
struct Cli {
    /// Script to execute; starts a REPL when omitted.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli: Cli = match Cli::try_parse() {
        Ok(cli) => cli,

        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(());
        }

        Err(_) => {
            eprintln!("Usage: interp [script]");
            process::exit(64);
        }
    };

    let code: i32 = match cli.script {
        Some(path) => run_file(&path)?,
        None => run_prompt()?,
    };

    if code != 0 {
        process::exit(code);
    }

    Ok(())
}

fn run_file(path: &Path) -> anyhow::Result<i32> {
    let source: Vec<u8> =
        fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let mut interpreter = Interpreter::new(io::stdout());

    match run(&mut interpreter, source) {
        Ok(()) => Ok(0),

        Err(errors) => {
            for error in &errors {
                eprintln!("{}", error);
            }

            Ok(errors.iter().map(LoxError::exit_code).max().unwrap_or(0))
        }
    }
}

fn run_prompt() -> anyhow::Result<i32> {
    let stdin = io::stdin();
    let mut interpreter = Interpreter::new(io::stdout());
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF ends the session.
            return Ok(0);
        }

        if let Err(errors) = run(&mut interpreter, line.as_bytes().to_vec()) {
            for error in &errors {
                eprintln!("{}", error);
            }

            // Language errors keep the loop alive; host failures end it.
            if errors.iter().any(|e| matches!(e, LoxError::Io(_))) {
                return Ok(1);
            }
        }
    }
}

/// One pipeline pass: scan, parse, resolve, interpret.  Scan and parse
/// errors are accumulated and reported together; if any occurred the later
/// stages never run.  The interpreter (globals, binding distances) carries
/// over between calls, the resolver is rebuilt per batch.
fn run<W: Write>(interpreter: &mut Interpreter<W>, source: Vec<u8>) -> Result<(), Vec<LoxError>> {
    let (tokens, mut errors) = Scanner::new(source).scan_tokens();

    let (statements, parse_errors) = Parser::new(tokens).parse();
    errors.extend(parse_errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    if let Err(e) = Resolver::new(interpreter).resolve(&statements) {
        return Err(vec![e]);
    }

    interpreter.interpret(&statements).map_err(|e| vec![e])
}
