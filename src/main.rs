// ifjc: IFJ24 to IFJcode24 compiler

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crossterm::style::Stylize;
use crossterm::tty::IsTty;

use ifjc::codegen;
use ifjc::errors::{CompileError, ErrorKind};
use ifjc::parser::parse::Parser;

struct Options {
    verbose: bool,
    input: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        verbose: false,
        input: None,
    };

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => options.verbose = true,
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(format!("Unknown option '{}'", flag));
            }
            path => {
                if options.input.is_some() {
                    return Err("Only one input file may be given".to_string());
                }
                options.input = Some(path.to_string());
            }
        }
    }

    Ok(options)
}

fn read_source(input: Option<&str>) -> io::Result<String> {
    match input {
        Some(path) if path != "-" => fs::read_to_string(path),
        _ => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn report(err: &CompileError, file: &str) {
    let location = match err.location {
        Some(location) => format!("{}:{}:{}", file, location.line, location.column),
        None => file.to_string(),
    };
    let headline = format!("{} (exit {})", err.kind, err.exit_code());

    if io::stderr().is_tty() {
        eprintln!("{}: {}: {}", location.bold(), headline.red().bold(), err.message);
    } else {
        eprintln!("{}: {}: {}", location, headline, err.message);
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("ifjc");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            eprintln!("Usage: {} [-v|--verbose] [FILE]", program_name);
            eprintln!();
            eprintln!("Reads IFJ24 source from FILE (or stdin) and writes IFJcode24 to stdout.");
            std::process::exit(ErrorKind::Internal.exit_code());
        }
    };

    if let Some(path) = options.input.as_deref() {
        if path != "-" && !Path::new(path).exists() {
            eprintln!("Error: File '{}' not found", path);
            std::process::exit(ErrorKind::Internal.exit_code());
        }
    }

    let display_name = options.input.clone().unwrap_or_else(|| "<stdin>".to_string());
    let source = match read_source(options.input.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", display_name, e);
            std::process::exit(ErrorKind::Internal.exit_code());
        }
    };

    if options.verbose {
        eprintln!("Parsing {}...", display_name);
    }

    let program = match Parser::new(&source).and_then(|mut parser| parser.parse_program()) {
        Ok(program) => program,
        Err(e) => {
            report(&e, &display_name);
            std::process::exit(e.exit_code());
        }
    };

    if options.verbose {
        eprintln!(
            "Parsed successfully. Found {} function definitions.",
            program.functions.len()
        );
        eprintln!("Generating IFJcode24...");
    }

    let code = codegen::generate(&program);

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(code.as_bytes()).and_then(|_| stdout.flush()) {
        eprintln!("Error: cannot write output: {}", e);
        std::process::exit(ErrorKind::Internal.exit_code());
    }

    if options.verbose {
        eprintln!("Done. {} lines emitted.", code.lines().count());
    }
}
