use clap::{Parser, ValueEnum};
use petty_xpath::{
    CliError, QueryOptions, query, render_json, render_text, render_tokens_text, tokens,
};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Evaluate an XPath expression against an XML file.
#[derive(Parser, Debug)]
#[command(name = "petty-xpath", version)]
struct Args {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the token stream instead of evaluating
    #[arg(long, default_value_t = false)]
    tokens: bool,

    /// Maximum nesting of predicates and function arguments
    #[arg(long, default_value_t = 32, env = "PETTY_XPATH_MAX_DEPTH")]
    max_depth: usize,

    /// Treat references to undeclared variables as errors
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// The expression to evaluate
    expr: String,

    /// The XML document to query
    file: Option<PathBuf>,
}

fn run(args: &Args) -> Result<String, CliError> {
    let options = QueryOptions {
        max_depth: args.max_depth,
        strict: args.strict,
    };

    if args.tokens {
        let records = tokens(&args.expr, options)?;
        return match args.format {
            Format::Text => Ok(render_tokens_text(&records)),
            Format::Json => render_json(&records),
        };
    }

    let Some(path) = &args.file else {
        return Err(CliError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "an XML file is required unless --tokens is given",
        )));
    };
    log::debug!("Reading {}", path.display());
    let xml = fs::read_to_string(path)?;
    let result = query(&args.expr, &xml, options)?;
    match args.format {
        Format::Text => Ok(render_text(&result)),
        Format::Json => render_json(&result),
    }
}

fn main() -> ExitCode {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "petty_xpath=info");
        }
    }
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
