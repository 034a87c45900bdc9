//! Command-line interface for lex-highlight
//! Highlights the code blocks of HTML documents and inspects raw token dumps.
//!
//! Usage:
//!   lex-highlight highlight `<path>` [--config `<file>`] [--default-lang `<lang>`] [--line-numbers] [--no-styles]
//!   lex-highlight tokens `<path>` [--format simple|json]  - Print the colored runs of a raw token dump
//!   lex-highlight list-categories                        - Print the token category table

use clap::{Arg, ArgAction, Command};
use lex_highlight::config::{HighlightConfig, Loader};
use lex_highlight::highlight::categories::categories;
use lex_highlight::highlight::dom::{parse_document, serialize_document};
use lex_highlight::highlight::styles::inject_styles;
use lex_highlight::highlight::tokens::colored_runs_from_raw_tokens;
use lex_highlight::highlight::Diagnostics;
use lex_highlight::Highlighter;
use tracing_subscriber::EnvFilter;

fn main() {
    setup_tracing();

    let matches = Command::new("lex-highlight")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Syntax highlighting for the code blocks of HTML documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("highlight")
                .about("Highlight every code block of an HTML document")
                .arg(
                    Arg::new("path")
                        .help("Path to the HTML document")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                )
                .arg(
                    Arg::new("default-lang")
                        .long("default-lang")
                        .help("Language for code blocks without a highlight marker"),
                )
                .arg(
                    Arg::new("line-numbers")
                        .long("line-numbers")
                        .help("Number the lines of every pre block by default")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-styles")
                        .long("no-styles")
                        .help("Do not add style sheets to the document head")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the colored runs of a raw token dump")
                .arg(
                    Arg::new("path")
                        .help("Path to the token dump (pygmentize -f raw output)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: 'simple' or 'json'")
                        .value_parser(["simple", "json"])
                        .default_value("simple"),
                ),
        )
        .subcommand(Command::new("list-categories").about("Print the token category table"))
        .get_matches();

    match matches.subcommand() {
        Some(("highlight", highlight_matches)) => {
            let path = highlight_matches.get_one::<String>("path").unwrap();
            let config = load_config(highlight_matches);
            handle_highlight_command(path, &config);
        }
        Some(("tokens", tokens_matches)) => {
            let path = tokens_matches.get_one::<String>("path").unwrap();
            let format = tokens_matches.get_one::<String>("format").unwrap();
            handle_tokens_command(path, format);
        }
        Some(("list-categories", _)) => {
            handle_list_categories_command();
        }
        _ => unreachable!(),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (errors only by default)
fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Layer the config file and flags over the built-in defaults
fn load_config(matches: &clap::ArgMatches) -> HighlightConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }

    let loader = apply_overrides(loader, matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

fn apply_overrides(
    mut loader: Loader,
    matches: &clap::ArgMatches,
) -> Result<Loader, config::ConfigError> {
    if let Some(lang) = matches.get_one::<String>("default-lang") {
        loader = loader.set_override("highlight.default_language", lang.as_str())?;
    }
    if matches.get_flag("line-numbers") {
        loader = loader.set_override("highlight.line_numbers", true)?;
    }
    if matches.get_flag("no-styles") {
        loader = loader.set_override("output.include_styles", false)?;
    }
    Ok(loader)
}

/// Handle the highlight command
fn handle_highlight_command(path: &str, config: &HighlightConfig) {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    let dom = parse_document(&source);
    let highlighter = Highlighter::from_config(config);
    let mut diagnostics = Diagnostics::new();
    let outcome = highlighter.add_syntax_highlighting(&dom.document, &mut diagnostics);

    if config.output.include_styles {
        inject_styles(&dom.document, &outcome);
    }
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }

    let output = serialize_document(&dom).unwrap_or_else(|e| {
        eprintln!("Serialization error: {}", e);
        std::process::exit(1);
    });
    print!("{}", output);
}

/// Handle the tokens command
fn handle_tokens_command(path: &str, format: &str) {
    let dump = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    let runs = colored_runs_from_raw_tokens(&dump).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match format {
        "json" => {
            let runs: Vec<_> = runs.into_iter().collect();
            match serde_json::to_string_pretty(&runs) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ => {
            for run in &runs {
                println!("{}", run);
            }
        }
    }
}

/// Handle the list-categories command
fn handle_list_categories_command() {
    for category in categories() {
        println!("{:<4}{:<10}{}", category.tag, category.color, category.token_name);
    }
}
