//! Command-line interface for papertex
//!
//! Usage:
//!   papertex sanitize `<path>`                         - Sanitized markup on stdout
//!   papertex extract `<path>` [--format json|yaml|text] - Extracted questions
//!   papertex preview `<path>`                          - Questions with rendered HTML, as JSON
//!   papertex render `<path>`                           - HTML for one fragment
//!   papertex diagnose `<log>`                          - Hint for a failed compile
//!
//! `<path>` may be `-` to read stdin. Global flags: `--config <file>` layers a
//! TOML file over the built-in defaults, `-v` turns on debug logging. Without
//! `--config`, a `papertex.toml` in the working directory is layered when present.

use clap::{Arg, ArgAction, ArgMatches, Command};
use papertex::papertex::config::{Loader, PapertexConfig};
use papertex::papertex::extract::Question;
use papertex::papertex::observe::TracingObserver;
use papertex::papertex::pipeline::Pipeline;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "papertex.toml";

fn main() {
    let matches = Command::new("papertex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sanitize, split and preview generated question papers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug events to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("sanitize")
                .about("Make a document safe to compile")
                .arg(path_arg("Path to the document, or - for stdin")),
        )
        .subcommand(
            Command::new("extract")
                .about("List the questions of a document")
                .arg(path_arg("Path to the document, or - for stdin"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "yaml", "text"])
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("preview")
                .about("Questions with prompt and solution rendered to HTML (JSON)")
                .arg(path_arg("Path to the document, or - for stdin")),
        )
        .subcommand(
            Command::new("render")
                .about("Render one fragment to HTML")
                .arg(path_arg("Path to the fragment, or - for stdin")),
        )
        .subcommand(
            Command::new("diagnose")
                .about("Explain a failed compile from its log")
                .arg(path_arg("Path to the compiler log, or - for stdin")),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));
    let config = load_config(matches.get_one::<String>("config"));
    let pipeline = Pipeline::from_config(&config).with_observer(Arc::new(TracingObserver));

    match matches.subcommand() {
        Some(("sanitize", sub)) => handle_sanitize_command(&pipeline, &read_input(sub)),
        Some(("extract", sub)) => {
            let format = sub
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("json");
            handle_extract_command(&pipeline, &read_input(sub), format);
        }
        Some(("preview", sub)) => handle_preview_command(&pipeline, &read_input(sub)),
        Some(("render", sub)) => print!("{}", pipeline.render(&read_input(sub))),
        Some(("diagnose", sub)) => handle_diagnose_command(&pipeline, &read_input(sub)),
        _ => unreachable!(),
    }
}

fn path_arg(help: &'static str) -> Arg {
    Arg::new("path").help(help).required(true).index(1)
}

fn init_logging(verbose: bool) {
    let directive = if verbose { "papertex=debug" } else { "papertex=info" };
    let filter = EnvFilter::from_default_env().add_directive(directive.parse().unwrap_or_else(
        |e| {
            eprintln!("Invalid log directive: {}", e);
            std::process::exit(1);
        },
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&String>) -> PapertexConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.build().unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        std::process::exit(1);
    })
}

fn read_input(matches: &ArgMatches) -> String {
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-");
    let result = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer).map(|_| buffer)
    } else {
        std::fs::read_to_string(path)
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    })
}

/// Handle the sanitize command
fn handle_sanitize_command(pipeline: &Pipeline, source: &str) {
    let sanitized = pipeline.sanitize(source);
    for warning in &sanitized.warnings {
        eprintln!("warning: {}", warning);
    }
    print!("{}", sanitized.text);
}

/// Handle the extract command
fn handle_extract_command(pipeline: &Pipeline, source: &str, format: &str) {
    let questions = pipeline.extract(source);
    let output = match format {
        "yaml" => serde_yaml::to_string(&questions).map_err(|e| e.to_string()),
        "text" => Ok(questions_as_text(&questions)),
        _ => serde_json::to_string_pretty(&questions).map_err(|e| e.to_string()),
    };
    match output {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            std::process::exit(1);
        }
    }
}

fn questions_as_text(questions: &[Question]) -> String {
    let mut out = String::new();
    for question in questions {
        match &question.marks_label {
            Some(marks) => out.push_str(&format!("Question {} [{}]\n", question.number, marks)),
            None => out.push_str(&format!("Question {}\n", question.number)),
        }
        out.push_str(&question.prompt);
        out.push('\n');
        if question.has_solution() {
            out.push_str("-- solution --\n");
            out.push_str(&question.solution);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Handle the preview command
fn handle_preview_command(pipeline: &Pipeline, source: &str) {
    let preview = pipeline.preview(source);
    match serde_json::to_string_pretty(&preview) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle the diagnose command
fn handle_diagnose_command(pipeline: &Pipeline, log: &str) {
    let diagnosis = pipeline.diagnose(log);
    match diagnosis.line {
        Some(line) => println!("line {}: {}", line, diagnosis.hint.message()),
        None => println!("{}", diagnosis.hint.message()),
    }
}
