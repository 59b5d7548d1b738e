//! Lumi CLI
//!
//! Usage:
//!   lumi [OPTIONS] resolve [TEMPLATE | --file FILE] [--seed N] [--extract]
//!   lumi [OPTIONS] extract [TEXT]
//!   lumi [OPTIONS] list
//!   lumi nodes
//!
//! Options:
//!   -c, --config <FILE>     Configuration file (TOML format)
//!   -w, --wildcards <DIR>   Wildcard directory, highest priority first (repeatable)
//!   -v, --verbose           Log store reloads and LoRA handling
//!   -h, --help              Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use lumi_pack::nodes::NODES;
use lumi_pack::{
    extract, extract_segments, CollectionStore, LumiConfig, ProcessedPrompt, Resolver,
};

#[derive(Parser)]
#[command(name = "lumi", version)]
#[command(about = "Wildcard prompt templates for image generation pipelines")]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Wildcard directory; repeat for several, highest priority first
    #[arg(short, long = "wildcards", global = true)]
    wildcards: Vec<PathBuf>,

    /// Log store reloads and LoRA handling
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a wildcard template
    Resolve {
        /// Template text (reads stdin if neither this nor --file is given)
        template: Option<String>,

        /// Read the template from a file
        #[arg(short, long, conflicts_with = "template")]
        file: Option<PathBuf>,

        /// Seed for sampling; 0 picks a fresh one each run
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Also print LoRA directives and BREAK segments
        #[arg(short = 'x', long = "extract")]
        show_directives: bool,
    },
    /// Print the LoRA directives and BREAK segments of a prompt
    Extract {
        /// Prompt text (reads stdin if not provided)
        text: Option<String>,
    },
    /// List every wildcard collection
    List,
    /// List the available nodes
    Nodes,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match &cli.config {
        Some(path) => match LumiConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => LumiConfig::default(),
    };

    match cli.command {
        Command::Resolve {
            template,
            file,
            seed,
            show_directives,
        } => {
            let template = match file {
                Some(path) => read_file(&path),
                None => input_or_stdin(template),
            };
            let store = open_store(&cli.wildcards, &config);
            let snapshot = store.get();
            let resolution = Resolver::new(snapshot.collections())
                .with_config(config.resolver.clone())
                .resolve(&template, seed);

            for diag in &resolution.diagnostics {
                eprint!("{}", diag.format(&template, "template"));
            }

            if show_directives {
                let extraction = extract(&resolution.text);
                let prompt = ProcessedPrompt {
                    segments: extract_segments(&extraction.clean_text),
                    resolved: resolution.text,
                    directives: extraction.directives,
                    diagnostics: resolution.diagnostics,
                };
                print_processed(&prompt);
            } else {
                println!("{}", resolution.text);
            }
        }
        Command::Extract { text } => {
            let text = input_or_stdin(text);
            let extraction = extract(&text);
            let prompt = ProcessedPrompt {
                segments: extract_segments(&extraction.clean_text),
                resolved: text,
                directives: extraction.directives,
                diagnostics: Vec::new(),
            };
            print_processed(&prompt);
        }
        Command::List => {
            let store = open_store(&cli.wildcards, &config);
            let snapshot = store.get();
            for diag in snapshot.diagnostics() {
                eprintln!("warning: {}", diag);
            }
            for collection in snapshot.collections().iter() {
                println!("__{}__\t{}", collection.name(), collection.len());
            }
        }
        Command::Nodes => {
            for node in NODES {
                println!("{:<24} {:<12} {}", node.class_name, node.category, node.display_name);
            }
        }
    }
}

fn open_store(wildcards: &[PathBuf], config: &LumiConfig) -> CollectionStore {
    if !wildcards.is_empty() {
        return CollectionStore::new(wildcards.to_vec());
    }
    match CollectionStore::from_config(&config.store) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn input_or_stdin(arg: Option<String>) -> String {
    if let Some(text) = arg {
        return text;
    }
    let mut buffer = String::new();
    match io::stdin().read_to_string(&mut buffer) {
        Ok(_) => buffer.trim_end_matches(['\n', '\r']).to_string(),
        Err(e) => {
            eprintln!("Error reading from stdin: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_processed(prompt: &ProcessedPrompt) {
    println!("{}", prompt.resolved);
    for directive in &prompt.directives {
        println!("lora\t{}", directive);
    }
    for segment in &prompt.segments {
        println!("segment\t{}", segment);
    }
}

fn read_file(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
