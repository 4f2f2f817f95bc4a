//! # Dataset Console
//!
//! Loads a dataset catalog and asks which dataset to open.

use cache_console::{ConsoleConfig, ConsoleError, ConsoleRuntime};
use dataset_picker::{ReaderPrompt, Resolution, ScriptedPrompt};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::prelude::*;

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(&args[0]);
        process::exit(1);
    });

    match run(&config) {
        Ok(Resolution::Resolved { .. } | Resolution::Cancelled) => {}
        Ok(_) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(config: &ConsoleConfig) -> Result<Resolution<cache_console::LoadedDataset>, ConsoleError> {
    // The log filter comes from settings, so they load before the subscriber exists
    let settings = ConsoleRuntime::load_settings(config)?;
    init_tracing(&settings.log_level);

    let runtime = ConsoleRuntime::with_settings(config, settings)?;
    let mut stdout = io::stdout();

    match &config.script {
        Some(text) => {
            let mut script = ScriptedPrompt::from_text(text)?;
            runtime.run(&mut script, &mut stdout)
        }
        None => {
            let mut prompt = ReaderPrompt::new(io::stdin().lock(), io::stdout());
            runtime.run(&mut prompt, &mut stdout)
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .init();
}

fn parse_args(args: &[String]) -> Result<ConsoleConfig, String> {
    let mut config = ConsoleConfig::default();
    let mut catalog = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--catalog" | "-c" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --catalog".to_string());
                }
                catalog = Some(PathBuf::from(&args[i]));
            }
            "--settings" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --settings".to_string());
                }
                config.settings_path = Some(PathBuf::from(&args[i]));
            }
            "--script" | "-s" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --script".to_string());
                }
                let script_text = fs::read_to_string(&args[i])
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(script_text);
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    config.catalog_path = catalog.ok_or_else(|| "Missing --catalog".to_string())?;
    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} --catalog <FILE> [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --catalog <FILE>     JSON catalog of data sets to load");
    eprintln!("  --settings <FILE>        Settings file (defaults apply if missing)");
    eprintln!("  -s, --script <FILE>      Answers to replay instead of reading stdin");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG                 Log filter, overrides the settings log_level");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --catalog data/catalog.json", program);
    eprintln!(
        "  {} --catalog data/catalog.json --script answers.txt",
        program
    );
}
