mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use vizmodel::config::load_config;
use vizmodel::{Model, SpecOptions};

#[derive(ClapParser, Debug)]
#[command(name = "vizm")]
#[command(about = "Inspect visual models declared in config files", long_about = None)]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the key and measure field names of a model
    Fields {
        /// Path to the model config (.yaml or .json)
        #[arg(env = "VIZM_CONFIG")]
        config: PathBuf,
    },
    /// Print the model spec as pretty JSON
    Spec {
        #[arg(env = "VIZM_CONFIG")]
        config: PathBuf,

        /// Keep data, selectionFilter and application in the output
        #[arg(long, default_value_t = false)]
        full: bool,

        /// Force a property into the JSON-mode output (repeatable)
        #[arg(long = "include", value_name = "PROP")]
        include: Vec<String>,
    },
    /// List required properties that hold no value
    Validate {
        #[arg(env = "VIZM_CONFIG")]
        config: PathBuf,
    },
}

fn open_model(path: &Path) -> Result<Model> {
    let config = load_config(path)?;
    let model = config
        .instantiate()
        .with_context(|| format!("Failed to instantiate model from {:?}", path))?;
    debug!(model_type = model.model_type().id(), "model loaded");
    Ok(model)
}

fn join(names: &[impl AsRef<str>]) -> String {
    names.iter().map(|n| n.as_ref()).collect::<Vec<_>>().join(", ")
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Commands::Fields { config } => {
            let model = open_model(&config)?;
            println!("keys:     {}", join(&model.key_field_names()));
            println!("measures: {}", join(&model.measure_field_names()));
        }
        Commands::Spec {
            config,
            full,
            include,
        } => {
            let model = open_model(&config)?;
            let options = include.iter().fold(
                if full {
                    SpecOptions::full()
                } else {
                    SpecOptions::json()
                },
                |options, name| options.omit(name.as_str(), false),
            );
            let spec = model.to_spec(&options);
            println!(
                "{}",
                serde_json::to_string_pretty(&spec).context("Failed to render spec")?
            );
        }
        Commands::Validate { config } => {
            let model = open_model(&config)?;
            let problems = model.validate();
            if !problems.is_empty() {
                for problem in &problems {
                    println!("  → {}", problem);
                }
                return Ok(ExitCode::FAILURE);
            }
            info!(model_type = model.model_type().id(), "model is valid");
            println!("ok");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose)?;
    run(args)
}
