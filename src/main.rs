//! plumber - part inspection tool
//!
//! Loads a directory of declarative parts, composes a target class from
//! named parts and prints the resulting attributes, or the collision that
//! stopped the composition.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use plumber::compose::Composer;
use plumber::core::config::PlumbingConfig;
use plumber::core::types::Stage;
use plumber::registry::{PartRegistry, RegistryError, TargetSpec};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "plumber")]
#[command(about = "Compose a class from declarative parts and inspect the result")]
struct Args {
    /// Directory of part files (*.toml, searched recursively)
    #[arg(long, default_value = "data/parts")]
    parts: PathBuf,

    /// Name of the composed class
    #[arg(long, default_value = "Composed")]
    target: String,

    /// Part to compose, in order (repeatable)
    #[arg(long = "part")]
    part: Vec<String>,

    /// Composition config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// List loaded parts and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Print the folded instruction history of every name
    #[arg(long, default_value_t = false)]
    stacks: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plumber=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => PlumbingConfig::load(path)?,
        None => PlumbingConfig::default(),
    };
    let composer = Composer::with_config(config);

    let mut registry = PartRegistry::new();
    registry
        .load_directory(&args.parts)
        .map_err(|e| e.to_string())?;

    if args.list {
        for name in registry.names() {
            let tags = registry
                .get(name)
                .map(|p| p.tags().iter().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            if tags.is_empty() {
                println!("{}", name);
            } else {
                println!("{} [{}]", name, tags);
            }
        }
        return Ok(());
    }

    let spec = args
        .part
        .iter()
        .fold(TargetSpec::new(args.target.as_str()), |spec, name| {
            spec.part(name.as_str())
        });

    if args.stacks {
        let decl = registry.resolve(&spec).map_err(|e| e.to_string())?;
        let stacks = composer.fold(&decl).map_err(|e| e.to_string())?;
        for stage in [Stage::Stage1, Stage::Stage2] {
            println!("== {} ==", stage);
            for stack in stacks.stage(stage) {
                println!("{}", stack.name());
                for entry in stack.history() {
                    println!("    {}", entry);
                }
            }
        }
        return Ok(());
    }

    let class = match registry.compose(&composer, &spec) {
        Ok(class) => class,
        Err(RegistryError::Composition { target, source }) => {
            return Err(match source.as_collision() {
                Some(collision) => format!("Cannot compose {}, collision on {}", target, collision),
                None => format!("Cannot compose {}: {}", target, source),
            });
        }
        Err(e) => return Err(e.to_string()),
    };

    let attrs = class.resolved_attrs();
    match args.format {
        Format::Text => {
            println!("class {}", class.name());
            for (name, value) in &attrs {
                println!("    {} = {}", name, value.repr());
            }
        }
        Format::Json => {
            let output = serde_json::json!({
                "name": class.name(),
                "attributes": attrs,
            });
            let rendered = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
            println!("{}", rendered);
        }
    }
    Ok(())
}
