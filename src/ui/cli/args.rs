use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde_json::Value;

use crate::classifiers::scorers::DEFAULT_TEMPERATURE;
use crate::config::{CentroidParameters, EngineConfig, ScorerChoice};

pub const DEFAULT_STORE_FILE: &str = "scribble-store.json";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Teach and query an incremental sketch classifier"
)]
pub struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Example store file (defaults to ./scribble-store.json)
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Centroid model to consult before nearest neighbors
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub model: Option<PathBuf>,

    /// Override config fields (key=value, nested keys with dots)
    #[arg(
        long = "param",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    pub params: Vec<KeyValue>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store sketches (plus augmented copies) under a label
    Teach(TeachArgs),
    /// Predict the label of a sketch
    Classify(ClassifyArgs),
    /// Show how many examples each label has
    Stats,
    /// Forget every taught example
    Reset(ResetArgs),
    /// Write a centroid model built from the current store
    ExportCentroids(ExportArgs),
    /// Print the JSON schema of the engine configuration
    Schema,
}

#[derive(Debug, Args)]
pub struct TeachArgs {
    /// Sketch files (.json strokes or ASCII grids)
    #[arg(required = true, value_name = "SKETCH", value_hint = ValueHint::FilePath)]
    pub sketches: Vec<PathBuf>,

    /// Label to teach (prompted when omitted)
    #[arg(short, long, value_name = "LABEL")]
    pub label: Option<String>,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Sketch file (.json strokes or ASCII grid)
    #[arg(value_name = "SKETCH", value_hint = ValueHint::FilePath)]
    pub sketch: PathBuf,

    /// Also list this many nearest stored examples
    #[arg(short, long, default_value_t = 0, value_name = "N")]
    pub neighbors: usize,
}

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Destination of the model file
    #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub path: PathBuf,

    /// Softmax temperature stored in the model
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE, value_name = "T")]
    pub temperature: f64,
}

#[derive(Clone, Debug)]
pub struct KeyValue {
    key: String,
    value: Value,
}

impl Cli {
    /// Layers defaults, the config file, the path flags and `--param`
    /// overrides, in that order.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
        if let Some(model) = &self.model {
            config.scorer = ScorerChoice::Centroid(CentroidParameters {
                path: model.clone(),
            });
        }

        let config = config
            .with_overrides(self.params.iter().map(|kv| (kv.key.as_str(), &kv.value)))
            .context("invalid --param override")?;

        Ok(match config.store_path {
            Some(_) => config,
            None => EngineConfig {
                store_path: Some(PathBuf::from(DEFAULT_STORE_FILE)),
                ..config
            },
        })
    }
}

fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    Ok(KeyValue {
        key: key.to_string(),
        value: parse_literal(value.trim()),
    })
}

fn parse_literal(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }

    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
