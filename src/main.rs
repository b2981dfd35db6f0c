use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scribble::EngineConfig;
use scribble::classifiers::CentroidModel;
use scribble::core::{ModelStats, RasterImage};
use scribble::engine::SketchEngine;
use scribble::sketch::load_sketch;
use scribble::ui::cli::args::{ClassifyArgs, Cli, Command, ExportArgs, ResetArgs, TeachArgs};
use scribble::ui::cli::drivers::{InquireDriver, PromptDriver, prompt_label};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_GREY: &str = "\x1b[90m";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Schema = cli.command {
        let schema = serde_json::to_string_pretty(&EngineConfig::schema())
            .context("failed to render config schema")?;
        println!("{schema}");
        return Ok(());
    }

    let config = cli.engine_config()?;
    let mut engine = SketchEngine::new(&config).context("failed to start sketch engine")?;
    let driver = InquireDriver;

    print_header(&cli.command, &config);

    match cli.command {
        Command::Teach(args) => teach(&mut engine, args, &driver),
        Command::Classify(args) => classify(&engine, args),
        Command::Stats => {
            print_stats(engine.stats());
            Ok(())
        }
        Command::Reset(args) => reset(&mut engine, args, &driver),
        Command::ExportCentroids(args) => export_centroids(&engine, args),
        Command::Schema => Ok(()),
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_all(paths: &[PathBuf]) -> Result<Vec<RasterImage>> {
    paths
        .iter()
        .map(|p| load_sketch(p).with_context(|| format!("failed to load sketch {}", p.display())))
        .collect()
}

fn teach<D: PromptDriver>(engine: &mut SketchEngine, args: TeachArgs, driver: &D) -> Result<()> {
    let images = load_all(&args.sketches)?;
    let label = match args.label {
        Some(label) => label,
        None => prompt_label(driver).context("failed while prompting for label")?,
    };

    let added = engine.teach_many(&images, &label);
    if added == 0 {
        bail!("nothing was taught for label '{label}'");
    }

    println!(
        "{FG_GREEN}{BOLD}taught{RESET} {label}  {DIM}+{added} examples from {} sketch(es){RESET}",
        images.len()
    );
    print_stats(engine.stats());
    Ok(())
}

fn classify(engine: &SketchEngine, args: ClassifyArgs) -> Result<()> {
    let image = load_sketch(&args.sketch)
        .with_context(|| format!("failed to load sketch {}", args.sketch.display()))?;

    let result = engine.classify_detailed(&image);
    match result.prediction.as_prediction() {
        Some(p) => println!(
            "{FG_CYAN}{BOLD}{}{RESET}  {FG_MAGENTA}{:>6.1}%{RESET}  {DIM}via {}{RESET}",
            p.label,
            p.confidence * 100.0,
            result.source
        ),
        None => println!("{FG_YELLOW}no prediction{RESET}  {DIM}teach some sketches first{RESET}"),
    }

    if args.neighbors > 0 {
        for (rank, n) in engine.neighbors(&image, args.neighbors).iter().enumerate() {
            println!(
                "  {FG_GREY}{:>2}.{RESET} {:<16} {DIM}d={:.4}{RESET}",
                rank + 1,
                n.label,
                n.distance
            );
        }
    }
    Ok(())
}

fn reset<D: PromptDriver>(engine: &mut SketchEngine, args: ResetArgs, driver: &D) -> Result<()> {
    if engine.stats().is_empty() {
        println!("{DIM}nothing to reset{RESET}");
        return Ok(());
    }

    let confirmed = args.yes
        || driver
            .ask_bool(
                "Forget every taught example?",
                &engine.stats().to_string(),
                false,
            )
            .context("failed while prompting for confirmation")?;
    if !confirmed {
        println!("{DIM}reset cancelled{RESET}");
        return Ok(());
    }

    engine.reset();
    println!("{FG_GREEN}{BOLD}reset{RESET}  {DIM}model is untrained{RESET}");
    Ok(())
}

fn export_centroids(engine: &SketchEngine, args: ExportArgs) -> Result<()> {
    if engine.stats().is_empty() {
        bail!("the example store is empty, teach some sketches first");
    }

    let model = CentroidModel::from_store(engine.store(), engine.extractor(), args.temperature);
    model
        .validate()
        .context("refusing to write an invalid model")?;
    model
        .write_to(&args.path)
        .with_context(|| format!("failed to write model to {}", args.path.display()))?;

    println!(
        "{FG_GREEN}{BOLD}exported{RESET} {} centroids  {DIM}→ {}{RESET}",
        model.prototypes.len(),
        args.path.display()
    );
    Ok(())
}

fn print_header(command: &Command, config: &EngineConfig) {
    let title = match command {
        Command::Teach(_) => "Teach",
        Command::Classify(_) => "Classify",
        Command::Stats => "Stats",
        Command::Reset(_) => "Reset",
        Command::ExportCentroids(_) => "Export Centroids",
        Command::Schema => "Schema",
    };
    let store = config
        .store_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "memory".to_string());

    println!("{BOLD}{FG_CYAN}▶ {title}{RESET}");
    println!(
        "{DIM}grid={}  k={}  scorer={}  store={store}{RESET}  {}",
        config.grid_side,
        config.k,
        config.scorer_kind(),
        timestamp_now()
    );
    println!(
        "{FG_GREY}────────────────────────────────────────────────────────────────────────{RESET}"
    );
}

fn print_stats(stats: &ModelStats) {
    if stats.is_empty() {
        println!("{DIM}no examples yet{RESET}");
        return;
    }
    for (label, n) in stats.iter() {
        println!("  {FG_CYAN}{label:<16}{RESET} {n:>6}");
    }
    println!(
        "  {DIM}{} labels, {} examples{RESET}",
        stats.label_count(),
        stats.total_examples()
    );
}

fn timestamp_now() -> String {
    use chrono::{Local, SecondsFormat};
    let now = Local::now();
    format!(
        "{DIM}{}{}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        RESET
    )
}
