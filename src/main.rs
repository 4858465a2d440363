use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pctprofit::prelude::*;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pctprofit")]
#[command(about = "Strategy profit metrics and equity curves for model results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

//flags shared by evaluate and curve, each overrides the config file
#[derive(clap::Args)]
struct EvalArgs {
    //json configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    //experiment directory containing results/<split>_<index>.csv
    #[arg(long)]
    log_dir: Option<PathBuf>,

    //return kind of the true column (linear, log)
    #[arg(long)]
    return_kind: Option<String>,

    //minimum |signal| for a row to count
    #[arg(long)]
    threshold: Option<f64>,

    //reference csv with full precision targets
    #[arg(long)]
    reference: Option<PathBuf>,

    //target column in the reference csv
    #[arg(long)]
    reference_column: Option<String>,

    //loss used in training (decides whether the reference override applies)
    #[arg(long)]
    loss: Option<String>,

    //training wrote inverse-transformed outputs
    #[arg(long)]
    inverse_output: bool,
}

#[derive(Subcommand)]
enum Commands {
    //compute the metrics report for every split
    Evaluate {
        #[command(flatten)]
        args: EvalArgs,

        //output path for the report json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },
    //build the equity curve of one strategy mode on one split
    Curve {
        #[command(flatten)]
        args: EvalArgs,

        //split to use (train, val, test)
        #[arg(long, default_value = "test")]
        split: String,

        //strategy mode (eg dir, tanhv2-ns)
        #[arg(long)]
        mode: Option<String>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,
    },
    //show which strategy and short filter a mode resolves to
    Resolve {
        //return kind (linear, log)
        #[arg(long)]
        return_kind: String,

        //strategy mode (eg dir, tanhv2-ns)
        #[arg(long)]
        mode: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { args, output_json } => {
            let mut config = build_config(&args)?;
            if output_json.is_some() {
                config.output_report_json = output_json;
            }
            run_evaluate(&config)?;
        }
        Commands::Curve {
            args,
            split,
            mode,
            output_equity_csv,
        } => {
            let mut config = build_config(&args)?;
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if output_equity_csv.is_some() {
                config.output_equity_csv = output_equity_csv;
            }
            let split =
                Split::parse(&split).ok_or_else(|| anyhow::anyhow!("Unknown split: {}", split))?;
            run_curve(&config, split)?;
        }
        Commands::Resolve { return_kind, mode } => {
            let resolved = resolve_str(&return_kind, &mode)?;
            println!("Strategy: {}", resolved.strategy.name());
            println!("Return kind: {}", resolved.strategy.return_kind());
            println!("Short filter: {}", resolved.short_filter);
        }
    }

    Ok(())
}

//config file (or defaults) with command line overrides applied
fn build_config(args: &EvalArgs) -> Result<EvaluationConfiguration> {
    let mut config = match &args.config {
        Some(path) => EvaluationConfiguration::from_json_file(path)
            .context(format!("Failed to load config from {:?}", path))?,
        None => EvaluationConfiguration::default(),
    };

    if let Some(log_dir) = &args.log_dir {
        config.log_dir = log_dir.clone();
    }
    if let Some(kind) = &args.return_kind {
        config.return_kind =
            ReturnKind::parse(kind).ok_or_else(|| ConfigError::UnknownReturnKind(kind.clone()))?;
    }
    if let Some(threshold) = args.threshold {
        if threshold < 0.0 {
            anyhow::bail!("Threshold must be non-negative, got {}", threshold);
        }
        config.threshold = threshold;
    }
    if let Some(loss) = &args.loss {
        config.training.loss = loss.clone();
    }
    if args.inverse_output {
        config.training.inverse_output = true;
    }
    match (&args.reference, &args.reference_column) {
        (Some(path), Some(column)) => {
            config.reference = Some(ReferenceConfig {
                path: path.clone(),
                column: column.clone(),
            });
        }
        (Some(_), None) => anyhow::bail!("--reference requires --reference-column"),
        _ => {}
    }

    Ok(config)
}

//loads every split and restores full precision trues when needed
fn load_splits(config: &EvaluationConfiguration) -> Result<Vec<(Split, ResultSeries)>> {
    let mut splits = load_all_splits(&config.log_dir)
        .context(format!("Failed to load results from {:?}", config.log_dir))?;

    if splits.is_empty() {
        anyhow::bail!("No result shards found under {:?}", config.log_dir);
    }

    if let Some(reference) = config.precision_override() {
        info!(path = %reference.path.display(), "overriding trues with reference target");
        let table = ReferenceTable::load(&reference.path, &reference.column)?;
        for (_, series) in splits.iter_mut() {
            table.override_trues(series)?;
        }
    } else if config.reference.is_some() {
        warn!(
            loss = %config.training.loss,
            "reference table configured but not applied for this training loss"
        );
    }

    Ok(splits)
}

fn run_evaluate(config: &EvaluationConfiguration) -> Result<()> {
    println!("Strategy Profit Evaluation");
    println!("==========================\n");
    println!("Log dir: {:?}", config.log_dir);
    println!("Return kind: {}", config.return_kind);
    println!("Threshold: {}\n", config.threshold);

    let splits = load_splits(config)?;

    let reports = splits
        .par_iter()
        .map(|(split, series)| {
            MetricsReport::compute(
                config.return_kind,
                &series.predictions,
                &series.trues,
                config.threshold,
            )
            .map(|report| (*split, report))
        })
        .collect::<Result<Vec<_>, ProfitError>>()?;

    for (split, report) in &reports {
        println!("Split: {} ({} rows)", split, report.rows);
        report.pretty_print_table();
        println!();
    }

    if let Some(path) = &config.output_report_json {
        let by_split: indexmap::IndexMap<&str, _> = reports
            .iter()
            .map(|(split, report)| (split.as_str(), report.to_map()))
            .collect();
        std::fs::write(path, serde_json::to_string_pretty(&by_split)?)
            .context(format!("Failed to write report to {:?}", path))?;
        println!("Report saved to {:?}", path);
    }

    Ok(())
}

fn run_curve(config: &EvaluationConfiguration, split: Split) -> Result<()> {
    let resolved = config.strategy()?;
    let splits = load_splits(config)?;

    let series = splits
        .into_iter()
        .find(|(s, _)| *s == split)
        .map(|(_, series)| series)
        .ok_or_else(|| anyhow::anyhow!("No results for split {}", split))?;

    println!(
        "Strategy: {} ({}), split {}, {} rows\n",
        resolved.strategy.name(),
        resolved.short_filter,
        split,
        series.len()
    );

    let curve = strategy_equity_curve(
        resolved.strategy.as_ref(),
        resolved.short_filter,
        &series.timestamps,
        &series.predictions,
        &series.trues,
        config.threshold,
    )?;

    let summary = CurveSummary::from_curve(&curve);
    println!("Periods: {}", summary.periods);
    println!("Final equity: {:.5}", summary.final_equity);
    println!("Max drawdown: {:.2}%", summary.max_drawdown * 100.0);
    println!("Mean step return: {:.6}", summary.mean_return);
    println!("Step return std dev: {:.6}", summary.return_std_dev);

    if let Some(path) = &config.output_equity_csv {
        save_equity_csv(&curve, path)?;
        println!("\nEquity curve saved to {:?}", path);
    }

    Ok(())
}

fn save_equity_csv(equity_curve: &[EquityPoint], path: &PathBuf) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    for point in equity_curve {
        writer.serialize(point)?;
    }
    writer.flush()?;

    Ok(())
}
