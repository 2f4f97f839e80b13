use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use pollen8_analytics::{
    calculate_industry_distribution, calculate_network_growth, decode_invite, decode_snapshot,
    summarize_invite, NetworkCalculator, Snapshot,
};
use pollen8_core::{ConfigManager, LoggingConfig, Settings};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "pollen8")]
#[command(about = "Pollen8 CLI - network analytics over exported snapshots", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty, table)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Directory holding default.toml / <env>.toml / local.toml
    #[arg(long, global = true, env = "POLLEN8_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Configuration environment (defaults to APP_ENV, then development)
    #[arg(long, global = true)]
    env: Option<String>,

    /// Reference time for growth and invite windows (RFC 3339, defaults to now)
    #[arg(long, global = true)]
    as_of: Option<DateTime<Utc>>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Dashboard summary for a snapshot
    Summary {
        /// Snapshot file: { "user": {...}, "connections": [...] }
        snapshot: PathBuf,
    },

    /// Network strength with both sub-scores
    Strength {
        snapshot: PathBuf,
    },

    /// Industry distribution of a snapshot's connections
    Distribution {
        snapshot: PathBuf,
    },

    /// Growth rate between two connection counts
    Growth {
        #[arg(allow_negative_numbers = true)]
        current: f64,
        #[arg(allow_negative_numbers = true)]
        previous: f64,
    },

    /// Click statistics for an exported invite link
    Invite {
        /// Invite file with code, createdAt, clickCount and dailyClicks
        invite: PathBuf,

        /// Days in the click window (defaults to invites.trend_window_days)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Print the effective configuration
    Config {
        /// Print the JSON schema instead of the values
        #[arg(long)]
        schema: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = ConfigManager::new(cli.config_dir.clone(), cli.env.clone())
        .context("Failed to load configuration")?;
    init_tracing(&manager.settings().logging, cli.verbose);
    info!(dir = ?manager.config_dir(), env = %manager.settings().env, "pollen8 starting");

    match execute_command(&cli, manager.settings()) {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let fallback = if verbose {
        "pollen8_cli=debug,pollen8_analytics=debug,pollen8_core=debug".to_string()
    } else {
        logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let value = read_json(path)?;
    decode_snapshot(&value).with_context(|| format!("decoding snapshot {:?}", path))
}

fn execute_command(cli: &Cli, settings: &Settings) -> Result<Value> {
    let now = cli.as_of.unwrap_or_else(Utc::now);
    let calculator = NetworkCalculator::new(settings.analytics.clone());

    match &cli.command {
        Commands::Summary { snapshot } => {
            let snapshot = load_snapshot(snapshot)?;
            let summary = calculator.summarize(&snapshot.user, &snapshot.connections, now)?;
            Ok(serde_json::to_value(summary)?)
        }
        Commands::Strength { snapshot } => {
            let snapshot = load_snapshot(snapshot)?;
            let breakdown = calculator.strength(&snapshot.user, &snapshot.connections)?;
            Ok(serde_json::to_value(breakdown)?)
        }
        Commands::Distribution { snapshot } => {
            let snapshot = load_snapshot(snapshot)?;
            let distribution = calculate_industry_distribution(&snapshot.connections)?;
            Ok(serde_json::to_value(distribution)?)
        }
        Commands::Growth { current, previous } => {
            let growth = calculate_network_growth(*current, *previous)?;
            Ok(serde_json::json!({ "growthRate": growth }))
        }
        Commands::Invite { invite, days } => {
            let value = read_json(invite)?;
            let link = decode_invite(&value).with_context(|| format!("decoding invite {:?}", invite))?;
            let days = days.unwrap_or(settings.invites.trend_window_days);
            let stats = summarize_invite(&link, now.date_naive(), days)?;
            Ok(serde_json::to_value(stats)?)
        }
        Commands::Config { schema } => {
            if *schema {
                Ok(serde_json::from_str(&ConfigManager::schema()?)?)
            } else {
                Ok(serde_json::to_value(settings)?)
            }
        }
    }
}

fn print_output(format: &OutputFormat, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value)?;
        }
        OutputFormat::Table => {
            print_table(value)?;
        }
    }
    Ok(())
}

fn print_pretty(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    Value::String(s) => {
                        println!("{}: {}", key_colored, s.green());
                    }
                    Value::Number(n) => {
                        println!("{}: {}", key_colored, n.to_string().yellow());
                    }
                    Value::Bool(b) => {
                        let val_colored = if *b { "true".green() } else { "false".red() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    Value::Array(items) if !items.is_empty() => {
                        println!("{}:", key_colored);
                        for item in items {
                            println!("  - {}", inline(item));
                        }
                    }
                    _ => {
                        println!("{}: {}", key_colored, val);
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("\n{}{}:", "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item)?;
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

fn inline(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, inline(v)))
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Two-column key/value table; nested values are flattened inline.
fn print_table(value: &Value) -> Result<()> {
    match render_table(value) {
        Some(table) => {
            println!("{}", table);
            Ok(())
        }
        None => print_pretty(value),
    }
}

fn render_table(value: &Value) -> Option<String> {
    let Value::Object(map) = value else {
        return None;
    };
    let mut builder = Builder::default();
    builder.push_record(["FIELD", "VALUE"]);
    for (key, val) in map {
        let rendered = match val {
            Value::Array(items) => items.iter().map(inline).collect::<Vec<_>>().join(", "),
            other => inline(other),
        };
        builder.push_record([key.clone(), rendered]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    Some(table.to_string())
}
