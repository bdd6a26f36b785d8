//! Metalinks CLI
//!
//! - Reconciling metabolite identifiers across three mapping tables and
//!   writing the per-table row key → HMDB lookups used for edge construction
//! - Normalizing single identifiers (debugging source formats)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use metalinks_idmap::{EmittedMapping, Namespace, ReconcileConfig, Reconciled};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metalinks")]
#[command(author, version, about = "Metalinks: metabolite identifier reconciliation")]
struct Cli {
    /// Log pass details (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the three tables named in a config file.
    ///
    /// Runs one anchor pass per namespace (CHEBI, KEGG, HMDB, PUBCHEM) and
    /// writes the row key → canonical identifier lookup of every table.
    Reconcile {
        /// Config JSON (tables, column names, trust order)
        #[arg(short, long)]
        config: PathBuf,
        /// Output mappings JSON
        #[arg(short, long)]
        out: PathBuf,
        /// Also write the full pass report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the canonical form of identifiers (`-` for missing).
    Normalize {
        /// chebi | kegg | hmdb | pubchem
        namespace: String,
        values: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Reconcile {
            config,
            out,
            report,
        } => cmd_reconcile(&config, &out, report.as_deref()),
        Commands::Normalize { namespace, values } => cmd_normalize(&namespace, &values),
    }
}

#[derive(Serialize)]
struct MappingsFile<'a> {
    namespace: Namespace,
    mappings: &'a [EmittedMapping],
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn cmd_reconcile(config_path: &Path, out: &Path, report: Option<&Path>) -> Result<()> {
    let config = ReconcileConfig::from_path(config_path)?;
    let reconciled = metalinks_idmap::reconcile(&config)
        .with_context(|| format!("reconciling tables from {}", config_path.display()))?;

    let mappings = reconciled.mappings(config.canonical);
    write_json(
        out,
        &MappingsFile {
            namespace: config.canonical,
            mappings: &mappings,
        },
    )?;
    if let Some(path) = report {
        write_json(path, &reconciled)?;
    }

    print_summary(&reconciled, &mappings);
    println!("  {} {}", "→".cyan(), out.display());
    Ok(())
}

fn print_summary(reconciled: &Reconciled, mappings: &[EmittedMapping]) {
    println!("{}", "Loaded".green().bold());
    for load in &reconciled.loads {
        println!(
            "  {:<16} {} rows kept of {} ({} without key)",
            load.table,
            load.rows_kept,
            load.rows_read,
            load.keyless
        );
    }

    println!("{}", "Passes".green().bold());
    for pass in &reconciled.propagation.passes {
        let conflicts = pass.merge.conflicts();
        let conflicts = if conflicts > 0 {
            conflicts.to_string().yellow()
        } else {
            conflicts.to_string().normal()
        };
        println!(
            "  anchor {:<8} {:>6} fills  {} conflicts",
            pass.merge.anchor.to_string(),
            pass.merge.total_fills(),
            conflicts
        );
    }

    println!("{}", "Emitted".green().bold());
    for mapping in mappings {
        println!(
            "  {:<16} {} entries ({} without {})",
            mapping.table,
            mapping.len(),
            mapping.dropped,
            mapping.namespace
        );
    }
}

fn cmd_normalize(namespace: &str, values: &[String]) -> Result<()> {
    let ns: Namespace = namespace.parse()?;
    for value in values {
        let canonical = metalinks_idmap::normalize::normalize(ns, value);
        println!("{}\t{}", value, canonical.as_deref().unwrap_or("-"));
    }
    Ok(())
}
