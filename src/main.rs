// src/main.rs

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::info;

use cli::{Cli, Command, OutputFormat};
use smf::dialect;
use smf::diff;
use smf::frontend::load_schema_file;
use smf::ir;
use smf::risk;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Diff { old, new, format } => run_diff(old, new, *format),
        Command::Migrate {
            old,
            new,
            format,
            out,
            rollback_out,
            ..
        } => run_migrate(old, new, &cli.command, *format, out.as_deref(), rollback_out.as_deref()),
        Command::Apply { migration } => run_apply(migration),
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "smf", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_and_validate(path: &Path) -> Result<ir::Database> {
    let db = load_schema_file(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    ir::validate(&db).with_context(|| format!("validating schema {}", path.display()))?;
    Ok(db)
}

fn run_diff(old: &Path, new: &Path, format: OutputFormat) -> Result<()> {
    info!("diffing {} -> {}", old.display(), new.display());
    let old_db = load_and_validate(old)?;
    let new_db = load_and_validate(new)?;
    let schema_diff = diff::diff(&old_db, &new_db);
    let breaking_changes = risk::analyze(&schema_diff);

    match format {
        OutputFormat::Human => {
            if schema_diff.is_empty() {
                println!("No structural differences.");
            } else {
                println!("{:#?}", schema_diff);
            }
            if !breaking_changes.is_empty() {
                println!("\nRisk:");
                for change in &breaking_changes {
                    println!(
                        "  [{}] {} {} — {}",
                        change.severity.as_str(),
                        change.table,
                        change.object,
                        change.description
                    );
                }
            }
        }
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "diff": schema_diff,
                "breaking_changes": breaking_changes,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

fn run_migrate(
    old: &Path,
    new: &Path,
    command: &Command,
    format: OutputFormat,
    out: Option<&Path>,
    rollback_out: Option<&Path>,
) -> Result<()> {
    info!("planning migration {} -> {}", old.display(), new.display());
    let old_db = load_and_validate(old)?;
    let new_db = load_and_validate(new)?;
    let schema_diff = diff::diff(&old_db, &new_db);
    let options = command.migration_options();
    let generator = dialect::lookup(&options.dialect)
        .with_context(|| format!("looking up dialect {}", options.dialect))?;
    let migration = generator.generate_migration(&schema_diff, &options);

    match format {
        OutputFormat::Human => {
            println!("{}", migration.render_forward());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&migration)?);
        }
    }

    if let Some(path) = out {
        std::fs::write(path, migration.render_forward())
            .with_context(|| format!("writing forward migration to {}", path.display()))?;
    }
    if let Some(path) = rollback_out {
        std::fs::write(path, migration.render_rollback())
            .with_context(|| format!("writing rollback migration to {}", path.display()))?;
    }

    Ok(())
}

fn run_apply(migration: &Path) -> Result<()> {
    let _ = migration;
    Err(smf::Error::NotImplemented(
        "apply requires a live database connection and is not yet implemented".to_string(),
    )
    .into())
}
