// src/cli.rs
//! Command-line surface (spec §6): `diff`, `migrate`, and a stubbed
//! `apply`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use smf::dialect::{MigrationOptions, TransactionMode};

#[derive(Parser)]
#[command(name = "smf")]
#[command(author, version, about = "Schema migration forge: diff two schemas, emit forward/rollback SQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute and print the structural diff between two schemas.
    Diff {
        /// Old schema file (.toml or .sql)
        old: PathBuf,
        /// New schema file (.toml or .sql)
        new: PathBuf,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    /// Plan a migration and print forward/rollback SQL.
    Migrate {
        /// Old schema file (.toml or .sql)
        old: PathBuf,
        /// New schema file (.toml or .sql)
        new: PathBuf,
        /// Allow destructive drops instead of safe-mode renames
        #[arg(long = "unsafe")]
        allow_unsafe: bool,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
        #[arg(long, default_value = "mysql")]
        dialect: String,
        /// Write the forward migration to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write the rollback migration to this file
        #[arg(long)]
        rollback_out: Option<PathBuf>,
    },
    /// Apply a migration to a live database.
    Apply {
        #[arg(long)]
        migration: PathBuf,
    },
    /// Generate a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Command {
    pub fn migration_options(&self) -> MigrationOptions {
        match self {
            Command::Migrate { allow_unsafe, dialect, .. } => MigrationOptions {
                dialect: dialect.clone(),
                include_drops: true,
                include_unsafe: *allow_unsafe,
                transaction_mode: TransactionMode::default(),
                preserve_foreign_keys: true,
                defer_foreign_key_check: true,
            },
            _ => MigrationOptions::default(),
        }
    }
}
