// build.rs

use std::env;
use std::fs;
use std::path::PathBuf;

use clap::{Arg, Command};
use clap_mangen::Man;

fn old_new_args() -> [Arg; 2] {
    [
        Arg::new("old").required(true).help("Old schema file (.toml or .sql)"),
        Arg::new("new").required(true).help("New schema file (.toml or .sql)"),
    ]
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_parser(["human", "json"])
        .default_value("human")
        .help("Output format")
}

fn build_cli() -> Command {
    let [old, new] = old_new_args();
    Command::new("smf")
        .version(env!("CARGO_PKG_VERSION"))
        .author("smf Contributors")
        .about("Schema migration forge: diff two schemas, emit forward/rollback SQL")
        .subcommand_required(true)
        .subcommand(
            Command::new("diff")
                .about("Compute and print the structural diff between two schemas")
                .arg(old.clone())
                .arg(new.clone())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("migrate")
                .about("Plan a migration and print forward/rollback SQL")
                .arg(old)
                .arg(new)
                .arg(
                    Arg::new("unsafe")
                        .long("unsafe")
                        .action(clap::ArgAction::SetTrue)
                        .help("Allow destructive drops instead of safe-mode renames"),
                )
                .arg(format_arg())
                .arg(Arg::new("dialect").long("dialect").default_value("mysql").help("Target dialect"))
                .arg(Arg::new("out").long("out").help("Write the forward migration to this file"))
                .arg(
                    Arg::new("rollback_out")
                        .long("rollback-out")
                        .help("Write the rollback migration to this file"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a migration to a live database")
                .arg(Arg::new("migration").long("migration").required(true).help("Migration file")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("smf.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
