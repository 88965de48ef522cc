//! Imports ANSYS CDB mesh files and reports what was read.

use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cdb_io::{CdbReader, ElementTypeTable, ImportOptions, ImportReport};
use cdb_model::{Mesh, MeshSummary};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error, info};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Output extra/debug info while importing.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CDB file and print a mesh summary.
    Summary {
        /// File path (set to "-" to read from standard input).
        file: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
        /// JSON file with import options.
        #[arg(long)]
        options: Option<PathBuf>,
    },
    /// List the ANSYS element types the importer understands.
    Families,
}

fn summary(file: &Path, json: bool, options: Option<&Path>) -> ExitCode {
    let options = match options.map(|path| ImportOptions::from_json_file(path)).transpose() {
        Ok(options) => options.unwrap_or_default(),
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let mut mesh = Mesh::new();
    let mut reader = CdbReader::new(&mut mesh).with_options(options);
    let result: cdb_io::Result<ImportReport> = if file.as_os_str() == "-" {
        reader.read_from(BufReader::new(io::stdin()))
    } else {
        info!("Importing {}...", file.display());
        reader.read(file)
    };
    if let Err(err) = result {
        error!("import failed: {err}");
        return ExitCode::from(1);
    }

    let summary = MeshSummary::from_mesh(&mesh);
    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                error!("cannot serialise summary: {err}");
                return ExitCode::from(1);
            }
        }
    } else {
        println!("{}", summary.format());
    }
    ExitCode::SUCCESS
}

fn families() -> ExitCode {
    let table = ElementTypeTable::ansys();
    for code in table.codes() {
        let Some(family) = table.family(code) else {
            continue;
        };
        let sub_types: Vec<String> = family
            .sub_types()
            .map(|def| format!("{} ({} nodes)", def.name(), def.num_nodes()))
            .collect();
        println!("{:>4} {:<9} {}", code, family.name, sub_types.join(", "));
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args = Cli::parse();
    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder().filter_level(log_level).init();

    match &args.command {
        Command::Summary {
            file,
            json,
            options,
        } => summary(file, *json, options.as_deref()),
        Command::Families => families(),
    }
}
