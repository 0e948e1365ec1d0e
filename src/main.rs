use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use pathquill::config::Config;
use pathquill::document::serializer::Layout;
use pathquill::file::loader::{load_document_file, load_document_from_stdin};
use pathquill::{evaluate_json_path_with, OutputOptions, Report};

/// PathQuill - evaluate JSONPath queries against JSON documents
#[derive(Parser)]
#[command(name = "pathquill")]
#[command(version)]
#[command(about = "Evaluate a JSONPath query against a JSON document", long_about = None)]
struct Cli {
    /// JSONPath query, e.g. '$.store.book[*].author'
    query: String,

    /// JSON file to query (omit or use '-' to read from stdin; .gz files are decompressed)
    file: Option<PathBuf>,

    /// Indent the output
    #[arg(short, long)]
    pretty: bool,

    /// Spaces per indentation level when pretty printing
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Print the normalized path of each match instead of its value
    #[arg(long)]
    paths: bool,

    /// Read configuration from this file instead of ~/.config/pathquill/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Merges command-line flags over the loaded configuration.
fn output_options(cli: &Cli, config: &Config) -> OutputOptions {
    let indent = cli.indent.unwrap_or(config.indent_size);
    // An explicit --indent implies pretty output
    let layout = if cli.pretty || cli.indent.is_some() || config.pretty {
        Layout::Pretty { indent }
    } else {
        Layout::Compact
    };
    let report = if cli.paths || config.show_paths {
        Report::Paths
    } else {
        Report::Values
    };
    OutputOptions { layout, report }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let document = match &cli.file {
        Some(path) if path.as_os_str() != "-" => load_document_file(path)?,
        _ => load_document_from_stdin()?,
    };

    let options = output_options(&cli, &config);
    let output = evaluate_json_path_with(&cli.query, &document, &options)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    if config.trailing_newline {
        stdout.write_all(b"\n").context("Failed to write output")?;
    }
    stdout.flush().context("Failed to write output")?;

    Ok(())
}
