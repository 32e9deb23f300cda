//! Command-line interface for the bookshelf collector.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use crate::catalog::{parse_file, Backend};
use crate::config::{CollectorConfig, DEFAULT_RECORD_TAG};
use crate::error::Result;
use crate::event::MarkupEvent;
use crate::output::{render, OutputFormat};
use crate::source::{EventRecorder, StreamSource};

/// Exit code for a pass that ended with a parse error.
const EXIT_PARSE_FAILURE: u8 = 2;

/// Bookshelf - Collect catalog records from an XML file.
#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a catalog file and print its records.
    Parse {
        /// Path to the XML catalog
        path: PathBuf,

        /// Element name that delimits one record
        #[arg(long, default_value = DEFAULT_RECORD_TAG)]
        record_tag: String,

        /// Tokenizer backend
        #[arg(short, long, value_enum, default_value_t = Backend::Stream)]
        backend: Backend,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the raw event stream of a file, one event per line.
    Events {
        /// Path to the XML file
        path: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            path,
            record_tag,
            backend,
            format,
        } => parse_command(&path, &record_tag, backend, format),
        Commands::Events { path } => events_command(&path),
    }
}

/// Execute the parse command.
fn parse_command(
    path: &Path,
    record_tag: &str,
    backend: Backend,
    format: OutputFormat,
) -> Result<ExitCode> {
    let config = CollectorConfig::new().with_record_tag(record_tag)?;
    let catalog = parse_file(path, &config, backend)?;

    print!("{}", render(&catalog, format)?);

    if format == OutputFormat::Text {
        for warning in &catalog.warnings {
            eprintln!("{} {}", style("warning:").yellow().bold(), warning);
        }
        eprintln!(
            "Last parse took {} seconds ({} records).",
            style(format!("{:.6}", catalog.duration.as_secs_f64())).cyan(),
            catalog.records.len()
        );
    }

    match &catalog.error {
        Some(failure) => {
            eprintln!("{} {}", style("parse error:").red().bold(), failure);
            Ok(ExitCode::from(EXIT_PARSE_FAILURE))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Execute the events command.
fn events_command(path: &Path) -> Result<ExitCode> {
    let events = EventRecorder::record(StreamSource::open(path)?);
    let mut failed = false;

    for event in &events {
        match event {
            MarkupEvent::StartDocument => println!("start-document"),
            MarkupEvent::EndDocument => println!("end-document"),
            MarkupEvent::StartElement { name, attributes } => {
                let attrs: Vec<String> = attributes
                    .iter()
                    .map(|(key, value)| format!(" {key}={value:?}"))
                    .collect();
                println!("start <{}{}>", name, attrs.concat());
            }
            MarkupEvent::EndElement { name } => println!("end </{name}>"),
            MarkupEvent::Characters(text) => println!("chars {text:?}"),
            MarkupEvent::Error(failure) => {
                failed = true;
                println!("error {failure}");
            }
        }
    }

    if failed {
        Ok(ExitCode::from(EXIT_PARSE_FAILURE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["bookshelf", "parse", "books.xml"]);

        let Commands::Parse {
            path,
            record_tag,
            backend,
            format,
        } = cli.command
        else {
            panic!("expected parse command");
        };
        assert_eq!(path, PathBuf::from("books.xml"));
        assert_eq!(record_tag, "book");
        assert_eq!(backend, Backend::Stream);
        assert_eq!(format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::parse_from([
            "bookshelf",
            "parse",
            "items.xml",
            "--record-tag",
            "item",
            "--backend",
            "tree",
            "--format",
            "json",
        ]);

        let Commands::Parse {
            record_tag,
            backend,
            format,
            ..
        } = cli.command
        else {
            panic!("expected parse command");
        };
        assert_eq!(record_tag, "item");
        assert_eq!(backend, Backend::Tree);
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_events() {
        let cli = Cli::parse_from(["bookshelf", "events", "books.xml"]);
        assert!(matches!(cli.command, Commands::Events { .. }));
    }
}
