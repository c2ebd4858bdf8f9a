//! veneer cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a property, or the whole view
    Get(GetCommand),

    /// Write a property, merge and store
    Set(SetCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub source: SourceArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Property path, dot separated (e.g. band.label.location)
    ///
    /// Prints the whole view as a document when omitted.
    pub path: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    #[clap(flatten)]
    pub source: SourceArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Property path, dot separated (e.g. band.label.location)
    pub path: String,

    /// New value
    ///
    /// Parsed as json; anything that does not parse is taken as a plain string.
    pub value: String,

    /// Merge and print without writing the record file
    #[clap(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct SourceArgs {
    /// Schema outline file (.json, or .yaml/.yml)
    #[clap(short = 's', long = "schema")]
    pub schema: PathBuf,

    /// Host record file (a json object of attributes)
    #[clap(short = 'r', long = "record")]
    pub record: PathBuf,

    /// Record attribute holding the document
    #[clap(short = 'a', long = "attribute", default_value = "content")]
    pub attribute: String,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    Schema,
    Record,
    View,
}
