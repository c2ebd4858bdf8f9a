mod cli;

use veneer::document::Value;
use veneer::host::{FileHost, HostAdapter};
use veneer::schema::Schema;
use veneer::view::{Entry, View};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("VENEER_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let command_result = match cli.command {
        cli::Command::Get(get_cli) => get(get_cli),
        cli::Command::Set(set_cli) => set(set_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn get(cli: cli::GetCommand) -> anyhow::Result<()> {
    let (_schema, _host, view) = open(&cli.source)?;

    let segments: Vec<&str> = cli.path.as_deref().map(split_path).unwrap_or_default();
    match view.entry_at(&segments)? {
        Entry::Value(value) => output(&cli.output, value)?,
        Entry::Nested(nested) => output(&cli.output, &Value::Document(nested.to_document()))?,
    }

    Ok(())
}

pub fn set(cli: cli::SetCommand) -> anyhow::Result<()> {
    let (_schema, mut host, mut view) = open(&cli.source)?;

    let segments = split_path(&cli.path);
    view.set_at(&segments, parse_value(&cli.value))?;

    let merged = if cli.dry_run {
        veneer::sync::sync(&view, host.read(&cli.source.attribute)?.as_ref())
    } else {
        veneer::host::store(&view, &mut host, &cli.source.attribute)?
    };

    output(&cli.output, &Value::Document(merged))?;
    Ok(())
}

fn open(source: &cli::SourceArgs) -> anyhow::Result<(Schema, FileHost, View)> {
    let schema = load_schema(&source.schema)?;
    let host = FileHost::open(&source.record)?;
    let view = veneer::host::load(&schema, &host, &source.attribute)?;
    Ok((schema, host, view))
}

fn load_schema(path: &std::path::Path) -> anyhow::Result<Schema> {
    let contents = std::fs::read_to_string(path)?;

    let outline: Value = if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
        serde_yaml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };

    Ok(Schema::from_outline(&outline)?)
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// json when it parses, plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (veneer-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    let (schema, host, view) = open(&cli.source)?;

    match cli.command {
        cli::DevSubCommand::Schema => println!("{schema:#?}"),
        cli::DevSubCommand::Record => println!("{:#?}", host.record()),
        cli::DevSubCommand::View => println!("{view:#?}"),
    }

    Ok(())
}
