//! DBC command-line tool
//!
//! `dbc view <file> <map>` prints table statistics, `dbc export` dumps every
//! record as XML or JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dbc_rs::export::{Exporter, JsonExporter, XmlExporter};
use dbc_rs::{mapping, ClientVersion, DbcFile, ReaderOptions};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dbc")]
#[command(about = "Inspect and export DBC client database files", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// View the contents of a DBC file
    View {
        #[command(flatten)]
        input: InputArgs,

        /// Also print the first N records
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: usize,
    },

    /// Dump the contents of a DBC file
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Where to write the dump
        out: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "xml")]
        format: Format,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Path to the DBC file
    file: PathBuf,

    /// Path to the YAML map
    map: PathBuf,

    /// Client version the file belongs to (sets the locale count unless
    /// --config is given; always used to label exports)
    #[arg(long, default_value = "1.12.1")]
    client_version: String,

    /// Reader options (TOML); its locale_count replaces the one implied by
    /// --client-version
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Xml,
    Json,
}

impl InputArgs {
    fn client_version(&self) -> Result<ClientVersion> {
        Ok(self.client_version.parse()?)
    }

    fn open(&self) -> Result<DbcFile> {
        let client_version = self.client_version()?;
        let options = match &self.config {
            Some(path) => ReaderOptions::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ReaderOptions::for_client(&client_version),
        };

        if !options.agrees_with(&client_version) {
            warn!(
                client_version = %client_version,
                locale_count = options.locale_count,
                expected = client_version.locale_count(),
                "Config locale count differs from the client version used to label exports"
            );
        }

        let schema = mapping::load_schema(&self.map, &options)
            .with_context(|| format!("Failed to load map {}", self.map.display()))?;

        DbcFile::open_with_options(&self.file, schema, &options)
            .with_context(|| format!("Failed to open {}", self.file.display()))
    }
}

fn view(input: &InputArgs, limit: usize) -> Result<()> {
    let dbc = input.open()?;
    let store = dbc.store();

    println!("DBC Viewer");
    println!("===========");
    println!();
    println!("# of rows:            {}", store.record_count());
    println!("# of Bytes per row:   {}", store.record_size());
    println!("# of columns per row: {}", store.field_count());

    if store.has_strings() {
        println!("# of strings:         {}", store.string_pool().string_count());
    }

    if limit > 0 {
        println!();
        let mut cursor = dbc.cursor();
        while cursor.valid() && (cursor.key() as usize) < limit {
            let record = cursor.current()?;
            let fields: Vec<String> = record
                .iter()
                .map(|(column, value)| format!("{}={}", column, value))
                .collect();
            println!("#{}: {}", record.index(), fields.join(", "));
            cursor.next();
        }
    }

    print_errors(&dbc);
    Ok(())
}

fn export(input: &InputArgs, out: &Path, format: Format) -> Result<()> {
    let dbc = input.open()?;
    let client_version = input.client_version()?;

    let exporter: Box<dyn Exporter> = match format {
        Format::Xml => Box::new(XmlExporter::new(client_version)),
        Format::Json => Box::new(JsonExporter {
            client_version,
            pretty: true,
        }),
    };

    println!(
        "Dumping {} file contents in {} format to {}.",
        dbc.name(),
        exporter.format().to_uppercase(),
        out.display()
    );

    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    let summary = exporter.export(&dbc, &mut writer)?;
    writer.flush()?;

    info!(records = summary.records, "Export finished");

    for error in &summary.errors {
        println!("{}", error);
    }
    Ok(())
}

fn print_errors(dbc: &DbcFile) {
    for error in dbc.errors() {
        println!("{}", error);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::View { input, limit } => view(input, *limit),
        Command::Export { input, out, format } => export(input, out, *format),
    }
}
