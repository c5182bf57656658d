use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use richpad::config::{Config, config_file_path};
use richpad::render::{export, html};
use richpad::richtext::markdown_converter::markdown_to_document;
use richpad::richtext::{Command, StructuredEditor};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "richpad")]
#[command(version, about = "Render and export rich-text documents", long_about = None)]
struct Args {
    /// Config file (default: config.toml in the user config directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct DocumentArgs {
    /// Markdown source to load
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Document title (overrides the config)
    #[arg(short, long)]
    title: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Toolbar command applied to the whole document, e.g. `bold` or `fontSize=24`
    #[arg(short = 'x', long = "exec", value_name = "CMD[=VALUE]")]
    exec: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the preview page
    Preview(DocumentArgs),
    /// Render the printable page
    Print(DocumentArgs),
    /// Write the standalone export page
    Export(DocumentArgs),
    /// List the h1/h2 headings with their anchors
    Outline(DocumentArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Preview(doc_args) => {
            let editor = open(&doc_args, &config)?;
            emit(doc_args.output.as_deref(), &editor.preview_html())
        }
        Commands::Print(doc_args) => {
            let editor = open(&doc_args, &config)?;
            emit(doc_args.output.as_deref(), &editor.print_html())
        }
        Commands::Export(doc_args) => {
            let editor = open(&doc_args, &config)?;
            let (page, file_name) = editor.export(export::current_year());
            let path = doc_args.output.unwrap_or_else(|| PathBuf::from(file_name));
            emit(Some(path.as_path()), &page)?;
            eprintln!("Exported {}", path.display());
            Ok(())
        }
        Commands::Outline(doc_args) => {
            let editor = open(&doc_args, &config)?;
            let mut listing = String::new();
            for entry in html::heading_outline(editor.document()) {
                let indent = if entry.level == 1 { "" } else { "  " };
                listing.push_str(&format!("{indent}{} (#{})\n", entry.text, entry.slug));
            }
            emit(doc_args.output.as_deref(), &listing)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path.map(Path::to_path_buf).or_else(config_file_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Load the source into an editing session and run the requested commands
fn open(doc_args: &DocumentArgs, config: &Config) -> Result<StructuredEditor> {
    let source = fs::read_to_string(&doc_args.input)
        .with_context(|| format!("Failed to read {}", doc_args.input.display()))?;
    let mut editor = StructuredEditor::mount(markdown_to_document(&source), config);
    if let Some(title) = &doc_args.title {
        editor.set_title(title.clone());
    }

    for spec in &doc_args.exec {
        let command = Command::parse_spec(spec)
            .with_context(|| format!("Invalid --exec command {spec:?}"))?;
        editor.select_all();
        if !editor.run(command) {
            tracing::warn!(command = %spec, "command had no effect");
        }
    }
    Ok(editor)
}

fn emit(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => io::stdout()
            .write_all(contents.as_bytes())
            .context("Failed to write to stdout"),
    }
}
