use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use cde_module::{parse_module, write_module, DataElementType, ModuleDescription};
use cde_module_source::{HttpModuleSource, ModuleSource};

#[derive(Parser)]
#[command(
    name = "cde",
    about = "Reporting module tooling for the CDE registry",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a module XML document and print its description as JSON.
    Parse {
        /// Path to the module XML file (or "-" for stdin).
        input: PathBuf,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output.
        #[arg(short, long, action = ArgAction::SetTrue)]
        pretty: bool,
    },

    /// Check that a module XML document would import, and summarize it.
    Validate {
        /// Path to the module XML file (or "-" for stdin).
        input: PathBuf,
    },

    /// Write a module XML document from a JSON module description.
    Convert {
        /// Path to the JSON description (or "-" for stdin).
        input: PathBuf,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a module document from the external module service.
    Fetch {
        /// Module identifier at the source.
        module_id: String,
        /// Base URL of the module service.
        #[arg(long, env = "CDE__MODULE_SOURCE__BASE_URL")]
        base_url: String,
        /// Bearer token for the module service.
        #[arg(long, env = "CDE__MODULE_SOURCE__API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Requester forwarded as `X-Requester`.
        #[arg(long, default_value = "anonymous")]
        requester: String,
        /// Request timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print CLI version.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Parse {
            input,
            output,
            pretty,
        } => {
            let module = load_module(&input)?;
            let value = serde_json::to_value(&module)?;
            let content = if pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            write_output(&content, output.as_deref())?;
        }
        Commands::Validate { input } => {
            let module = load_module(&input)?;
            print_summary(&module);
        }
        Commands::Convert { input, output } => {
            let contents = read_input(&input)?;
            let module: ModuleDescription = serde_json::from_str(&contents)
                .with_context(|| format!("Not a module description: {}", input.display()))?;
            let xml = write_module(&module).context("Failed to write module XML")?;
            write_output(&xml, output.as_deref())?;
        }
        Commands::Fetch {
            module_id,
            base_url,
            api_key,
            requester,
            timeout,
            output,
        } => {
            run_fetch(
                &module_id,
                &base_url,
                api_key,
                &requester,
                timeout,
                output.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}

async fn run_fetch(
    module_id: &str,
    base_url: &str,
    api_key: Option<String>,
    requester: &str,
    timeout: u64,
    output: Option<&Path>,
) -> Result<()> {
    let source = HttpModuleSource::new(base_url, api_key, timeout)
        .context("Failed to create module source client")?;
    let Some(xml) = source
        .fetch_module(module_id, requester)
        .await
        .with_context(|| format!("Failed to fetch module '{module_id}'"))?
    else {
        bail!("Module '{module_id}' not found at {}", source.base_url());
    };

    // Only documents that parse are written.
    parse_module(&xml).with_context(|| format!("Module '{module_id}' does not parse"))?;
    write_output(&xml, output)
}

fn load_module(input: &Path) -> Result<ModuleDescription> {
    let xml = read_input(input)?;
    parse_module(&xml).with_context(|| format!("Invalid module: {}", input.display()))
}

fn print_summary(module: &ModuleDescription) {
    println!("Module: {}", module.name);
    if let Some(id) = &module.id {
        println!("Id: {id}");
    }
    let importable = module.materialized_elements().count();
    println!(
        "Data elements: {} ({} importable, {} global)",
        module.data_elements.len(),
        importable,
        module.global_count()
    );
    for element in &module.data_elements {
        let note = match element.element_type() {
            DataElementType::Global => " (skipped on import)",
            _ => "",
        };
        println!(
            "  {:<24} {:<12} {}{}",
            element.id,
            element.element_type().as_str(),
            element.label,
            note
        );
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.to_string_lossy() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(output_path) = output {
        fs::write(output_path, content)
            .with_context(|| format!("Failed to write to {:?}", output_path))?;
        eprintln!("Wrote output to {:?}", output_path);
    } else {
        println!("{content}");
    }
    Ok(())
}
