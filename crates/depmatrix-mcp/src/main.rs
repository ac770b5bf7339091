//! depmatrix MCP server entry point.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use depmatrix::{diff, discover_with, parse_traces, MatrixReader, MatrixWriter};
use depmatrix_mcp::config::{resolve_export_dir, resolve_thresholds};
use depmatrix_mcp::protocol::ProtocolHandler;
use depmatrix_mcp::session::SessionStore;
use depmatrix_mcp::tools::ToolRegistry;
use depmatrix_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "depmatrix-mcp",
    about = "MCP server for depmatrix: discover, edit and diff process dependency matrices",
    version
)]
struct Cli {
    /// Directory for exported matrices.
    #[arg(long, global = true)]
    export_dir: Option<String>,

    /// Default temporal threshold in [0, 1].
    #[arg(long, global = true)]
    temporal_threshold: Option<f64>,

    /// Default existential threshold in [0, 1].
    #[arg(long, global = true)]
    existential_threshold: Option<f64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Discover a matrix from a trace file (one trace per line, "-" for stdin).
    Discover {
        /// Trace file.
        traces: String,

        /// Write the matrix here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Diff two matrix documents.
    Diff {
        before: PathBuf,
        after: PathBuf,
    },

    /// Validate a matrix document.
    Validate { path: PathBuf },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   depmatrix-mcp completions bash > ~/.local/share/bash-completion/completions/depmatrix-mcp
    ///   depmatrix-mcp completions zsh > ~/.zfunc/_depmatrix-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let thresholds = resolve_thresholds(cli.temporal_threshold, cli.existential_threshold);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let export_dir = resolve_export_dir(cli.export_dir.as_deref());
            tracing::info!("depmatrix MCP server");
            tracing::info!("Export dir: {}", export_dir.display());
            let store = Arc::new(Mutex::new(SessionStore::new(&export_dir, thresholds)));
            let transport = StdioTransport::new(ProtocolHandler::new(store));
            transport.run().await?;
        }

        Commands::Discover { traces, output } => {
            let text = if traces == "-" {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                text
            } else {
                std::fs::read_to_string(&traces)
                    .with_context(|| format!("Failed to read traces from {traces}"))?
            };
            let traces = parse_traces(&text)?;
            if traces.is_empty() {
                anyhow::bail!("No traces found in input");
            }
            let matrix = discover_with(&traces, thresholds)?;
            match output {
                Some(path) => {
                    MatrixWriter::write_to_file(&matrix, &path)?;
                    eprintln!(
                        "Wrote {} activities to {}",
                        matrix.len(),
                        path.display()
                    );
                }
                None => MatrixWriter::write_to(&matrix, &mut std::io::stdout())?,
            }
        }

        Commands::Diff { before, after } => {
            let before = MatrixReader::read_from_file(&before)
                .with_context(|| format!("Failed to read {}", before.display()))?;
            let after = MatrixReader::read_from_file(&after)
                .with_context(|| format!("Failed to read {}", after.display()))?;
            let report = diff(&before, &after);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Validate { path } => match MatrixReader::read_from_file(&path) {
            Ok(matrix) => {
                matrix.check_invariants()?;
                println!("Valid matrix file: {}", path.display());
                println!("  Activities: {}", matrix.len());
                println!("  Cells: {}", matrix.cell_count());
            }
            Err(e) => {
                eprintln!("Invalid matrix file: {e}");
                std::process::exit(1);
            }
        },

        Commands::Info => {
            let capabilities = depmatrix_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "operations": depmatrix::Operation::names(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "depmatrix-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
