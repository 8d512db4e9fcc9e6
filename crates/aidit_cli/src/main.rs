//! Command-line front end for the AIdit image tools.

use aidit_core::config::normalize_api_url;
use aidit_core::{
    Config, HexColor, HttpTransfer, InputAsset, ProcessingOptions, RequestState, ToolController,
    ToolError, ToolKind, ToolPhase,
};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "aidit", about = "AIdit image tools", version)]
struct Cli {
    /// Backend URL (can also be set via AIDIT_API_URL env var)
    #[arg(short, long, env = "AIDIT_API_URL")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, env = "AIDIT_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Directory the processed image is written to
    #[arg(short, long, global = true, env = "AIDIT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Remove the background in one step
    RemoveBg {
        /// PNG or JPEG image
        file: PathBuf,
    },
    /// Remove or replace the background
    Background {
        /// PNG or JPEG image
        file: PathBuf,
        #[command(flatten)]
        fill: FillArgs,
    },
    /// Upscale an image up to 4x
    Enhance {
        /// PNG or JPEG image
        file: PathBuf,
    },
}

/// Replacement background; at most one may be given. None keeps it transparent.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
struct FillArgs {
    /// Solid color, e.g. #FFFFFF
    #[arg(long, value_name = "HEX")]
    color: Option<String>,

    /// Two-stop gradient
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    gradient: Option<Vec<String>>,

    /// Background image (PNG or JPEG)
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,
}

impl FillArgs {
    fn into_options(self) -> Result<ProcessingOptions, ToolError> {
        if let Some(color) = self.color {
            return Ok(ProcessingOptions::SolidColor {
                color: HexColor::parse(&color)?,
            });
        }
        if let Some(stops) = self.gradient {
            let [start, end] = <[String; 2]>::try_from(stops).map_err(|_| {
                ToolError::validation("--gradient takes exactly two colors")
            })?;
            return Ok(ProcessingOptions::Gradient {
                start: HexColor::parse(&start)?,
                end: HexColor::parse(&end)?,
            });
        }
        if let Some(path) = self.image {
            return Ok(ProcessingOptions::CustomImage {
                background: Some(InputAsset::from_path(path)?),
            });
        }
        Ok(ProcessingOptions::Remove)
    }
}

/// Merge CLI overrides onto environment-derived configuration.
fn resolve_config(
    base: Config,
    server: Option<String>,
    timeout: Option<u64>,
    output_dir: Option<PathBuf>,
) -> Config {
    let api_url = server
        .map(|value| normalize_api_url(&value))
        .filter(|value| !value.is_empty())
        .unwrap_or(base.api_url);
    Config {
        api_url,
        timeout_secs: timeout.filter(|secs| *secs > 0).unwrap_or(base.timeout_secs),
        output_dir: output_dir.unwrap_or(base.output_dir),
        ..base
    }
}

fn progress_line(tool: ToolKind, state: &RequestState) -> Option<String> {
    match state {
        RequestState::Uploading(percent) => {
            Some(format!("{}: uploading... {}%", tool.title(), percent))
        }
        RequestState::AwaitingResponse => Some(format!("{}: processing...", tool.title())),
        _ => None,
    }
}

fn format_result_output(
    tool: ToolKind,
    input: &str,
    output: &Path,
    bytes: u64,
    json: bool,
) -> Result<String, String> {
    if json {
        let value = serde_json::json!({
            "tool": tool,
            "input": input,
            "output": output.display().to_string(),
            "bytes": bytes,
        });
        return serde_json::to_string_pretty(&value)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(format!("Saved: {} ({} bytes)", output.display(), bytes))
}

/// Drive one tool through select -> configure -> submit -> download.
///
/// # Returns
/// The path of the downloaded result.
async fn run_tool(
    config: &Config,
    tool: ToolKind,
    file: &Path,
    options: ProcessingOptions,
    show_progress: bool,
) -> anyhow::Result<PathBuf> {
    tracing::debug!(tool = %tool, server = %config.api_url, file = %file.display(), "running tool");
    let transfer = HttpTransfer::new(config)?;
    // The quick remover starts processing as soon as a file is picked.
    let auto_submit = tool == ToolKind::QuickRemove && options.is_remove();
    let mut controller = ToolController::new(tool, Arc::new(transfer), Handle::current())
        .with_auto_submit(auto_submit);
    controller.select_file(InputAsset::from_path(file)?)?;
    if !auto_submit {
        controller.set_options(options)?;
        controller.submit()?;
    }

    let mut last_line: Option<String> = None;
    while controller.is_busy() {
        controller.poll_events();
        if show_progress {
            let line = progress_line(tool, controller.request_state());
            if line.is_some() && line != last_line {
                if let Some(text) = line.as_deref() {
                    eprint!("\r{}", text);
                    let _ = io::stderr().flush();
                }
                last_line = line;
            }
        }
        if controller.is_busy() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
    if show_progress && last_line.is_some() {
        eprintln!();
    }

    match controller.phase() {
        ToolPhase::Previewing => Ok(controller.download_result(&config.output_dir)?),
        _ => {
            let message = controller
                .error()
                .unwrap_or(tool.failure_message())
                .to_string();
            anyhow::bail!(message)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aidit=warn,aidit_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Cli {
        server,
        json,
        timeout,
        output_dir,
        command,
    } = Cli::parse();

    let (tool, file, fill) = match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::RemoveBg { file } => (ToolKind::QuickRemove, file, FillArgs::default()),
        Commands::Background { file, fill } => (ToolKind::Background, file, fill),
        Commands::Enhance { file } => (ToolKind::Enhance, file, FillArgs::default()),
    };

    let config = resolve_config(Config::from_env(), server, timeout, output_dir);
    let options = match fill.into_options() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{} failed: {}", tool.title(), err);
            std::process::exit(1);
        }
    };

    match run_tool(&config, tool, &file, options, !json).await {
        Ok(path) => {
            let bytes = std::fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
            let input = file.display().to_string();
            match format_result_output(tool, &input, &path, bytes, json) {
                Ok(output) => println!("{}", output),
                Err(message) => {
                    eprintln!("{} failed: {}", tool.title(), message);
                    std::process::exit(1);
                }
            }
        }
        Err(err) => {
            eprintln!("{} failed: {}", tool.title(), err);
            std::process::exit(1);
        }
    }

    Ok(())
}
