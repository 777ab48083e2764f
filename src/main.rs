//! gscreenshot: command line front end
//!
//! Takes one screenshot, then saves, copies and/or opens it. Exits with 1
//! whenever no image was produced or it could not be delivered.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use gscreenshot::{
    capture::{CaptureOrchestrator, CaptureOutcome, create_orchestrator, task},
    config::Config,
    error::CaptureError,
    model::{CaptureMode, CaptureRequest, ProgramInfo},
    util::{clipboard, output},
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// How many seconds to wait before taking the screenshot
    #[arg(short, long, default_value_t = 0.0)]
    delay: f64,

    /// Where to store the screenshot. A path without an extension is treated
    /// as a directory (created if needed) receiving gscreenshot_<time>.png
    #[arg(short, long)]
    filename: Option<PathBuf>,

    /// Copy the image to the clipboard. Combine with -f to save and copy
    #[arg(short, long)]
    clip: bool,

    /// Open the screenshot in your default viewer
    #[arg(short, long)]
    open: bool,

    /// Select a region to screenshot
    #[arg(short, long, conflicts_with = "window")]
    selection: bool,

    /// Pick a window to screenshot
    #[arg(short, long)]
    window: bool,

    /// Include the mouse pointer
    #[arg(short, long)]
    pointer: bool,

    /// Show information about gscreenshot
    #[arg(short = 'V', long)]
    version: bool,

    /// Print --version output as JSON
    #[arg(long, requires = "version")]
    json: bool,
}

impl Cli {
    fn mode(&self) -> CaptureMode {
        if self.selection {
            CaptureMode::Selection
        } else if self.window {
            CaptureMode::Window
        } else {
            CaptureMode::Full
        }
    }

    fn request(&self) -> Result<CaptureRequest, CaptureError> {
        Ok(CaptureRequest::new(self.mode())
            .with_delay_secs(self.delay)?
            .with_cursor(self.pointer))
    }

    /// Save when asked to, or when the image would otherwise go nowhere
    fn should_save(&self) -> bool {
        self.filename.is_some() || !self.clip
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Respects RUST_LOG, quiet by default
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gscreenshot=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(capture_error) = e.downcast_ref::<CaptureError>() {
                eprintln!("{}", capture_error.remediation_hint());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_env()?;
    let request = cli.request()?;

    let orchestrator = match create_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(e) if e.is_fatal() => {
            tracing::debug!("{}", e);
            println!("No supported screenshot backend is available.");
            println!("Please install one to use gscreenshot.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if cli.version {
        print_version(&orchestrator, cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = task::spawn_capture(task::shared(orchestrator), request)
        .await
        .context("capture task panicked")?;

    let image = match outcome {
        CaptureOutcome::Captured(image) => image,
        CaptureOutcome::Cancelled => {
            println!("No screenshot taken.");
            return Ok(ExitCode::FAILURE);
        }
        CaptureOutcome::Failed(e) => {
            tracing::info!("{}", e.remediation_hint());
            println!("No screenshot taken.");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut exit_code = ExitCode::SUCCESS;
    let mut saved_path = None;

    if cli.should_save() {
        match output::save_screenshot(&image, cli.filename.as_deref(), config.save_dir.as_deref()) {
            Ok(path) => saved_path = Some(path),
            Err(e) => {
                tracing::warn!("{}", e);
                println!("Failed to save screenshot!");
                exit_code = ExitCode::FAILURE;
            }
        }
    }

    if cli.open {
        let path = match saved_path.clone() {
            Some(path) => Some(path),
            None => output::save_to_temp(&image).ok(),
        };
        match path {
            Some(path) => {
                if let Err(e) = output::open_in_viewer(&path) {
                    eprintln!("{}", e);
                }
            }
            None => eprintln!("Could not open the screenshot: it was not saved."),
        }
    }

    if cli.clip {
        if let Err(e) = clipboard::copy_image(&image, config.session) {
            tracing::warn!("{}", e);
            println!("Could not clip image! {}", e.remediation_hint());
            let fallback = output::save_to_temp(&image)?;
            println!("Your screenshot was saved to {}", fallback.display());
            exit_code = ExitCode::FAILURE;
        }
    }

    Ok(exit_code)
}

fn print_version(orchestrator: &CaptureOrchestrator, json: bool) -> Result<()> {
    let info = ProgramInfo::new(orchestrator.backend_name(), orchestrator.capabilities());

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Using {} screenshot backend", info.backend);
    println!("{} {}; {}", info.name, info.version, info.description);
    println!("{}", info.website);
    println!();
    println!("Author(s)");
    println!("{}", info.authors.join("\n"));
    println!();
    println!("Licensed as {}", info.license);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gscreenshot"]).unwrap();
        assert_eq!(cli.mode(), CaptureMode::Full);
        assert!(cli.should_save());

        let request = cli.request().unwrap();
        assert_eq!(request.delay, Duration::ZERO);
        assert!(!request.capture_cursor);
    }

    #[test]
    fn test_capture_flags() {
        let cli = Cli::try_parse_from(["gscreenshot", "-s", "-d", "1.5", "-p"]).unwrap();
        let request = cli.request().unwrap();
        assert_eq!(request.mode, CaptureMode::Selection);
        assert_eq!(request.delay, Duration::from_millis(1500));
        assert!(request.capture_cursor);
    }

    #[test]
    fn test_clip_only_does_not_save() {
        let cli = Cli::try_parse_from(["gscreenshot", "-c"]).unwrap();
        assert!(!cli.should_save());

        let both = Cli::try_parse_from(["gscreenshot", "-c", "-f", "shot.png"]).unwrap();
        assert!(both.should_save());
    }

    #[test]
    fn test_negative_delay_is_rejected() {
        let cli = Cli::try_parse_from(["gscreenshot", "--delay=-2"]).unwrap();
        assert!(cli.request().is_err());
    }

    #[test]
    fn test_selection_conflicts_with_window() {
        assert!(Cli::try_parse_from(["gscreenshot", "-s", "-w"]).is_err());
        assert!(Cli::try_parse_from(["gscreenshot", "--json"]).is_err());
        assert!(Cli::try_parse_from(["gscreenshot", "-V", "--json"]).is_ok());
    }
}
