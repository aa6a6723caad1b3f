pub mod app;
mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod loader;
pub mod logging;
pub mod state;
pub mod surface;
pub use config::{load_app_config, load_app_config_from, AppConfig, SessionSettings};
pub use error::{AppError, AppResult};

use clap::Parser;

/// Entrypoint used by the CLI binary.
pub fn run() -> AppResult<()> {
    logging::init();
    let args = app::Args::parse();
    tracing::info!(
        image = %args.image.display(),
        script = %args.script.display(),
        "starting maskpaint"
    );

    let report = app::run(&args)?;

    for path in &report.exports {
        tracing::info!(path = %path.display(), "wrote mask");
    }
    tracing::info!(status = %report.status, "replay complete");
    Ok(())
}
