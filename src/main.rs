mod config;
mod gui;
mod hierarchy;
mod inference;
mod labels;
mod normalize;
mod playback;
mod response;
mod session;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::gui::ScopeApp;
use crate::session::Session;

/// Log to stderr and, when a platform data dir exists, to a daily-rolling
/// file. The returned guard must stay alive for the file writer to flush.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = directories::ProjectDirs::from("dev", "EarScope", "earscope")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, "earscope.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(fmt::layer().with_ansi(false).with_writer(file_writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
    }
}

fn main() -> Result<()> {
    let _log_guard = init_tracing();
    tracing::info!("=== EarScope - Audio CNN Visualizer ===");

    let config = AppConfig::load();
    tracing::info!("[Main] Inference endpoint: {}", config.endpoint_url);

    // Shared session state: the worker writes inference outcomes, the GUI
    // reads and renders. One value, explicit transitions.
    let session = Arc::new(Mutex::new(Session::new()));

    // Start the inference worker thread. It exits on its own once the GUI
    // drops the request sender.
    let upload_tx = inference::spawn_worker(config.endpoint_url.clone(), session.clone());

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size(config.window_size)
        .with_title("EarScope - Audio CNN Visualizer")
        .with_resizable(true);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    // Run the app (this blocks until the window closes)
    eframe::run_native(
        "EarScope",
        options,
        Box::new(move |_cc| Ok(Box::new(ScopeApp::new(session, upload_tx, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))?;

    tracing::info!("[Main] ✓ Shutdown complete");
    Ok(())
}
