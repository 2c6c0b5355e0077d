//! Take Five - a Pomodoro interval timer daemon
//!
//! This is the main entry point for the take-five application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use take_five::{
    api::create_router,
    config::Config,
    services::{DesktopNotifier, JsonSettingsStore, LogNotifier, NotificationSink},
    state::{AppState, TimerEngine},
    tasks::tick_driver_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "take_five={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting take-five v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, settings={}",
        config.host,
        config.port,
        config.settings_path().display()
    );

    // Wire the engine to its collaborators
    let settings = JsonSettingsStore::open(config.settings_path());
    let notifier: Box<dyn NotificationSink> = if config.no_desktop_notify {
        Box::new(LogNotifier::new())
    } else {
        Box::new(DesktopNotifier::new())
    };
    let engine = TimerEngine::new(Box::new(settings), notifier);

    // Create application state
    let state = Arc::new(AppState::new(engine, config.port, config.host.clone()));

    // Start the tick driver background task
    let driver_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(driver_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                        - Start the countdown");
    info!("  POST /pause                        - Pause the countdown");
    info!("  POST /reset                        - Reset the current phase");
    info!("  POST /remaining/increase/:seconds  - Add to the remaining time");
    info!("  POST /remaining/decrease/:seconds  - Take from the remaining time");
    info!("  PUT  /duration/:phase/:seconds     - Configure a phase duration");
    info!("  GET  /status                       - Current timer state");
    info!("  GET  /health                       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
