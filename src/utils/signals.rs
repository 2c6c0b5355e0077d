//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::info;

/// Resolve once SIGTERM, SIGINT, or SIGQUIT is delivered
pub async fn shutdown_signal() {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGQUIT,
    ])
    .expect("Failed to register signal handler");

    if let Some(signal) = signals.next().await {
        info!("Received signal {}, shutting down", signal);
    }
}
