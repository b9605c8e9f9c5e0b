//! Background task startup functions

use super::config::AppConfig;
use parley_core::{spawn_sweeper, SessionCache, ShutdownController};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Start the idle-session sweeper
pub fn start_session_sweeper(
    config: &AppConfig,
    sessions: &Arc<SessionCache>,
    shutdown_controller: &ShutdownController,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(config.session.sweep_interval_secs);
    let handle = spawn_sweeper(sessions.clone(), interval, shutdown_controller.token());
    info!(
        "Session sweeper started (interval: {}s, expiry: {}s)",
        config.session.sweep_interval_secs, config.session.expiry_secs
    );
    handle
}
