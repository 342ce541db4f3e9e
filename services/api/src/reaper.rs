//! services/api/src/reaper.rs
//!
//! Background task that prunes terminal notes.
//!
//! Runs on a fixed interval, asks the gateway to sweep every stored note and
//! delete the ones whose lifecycle state is terminal (expired, or read with
//! auto-delete set). This is purely a cleanup of store size: the read path
//! performs equivalent lazy cleanup on its own, so correctness never depends
//! on this task having run.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use notes_core::gateway::NoteGateway;
use tracing::{info, warn};

pub async fn run_reaper_loop(gateway: Arc<NoteGateway>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match gateway.sweep(Utc::now()).await {
            Ok(count) => {
                if count > 0 {
                    info!("Reaper: pruned {} terminal notes", count);
                }
            }
            Err(e) => {
                // Store hiccups are retried on the next tick.
                warn!("Reaper error: {}", e);
            }
        }
    }
}
