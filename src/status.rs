//! Periodic one-line status reports from the shared runtime state.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use legends_core::RuntimeState;

pub fn spawn(state: Arc<RuntimeState>, period: Duration) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        loop {
            thread::sleep(period);
            let snap = state.snapshot();
            log::info!(
                "[{}{}] {} | battles {} | cinematics {} | total {} | fixes {} | recoveries {}",
                snap.status,
                if snap.in_combat { ", in battle" } else { "" },
                snap.action,
                snap.loops,
                snap.cinematics,
                snap.completed,
                snap.stuck_fixed,
                snap.recoveries,
            );
        }
    })
}
