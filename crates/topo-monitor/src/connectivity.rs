//! Periodic network reachability check.
//!
//! Probes a single URL on a fixed period and publishes the result on a
//! `watch` channel, which [`LiveMonitor::watch_connectivity`] consumes.
//!
//! [`LiveMonitor::watch_connectivity`]: crate::monitor::LiveMonitor::watch_connectivity

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::probe::{Prober, extract_host};

pub struct ConnectivityChecker {
    url: String,
    prober: Arc<dyn Prober>,
    interval: Duration,
    timeout: Duration,
}

impl ConnectivityChecker {
    pub fn new(url: impl Into<String>, prober: Arc<dyn Prober>, interval: Duration, timeout: Duration) -> Self {
        Self { url: url.into(), prober, interval, timeout }
    }

    /// One reachability check. Any answer within the timeout counts as online.
    pub async fn check_once(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.prober.probe(&self.url)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!("[connectivity] {e}");
                false
            }
            Err(_) => {
                debug!("[connectivity] {} timed out", extract_host(&self.url));
                false
            }
        }
    }

    /// Spawn the check loop. The channel starts at `true`; the task exits
    /// once every receiver is dropped.
    pub fn spawn(self) -> (watch::Receiver<bool>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(true);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = tx.closed() => {
                        debug!("[connectivity] all receivers gone, exiting");
                        return;
                    }
                }

                let online = self.check_once().await;
                let changed = tx.send_if_modified(|current| {
                    let changed = *current != online;
                    *current = online;
                    changed
                });
                if changed {
                    if online {
                        info!("[connectivity] {} reachable", extract_host(&self.url));
                    } else {
                        warn!("[connectivity] {} unreachable", extract_host(&self.url));
                    }
                }
            }
        });
        (rx, task)
    }
}
