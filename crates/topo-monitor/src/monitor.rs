//! Live monitor: periodic snapshot publication with lifecycle control.
//!
//! # States
//!
//! ```text
//!            start / resume / set_online(true)
//!   Stopped ───────────────► Running ◄──────────── Offline
//!      ▲                      │   │ ▲                 ▲
//!      │ stop                 │   │ │ resume          │ set_online(false)
//!      └──────────────────────┘   ▼ │                 │
//!                               Paused ───────────────┘ (only from Running)
//! ```
//!
//! While `Running`, a background task publishes one snapshot immediately and
//! then one per interval. Every halt (stop, pause, going offline) bumps an
//! epoch and aborts the task. Fan-out runs under a separate publish lock and
//! re-checks the epoch before each callback, and a halt waits for an in-flight
//! fan-out on another thread to finish. Once [`LiveMonitor::stop`] returns, no
//! subscriber is invoked again until the next start.
//!
//! Callbacks may call any monitor method, including `stop` and `pause`. A halt
//! from inside a callback skips the remaining subscribers of that snapshot.
//!
//! The tick task only holds a weak reference; dropping every [`LiveMonitor`]
//! handle ends it.

use std::cell::Cell;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use topo_core::Catalog;
use topo_core::error::TopoError;
use topo_core::types::Snapshot;
use tracing::{debug, error, info, warn};

use crate::probe::ProbeStats;
use crate::source::SnapshotSource;

/// Callback invoked with every published snapshot.
pub type SnapshotCallback = Arc<dyn Fn(Arc<Snapshot>) + Send + Sync>;

/// Lifecycle state of a [`LiveMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Running,
    Paused,
    /// Halted because the network went away; resumes when it comes back.
    Offline,
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub ticks: u64,
    pub published: u64,
    pub failed_ticks: u64,
    pub dropped_samples: u64,
    pub subscribers: usize,
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    published: AtomicU64,
    failed_ticks: AtomicU64,
    dropped_samples: AtomicU64,
}

struct Control {
    state: MonitorState,
    online: bool,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    source: Arc<dyn SnapshotSource>,
    catalog: Catalog,
    interval: Duration,
    control: Mutex<Control>,
    /// Bumped under `control` on every start and halt.
    epoch: AtomicU64,
    /// Held for the whole fan-out of one snapshot.
    publish_lock: Mutex<()>,
    subscribers: Mutex<Vec<(u64, SnapshotCallback)>>,
    next_subscriber: AtomicU64,
    latest: Mutex<Option<Arc<Snapshot>>>,
    counters: Counters,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let ctl = self.control.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = ctl.task.take() {
            task.abort();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

thread_local! {
    /// Address of the `Shared` whose subscribers this thread is running.
    static PUBLISHING: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as fanning out for one monitor.
struct PublishingGuard {
    previous: usize,
}

impl PublishingGuard {
    fn enter(shared: &Shared) -> Self {
        let previous = PUBLISHING.with(|p| p.replace(shared as *const Shared as usize));
        Self { previous }
    }
}

impl Drop for PublishingGuard {
    fn drop(&mut self) {
        PUBLISHING.with(|p| p.set(self.previous));
    }
}

/// Polls a [`SnapshotSource`] and fans snapshots out to subscribers.
///
/// Cheap to clone; clones share the same task, subscribers and state.
/// `start`, `resume` and `set_online(true)` spawn onto the current Tokio
/// runtime and panic outside one, like `tokio::spawn`.
#[derive(Clone)]
pub struct LiveMonitor {
    shared: Arc<Shared>,
}

impl LiveMonitor {
    pub fn new(source: Arc<dyn SnapshotSource>, catalog: Catalog, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                catalog,
                interval: interval.max(Duration::from_millis(1)),
                control: Mutex::new(Control { state: MonitorState::Stopped, online: true, task: None }),
                epoch: AtomicU64::new(0),
                publish_lock: Mutex::new(()),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                latest: Mutex::new(None),
                counters: Counters::default(),
            }),
        }
    }

    pub fn state(&self) -> MonitorState {
        lock(&self.shared.control).state
    }

    pub fn is_online(&self) -> bool {
        lock(&self.shared.control).online
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Measured / simulated counts of the source's last snapshot, when the
    /// source times real endpoints.
    pub fn measurement_stats(&self) -> Option<Arc<ProbeStats>> {
        self.shared.source.measurement_stats()
    }

    /// Begin publishing. No-op while already running (or waiting offline).
    pub fn start(&self) {
        let mut ctl = lock(&self.shared.control);
        match ctl.state {
            MonitorState::Running | MonitorState::Offline => {}
            MonitorState::Stopped | MonitorState::Paused => self.run_locked(&mut ctl),
        }
    }

    /// Halt publishing. The last snapshot stays available via [`latest`](Self::latest).
    pub fn stop(&self) {
        let mut ctl = lock(&self.shared.control);
        if ctl.state == MonitorState::Stopped {
            return;
        }
        self.shared.halt_locked(&mut ctl, MonitorState::Stopped);
        drop(ctl);
        self.shared.wait_for_fan_out();
        info!("[monitor] stopped");
    }

    /// Suspend a running monitor. Returns `false` when it was not running.
    pub fn pause(&self) -> bool {
        let mut ctl = lock(&self.shared.control);
        if ctl.state != MonitorState::Running {
            return false;
        }
        self.shared.halt_locked(&mut ctl, MonitorState::Paused);
        drop(ctl);
        self.shared.wait_for_fan_out();
        info!("[monitor] paused");
        true
    }

    /// Resume a paused monitor. Returns `false` when it was not paused.
    pub fn resume(&self) -> bool {
        let mut ctl = lock(&self.shared.control);
        if ctl.state != MonitorState::Paused {
            return false;
        }
        self.run_locked(&mut ctl);
        true
    }

    /// Record network reachability. Going offline halts a running monitor;
    /// coming back online restarts one that was halted for that reason.
    /// Paused and stopped monitors keep their state.
    pub fn set_online(&self, online: bool) {
        let mut ctl = lock(&self.shared.control);
        if ctl.online == online {
            return;
        }
        ctl.online = online;
        match (online, ctl.state) {
            (false, MonitorState::Running) => {
                self.shared.halt_locked(&mut ctl, MonitorState::Offline);
                drop(ctl);
                self.shared.wait_for_fan_out();
                warn!("[monitor] network offline, publication halted");
            }
            (true, MonitorState::Offline) => {
                info!("[monitor] network back online");
                self.run_locked(&mut ctl);
            }
            _ => debug!("[monitor] online={online} in state {:?}", ctl.state),
        }
    }

    /// Drive [`set_online`](Self::set_online) from a connectivity channel.
    ///
    /// The task applies the current value immediately and ends when the
    /// sender is dropped.
    pub fn watch_connectivity(&self, mut rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let online = *rx.borrow_and_update();
            monitor.set_online(online);
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                monitor.set_online(online);
            }
        })
    }

    /// Register `callback` for every future publication.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Arc<Snapshot>) + Send + Sync + 'static,
    {
        let id = self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed);
        lock(&self.shared.subscribers).push((id, Arc::new(callback)));
        Subscription { id, shared: Arc::downgrade(&self.shared) }
    }

    /// Most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        lock(&self.shared.latest).clone()
    }

    pub fn stats(&self) -> MonitorStats {
        let c = &self.shared.counters;
        MonitorStats {
            ticks: c.ticks.load(Ordering::Relaxed),
            published: c.published.load(Ordering::Relaxed),
            failed_ticks: c.failed_ticks.load(Ordering::Relaxed),
            dropped_samples: c.dropped_samples.load(Ordering::Relaxed),
            subscribers: lock(&self.shared.subscribers).len(),
        }
    }

    /// Transition to `Running`, or `Offline` when the network is down.
    fn run_locked(&self, ctl: &mut Control) {
        if !ctl.online {
            ctl.state = MonitorState::Offline;
            info!("[monitor] start requested while offline, waiting for network");
            return;
        }
        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        ctl.state = MonitorState::Running;
        if let Some(old) = ctl.task.take() {
            old.abort();
        }
        ctl.task = Some(tokio::spawn(tick_loop(Arc::downgrade(&self.shared), self.shared.interval, epoch)));
        info!(
            "[monitor] running: source={} interval={:?}",
            self.shared.source.name(),
            self.shared.interval
        );
    }
}

async fn tick_loop(weak: Weak<Shared>, period: Duration, epoch: u64) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(shared) = weak.upgrade() else {
            debug!("[monitor] every handle dropped, tick task exiting");
            return;
        };
        shared.counters.ticks.fetch_add(1, Ordering::Relaxed);

        let result = match AssertUnwindSafe(shared.source.snapshot()).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(TopoError::Source(format!("{} panicked", shared.source.name()))),
        };
        let mut snapshot = match result {
            Ok(s) => s,
            Err(e) => {
                shared.counters.failed_ticks.fetch_add(1, Ordering::Relaxed);
                warn!("[monitor] snapshot failed, skipping tick: {e}");
                continue;
            }
        };

        let dropped = shared.catalog.retain_known(&mut snapshot.samples);
        if dropped > 0 {
            shared.counters.dropped_samples.fetch_add(dropped as u64, Ordering::Relaxed);
            warn!("[monitor] dropped {dropped} samples with unknown or duplicate ids");
        }

        if !shared.publish(epoch, snapshot) {
            return;
        }
    }
}

impl Shared {
    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn halt_locked(&self, ctl: &mut Control, next: MonitorState) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        ctl.state = next;
        if let Some(task) = ctl.task.take() {
            task.abort();
        }
    }

    /// Block until a fan-out running on another thread has finished. Called
    /// after the epoch bump, so any later fan-out sees the stale epoch.
    fn wait_for_fan_out(&self) {
        let here = PUBLISHING.with(Cell::get) == self as *const Shared as usize;
        if !here {
            drop(lock(&self.publish_lock));
        }
    }

    /// Fan `snapshot` out to subscribers. Returns `false` when `epoch` is
    /// stale, before or during the fan-out.
    fn publish(&self, epoch: u64, snapshot: Snapshot) -> bool {
        let _publishing = lock(&self.publish_lock);
        if !self.is_current(epoch) {
            return false;
        }

        let snapshot = Arc::new(snapshot);
        *lock(&self.latest) = Some(Arc::clone(&snapshot));
        self.counters.published.fetch_add(1, Ordering::Relaxed);
        debug!("[monitor] published {} samples", snapshot.len());

        // Callbacks may (un)subscribe, so iterate over a copy.
        let callbacks: Vec<SnapshotCallback> =
            lock(&self.subscribers).iter().map(|(_, cb)| Arc::clone(cb)).collect();
        let _guard = PublishingGuard::enter(self);
        for cb in callbacks {
            if !self.is_current(epoch) {
                debug!("[monitor] halted during fan-out");
                return false;
            }
            let snap = Arc::clone(&snapshot);
            if std::panic::catch_unwind(AssertUnwindSafe(|| cb(snap))).is_err() {
                error!("[monitor] subscriber panicked");
            }
        }
        self.is_current(epoch)
    }
}

/// Handle returned by [`LiveMonitor::subscribe`].
///
/// Dropping it keeps the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the callback. Other subscribers are unaffected. Returns `false`
    /// when the monitor is already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let mut subs = lock(&shared.subscribers);
        let before = subs.len();
        subs.retain(|(id, _)| *id != self.id);
        subs.len() != before
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use async_trait::async_trait;
    use topo_core::error::{Result, TopoError};
    use topo_core::types::LatencySample;

    use crate::source::SimulatedSource;

    const INTERVAL: Duration = Duration::from_secs(5);

    #[derive(Clone, Copy)]
    enum Fault {
        None,
        ErrOn(u64),
        PanicOn(u64),
        Slow(Duration),
        Ghost,
    }

    struct TestSource {
        inner: SimulatedSource,
        calls: AtomicU64,
        fault: Fault,
    }

    #[async_trait]
    impl SnapshotSource for TestSource {
        fn name(&self) -> &str {
            "test"
        }

        async fn snapshot(&self) -> Result<Snapshot> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fault {
                Fault::ErrOn(k) if k == n => return Err(TopoError::Source("boom".into())),
                Fault::PanicOn(k) if k == n => panic!("source blew up"),
                Fault::Slow(d) => tokio::time::sleep(d).await,
                _ => {}
            }
            let mut snap = self.inner.snapshot().await?;
            if let Fault::Ghost = self.fault {
                snap.samples.push(LatencySample {
                    exchange_id: "ghost".into(),
                    cloud_region_id: "aws-us-east-1".into(),
                    latency_ms: 1,
                    timestamp_ms: snap.taken_at_ms,
                    packet_loss_pct: 0.0,
                });
            }
            Ok(snap)
        }
    }

    fn monitor_with(fault: Fault) -> LiveMonitor {
        let catalog = Catalog::builtin();
        let source = TestSource {
            inner: SimulatedSource::new(catalog.clone()),
            calls: AtomicU64::new(0),
            fault,
        };
        LiveMonitor::new(Arc::new(source), catalog, INTERVAL)
    }

    fn counting(m: &LiveMonitor) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = m.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    fn get(c: &AtomicUsize) -> usize {
        c.load(Ordering::SeqCst)
    }

    /// Let spawned tasks run without crossing a tick boundary.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_immediately_then_every_interval() {
        let m = monitor_with(Fault::None);
        let (count, _sub) = counting(&m);

        m.start();
        assert_eq!(m.state(), MonitorState::Running);
        settle().await;
        assert_eq!(get(&count), 1);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(get(&count), 2);

        let latest = m.latest().unwrap();
        assert_eq!(latest.len(), Catalog::builtin().pair_count());
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let m = monitor_with(Fault::None);
        let (count, _sub) = counting(&m);
        m.start();
        m.start();
        settle().await;
        assert_eq!(get(&count), 1);
        assert_eq!(m.stats().published, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_published_after_stop() {
        let m = monitor_with(Fault::None);
        let (count, _sub) = counting(&m);
        m.start();
        settle().await;
        m.stop();
        assert_eq!(m.state(), MonitorState::Stopped);

        tokio::time::sleep(INTERVAL * 10).await;
        assert_eq!(get(&count), 1);
        assert!(m.latest().is_some());

        // Restart publishes immediately again.
        m.start();
        settle().await;
        assert_eq!(get(&count), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_snapshot() {
        let m = monitor_with(Fault::Slow(Duration::from_secs(1)));
        let (count, _sub) = counting(&m);
        m.start();
        tokio::time::sleep(Duration::from_millis(500)).await;
        m.stop();
        tokio::time::sleep(INTERVAL * 2).await;
        assert_eq!(get(&count), 0);
        assert!(m.latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribe_leaves_others() {
        let m = monitor_with(Fault::None);
        let (a, sub_a) = counting(&m);
        let (b, _sub_b) = counting(&m);
        assert_eq!(m.stats().subscribers, 2);

        m.start();
        settle().await;
        assert!(sub_a.unsubscribe());
        assert_eq!(m.stats().subscribers, 1);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(get(&a), 1);
        assert_eq!(get(&b), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_tick_keeps_loop_alive() {
        let m = monitor_with(Fault::ErrOn(0));
        let (count, _sub) = counting(&m);
        m.start();
        settle().await;
        assert_eq!(get(&count), 0);
        assert_eq!(m.stats().failed_ticks, 1);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(get(&count), 1);
        assert_eq!(m.state(), MonitorState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_source_keeps_loop_alive() {
        let m = monitor_with(Fault::PanicOn(0));
        let (count, _sub) = counting(&m);
        m.start();
        settle().await;
        assert_eq!(m.stats().failed_ticks, 1);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(get(&count), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_subscriber_does_not_starve_others() {
        let m = monitor_with(Fault::None);
        let _bad = m.subscribe(|_| panic!("bad subscriber"));
        let (count, _sub) = counting(&m);
        m.start();
        settle().await;
        tokio::time::sleep(INTERVAL).await;
        assert_eq!(get(&count), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_ids_never_published() {
        let m = monitor_with(Fault::Ghost);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _sub = m.subscribe(move |snap| lock(&*s).push(snap));

        m.start();
        settle().await;

        let catalog = Catalog::builtin();
        let snaps = lock(&*seen);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].len(), catalog.pair_count());
        assert!(snaps[0].samples.iter().all(|s| catalog.knows(s)));
        assert_eq!(m.stats().dropped_samples, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume() {
        let m = monitor_with(Fault::None);
        let (count, _sub) = counting(&m);
        assert!(!m.pause());

        m.start();
        settle().await;
        assert!(m.pause());
        assert_eq!(m.state(), MonitorState::Paused);
        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(get(&count), 1);
        assert!(m.latest().is_some());

        assert!(m.resume());
        assert!(!m.resume());
        settle().await;
        assert_eq!(get(&count), 2);
        assert_eq!(m.state(), MonitorState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn offline_halts_and_online_restarts() {
        let m = monitor_with(Fault::None);
        let (count, _sub) = counting(&m);
        m.start();
        settle().await;

        m.set_online(false);
        assert_eq!(m.state(), MonitorState::Offline);
        assert!(!m.is_online());
        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(get(&count), 1);

        m.set_online(true);
        assert_eq!(m.state(), MonitorState::Running);
        settle().await;
        assert_eq!(get(&count), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_offline_waits() {
        let m = monitor_with(Fault::None);
        let (count, _sub) = counting(&m);
        m.set_online(false);
        m.start();
        assert_eq!(m.state(), MonitorState::Offline);
        settle().await;
        assert_eq!(get(&count), 0);

        m.set_online(true);
        settle().await;
        assert_eq!(get(&count), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_monitor_ignores_connectivity() {
        let m = monitor_with(Fault::None);
        m.start();
        settle().await;
        m.pause();
        m.set_online(false);
        m.set_online(true);
        assert_eq!(m.state(), MonitorState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn follows_connectivity_channel() {
        let m = monitor_with(Fault::None);
        let (tx, rx) = watch::channel(true);
        let watcher = m.watch_connectivity(rx);
        m.start();
        settle().await;

        tx.send(false).unwrap();
        settle().await;
        assert_eq!(m.state(), MonitorState::Offline);

        tx.send(true).unwrap();
        settle().await;
        assert_eq!(m.state(), MonitorState::Running);

        drop(tx);
        watcher.await.unwrap();
        m.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_from_inside_callback() {
        let m = monitor_with(Fault::None);
        let handle = m.clone();
        let _stopper = m.subscribe(move |_| handle.stop());
        let (count, _sub) = counting(&m);

        m.start();
        settle().await;
        assert_eq!(m.state(), MonitorState::Stopped);
        // Halted before the second subscriber ran.
        assert_eq!(get(&count), 0);
        assert!(m.latest().is_some());

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(get(&count), 0);
        assert_eq!(m.stats().published, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_after_n_updates_from_callback() {
        let m = monitor_with(Fault::None);
        let handle = m.clone();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        let _sub = m.subscribe(move |_| {
            if s.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                assert!(handle.pause());
            }
        });

        m.start();
        settle().await;
        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(get(&seen), 2);
        assert_eq!(m.state(), MonitorState::Paused);

        assert!(m.resume());
        settle().await;
        assert_eq!(get(&seen), 3);
        m.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_from_callback_on_worker_thread() {
        let m = monitor_with(Fault::None);
        let handle = m.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let _sub = m.subscribe(move |_| {
            handle.stop();
            if let Some(tx) = lock(&tx).take() {
                let _ = tx.send(handle.state());
            }
        });

        m.start();
        let state = tokio::time::timeout(Duration::from_secs(3), rx).await.unwrap().unwrap();
        assert_eq!(state, MonitorState::Stopped);
        assert_eq!(m.state(), MonitorState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn ticking_ends_when_every_handle_dropped() {
        let m = monitor_with(Fault::None);
        let (count, sub) = counting(&m);
        m.start();
        settle().await;
        assert_eq!(get(&count), 1);

        drop(m);
        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(get(&count), 1);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn simulated_source_has_no_measurement_stats() {
        assert!(monitor_with(Fault::None).measurement_stats().is_none());
    }

    #[tokio::test]
    async fn unsubscribe_after_monitor_dropped() {
        let m = monitor_with(Fault::None);
        let (_, sub) = counting(&m);
        drop(m);
        assert!(!sub.unsubscribe());
    }
}
