//! # Ingestion Scheduler
//!
//! Owns the periodic ingestion pass.
//!
//! - One pass right after start (unless disabled), then one per interval
//! - A pass that overruns the interval finishes, the missed tick is delayed rather than stacked
//! - The in-flight flag covers both the timer and manual triggers, so two passes never overlap
//! - [`IngestScheduler::stop`] waits for a running pass instead of cancelling it, manual ones included
//! - A failed pass clears `last_upserted`, the count always belongs to the last finished pass
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use process::Ingestor;
use serde::Serialize;
use tokio::{
    sync::{Mutex, RwLock, watch},
    task::{JoinHandle, JoinSet},
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Started,
    AlreadyRunning,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct IngestStatus {
    pub in_flight: bool,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_upserted: Option<usize>,
    pub last_error: Option<String>,
}

pub struct IngestScheduler {
    ingestor: Ingestor,
    period: Duration,
    run_on_start: bool,
    in_flight: AtomicBool,
    status: RwLock<IngestStatus>,
    shutdown: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    manual: Mutex<JoinSet<()>>,
}

/// Clears the in-flight flag when the pass ends, panics included.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl IngestScheduler {
    pub fn new(ingestor: Ingestor, period: Duration, run_on_start: bool) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);

        Arc::new(Self {
            ingestor,
            period,
            run_on_start,
            in_flight: AtomicBool::new(false),
            status: RwLock::new(IngestStatus::default()),
            shutdown,
            handle: Mutex::new(None),
            manual: Mutex::new(JoinSet::new()),
        })
    }

    pub async fn start(self: &Arc<Self>) {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            warn!("Ingestion scheduler already started");
            return;
        }

        let scheduler = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();

        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval(scheduler.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            if !scheduler.run_on_start {
                ticker.tick().await;
            }

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if scheduler.run_guarded().await == Trigger::AlreadyRunning {
                            warn!("Skipping scheduled ingestion, previous pass still running");
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }

            info!("Ingestion scheduler stopped");
        }));

        info!("Ingestion scheduler started, every {:?}", self.period);
    }

    /// Starts a pass in the background unless one is already running. The pass is tracked so
    /// [`IngestScheduler::stop`] can wait for it.
    pub async fn trigger(self: &Arc<Self>) -> Trigger {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Trigger::AlreadyRunning;
        }

        let mut manual = self.manual.lock().await;
        while let Some(result) = manual.try_join_next() {
            if let Err(e) = result {
                error!("Manual ingestion task failed: {e}");
            }
        }

        let scheduler = Arc::clone(self);
        manual.spawn(async move {
            let _guard = InFlight(&scheduler.in_flight);
            scheduler.run().await;
        });

        Trigger::Started
    }

    pub async fn stop(&self) {
        self.shutdown.send_replace(true);

        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Ingestion scheduler task failed: {e}");
            }
        }

        let mut manual = self.manual.lock().await;
        while let Some(result) = manual.join_next().await {
            if let Err(e) = result {
                error!("Manual ingestion task failed: {e}");
            }
        }
    }

    pub async fn status(&self) -> IngestStatus {
        IngestStatus {
            in_flight: self.in_flight.load(Ordering::SeqCst),
            ..self.status.read().await.clone()
        }
    }

    async fn run_guarded(&self) -> Trigger {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Trigger::AlreadyRunning;
        }

        let _guard = InFlight(&self.in_flight);
        self.run().await;

        Trigger::Started
    }

    async fn run(&self) {
        let result = self.ingestor.run().await;
        let mut status = self.status.write().await;

        status.last_finished_at = Some(Utc::now());
        match result {
            Ok(report) => {
                status.last_upserted = Some(report.upserted);
                status.last_error = None;
            }
            Err(e) => {
                error!("Ingestion aborted: {e}");
                status.last_upserted = None;
                status.last_error = Some(e.to_string());
            }
        }
    }
}
