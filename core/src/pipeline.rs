//! The two-stage measurement pipeline.
//!
//! ```text
//! candidates ─► feeder ─► [probe pool] ─► results ─► aggregator ─┐
//!                                                                 │ survivors
//!              ┌──────────────────────────────────────────────────┘
//!              └► feeder ─► [speed pool] ─► results ─► aggregator ─► rank
//! ```
//!
//! Candidates are streamed, never collected. Each stage ends with a single
//! aggregator that owns the output `Vec`, so workers never share a mutable
//! collection. The speed stage starts only after every probe has finished,
//! keeping downloads from skewing handshake timings.

use std::net::SocketAddrV4;
use std::sync::Arc;

use edgescan_common::config::{Config, Ranking};
use edgescan_common::edge::directory::Directory;
use edgescan_common::edge::record::{EdgeRecord, ProbeResult};
use edgescan_common::success;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::network::transport::EdgeTransport;
use crate::pool::{self, WorkerPool};
use crate::probe::Prober;
use crate::progress::ScanProgress;
use crate::rank;
use crate::speed::SpeedTester;

const RESULT_QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub concurrency: usize,
    /// Zero disables the speed stage.
    pub speed_workers: usize,
    pub marker: String,
}

impl From<&Config> for PipelineSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            concurrency: cfg.concurrency,
            speed_workers: cfg.speed_workers,
            marker: cfg.identity_marker(),
        }
    }
}

impl PipelineSettings {
    pub fn ranking(&self) -> Ranking {
        Ranking::for_speed_workers(self.speed_workers)
    }
}

pub struct Pipeline {
    transport: Arc<dyn EdgeTransport>,
    directory: Arc<Directory>,
    settings: PipelineSettings,
    progress: Arc<ScanProgress>,
}

impl Pipeline {
    /// `directory` must be fully loaded: it is never touched again except for
    /// lookups.
    pub fn new(
        transport: Arc<dyn EdgeTransport>,
        directory: Arc<Directory>,
        settings: PipelineSettings,
        progress: Arc<ScanProgress>,
    ) -> Self {
        Self {
            transport,
            directory,
            settings,
            progress,
        }
    }

    pub fn ranking(&self) -> Ranking {
        self.settings.ranking()
    }

    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Runs both stages and returns the ranked report rows.
    pub async fn run<I>(&self, candidates: I) -> Vec<EdgeRecord>
    where
        I: IntoIterator<Item = SocketAddrV4>,
        I::IntoIter: Send + 'static,
    {
        let survivors = self.probe_stage(candidates).await;

        let mut records: Vec<EdgeRecord> = if self.settings.speed_workers > 0 && !survivors.is_empty() {
            info!("Measuring throughput of {} nodes", survivors.len());
            self.speed_stage(survivors).await
        } else {
            survivors.into_iter().map(EdgeRecord::from).collect()
        };

        rank::rank(&mut records, self.ranking());
        records
    }

    /// Probes every candidate once, at most `concurrency` at a time.
    pub async fn probe_stage<I>(&self, candidates: I) -> Vec<ProbeResult>
    where
        I: IntoIterator<Item = SocketAddrV4>,
        I::IntoIter: Send + 'static,
    {
        let pool = WorkerPool::new(self.settings.concurrency);
        let (jobs, feeder) = pool::feed(candidates, pool.queue_depth());
        let (tx, rx) = mpsc::channel(RESULT_QUEUE_DEPTH);

        let prober = Arc::new(Prober::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.directory),
            self.settings.marker.clone(),
        ));
        let progress = Arc::clone(&self.progress);
        let abandoned = Arc::clone(&self.progress);

        let handler = move |target: SocketAddrV4| {
            let prober = Arc::clone(&prober);
            let progress = Arc::clone(&progress);
            async move {
                let outcome = prober.probe(target).await;
                progress.record_probe(outcome.is_ok());

                match outcome {
                    Ok(result) => {
                        report_survivor(&result);
                        Some(result)
                    }
                    Err(e) if e.is_unreachable() => {
                        debug!("{target} unreachable: {e}");
                        None
                    }
                    Err(e) => {
                        debug!("{target} rejected: {e}");
                        None
                    }
                }
            }
        };
        // A probe that panicked counts as a dropped candidate.
        let recover = move |target: SocketAddrV4| {
            debug!("{target} dropped after a failed probe");
            abandoned.record_probe(false);
            None
        };

        let handle = pool.spawn(jobs, tx, handler, recover);

        let (survivors, ()) = tokio::join!(collect(rx), handle.join());

        match feeder.await {
            Ok(fed) => debug!("Probed {fed} candidates, {} answered as edge nodes", survivors.len()),
            Err(e) => error!("Candidate feeder failed: {e}"),
        }

        survivors
    }

    /// Measures every survivor once with `speed_workers` parallel downloads.
    pub async fn speed_stage(&self, survivors: Vec<ProbeResult>) -> Vec<EdgeRecord> {
        let pool = WorkerPool::new(self.settings.speed_workers);
        let (jobs, feeder) = pool::feed(survivors, pool.queue_depth());
        let (tx, rx) = mpsc::channel(RESULT_QUEUE_DEPTH);

        let tester = Arc::new(SpeedTester::new(Arc::clone(&self.transport)));
        let progress = Arc::clone(&self.progress);
        let abandoned = Arc::clone(&self.progress);

        let handler = move |survivor: ProbeResult| {
            let tester = Arc::clone(&tester);
            let progress = Arc::clone(&progress);
            async move {
                let record = tester.measure(survivor).await;
                progress.record_measurement();
                Some(record)
            }
        };
        // Same as a failed download: the survivor stays, at zero throughput.
        let recover = move |survivor: ProbeResult| {
            abandoned.record_measurement();
            Some(EdgeRecord::measured(survivor, 0.0))
        };

        let handle = pool.spawn(jobs, tx, handler, recover);

        let (records, ()) = tokio::join!(collect(rx), handle.join());

        if let Err(e) = feeder.await {
            error!("Survivor feeder failed: {e}");
        }

        records
    }
}

fn report_survivor(result: &ProbeResult) {
    let latency = result.latency.as_millis();
    match &result.city {
        Some(city) => success!("Found {} in {city} ({}), latency {latency} ms", result.addr.ip(), result.colo),
        None => success!("Found {} at unknown location ({}), latency {latency} ms", result.addr.ip(), result.colo),
    }
}

/// Single owner of a stage's output.
async fn collect<R>(mut rx: mpsc::Receiver<R>) -> Vec<R> {
    let mut out = Vec::new();
    while let Some(item) = rx.recv().await {
        out.push(item);
    }
    out
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
