//! Progress display for a running scan.
//!
//! The scan runs inside a span that `tracing-indicatif` renders as a progress
//! bar. A single ticker task polls the shared [`ScanProgress`] counters and
//! updates that bar; workers never touch the terminal.

use std::sync::Arc;
use std::time::Duration;

use colored::*;
use edgescan_core::progress::{ProgressSnapshot, ScanProgress};
use indicatif::ProgressStyle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICK: Duration = Duration::from_millis(100);

pub fn style() -> anyhow::Result<ProgressStyle> {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg} {wide_bar:.green/black} {pos}/{len}")?
        .progress_chars("━╸─")
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);
    Ok(style)
}

/// Stops the ticker when dropped or explicitly finished.
pub struct Ticker {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    pub async fn finish(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

/// `measuring` switches the bar to the throughput stage once probing is done.
pub fn start(span: Span, progress: Arc<ScanProgress>, measuring: bool) -> Ticker {
    let (stop, mut stopped) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        loop {
            tokio::select! {
                _ = interval.tick() => render(&span, progress.snapshot(), measuring),
                _ = stopped.changed() => break,
            }
        }
        render(&span, progress.snapshot(), measuring);
    });

    Ticker { stop, handle }
}

fn render(span: &Span, snap: ProgressSnapshot, measuring: bool) {
    if !measuring || snap.completed < snap.total || snap.found == 0 {
        span.pb_set_length(snap.total);
        span.pb_set_position(snap.completed);
        span.pb_set_message(&probing_message(&snap));
    } else {
        span.pb_set_length(snap.found);
        span.pb_set_position(snap.measured);
        span.pb_set_message(&format!("{}", "Measuring throughput".color(colors::TEXT_DEFAULT)));
    }
}

fn probing_message(snap: &ProgressSnapshot) -> String {
    format!(
        "Probing {} found {}",
        format!("{:>5.1}%", snap.percentage()).color(colors::ACCENT),
        snap.found.to_string().green().bold()
    )
}
