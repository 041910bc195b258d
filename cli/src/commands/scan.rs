use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use edgescan_common::config::Config;
use edgescan_common::edge::record::EdgeRecord;
use edgescan_common::network::target::TargetList;
use edgescan_common::success;
use edgescan_core::network::transport::HttpTransport;
use edgescan_core::pipeline::{Pipeline, PipelineSettings};
use edgescan_core::progress::ScanProgress;
use edgescan_core::{directory, report};
use tracing::{Instrument, info, info_span, warn};

use crate::terminal::{colors, print, progress};

/// Nodes shown on the terminal; the CSV always has all of them.
const TOP_SHOWN: usize = 10;

pub async fn scan(cfg: &Config) -> anyhow::Result<()> {
    let targets = TargetList::from_path(&cfg.input)
        .with_context(|| format!("reading targets from {}", cfg.input.display()))?;
    if targets.is_empty() {
        warn!("{} contains no usable addresses", cfg.input.display());
    }

    let directory = directory::load(&cfg.locations_path, &cfg.locations_url).await?;
    let transport = HttpTransport::new(cfg)?;

    let total = targets.len();
    info!(
        "Probing {total} candidates on port {} with {} workers",
        cfg.port, cfg.concurrency
    );

    let pipeline = Pipeline::new(
        Arc::new(transport),
        Arc::new(directory),
        PipelineSettings::from(cfg),
        Arc::new(ScanProgress::new(total)),
    );

    let span = info_span!("scan", indicatif.pb_show = true);
    let ticker = progress::start(span.clone(), pipeline.progress(), cfg.speed_test_enabled());

    let start_time: Instant = Instant::now();
    let records: Vec<EdgeRecord> = pipeline
        .run(targets.candidates(cfg.port))
        .instrument(span)
        .await;

    ticker.finish().await;

    scan_ends(&records, start_time.elapsed(), cfg)
}

fn scan_ends(records: &[EdgeRecord], total_time: Duration, cfg: &Config) -> anyhow::Result<()> {
    if records.is_empty() {
        print::header("no valid ip found");
        print::no_results();
        return Ok(());
    }

    let file = File::create(&cfg.output)
        .with_context(|| format!("creating report {}", cfg.output.display()))?;
    let mut out = BufWriter::new(file);
    report::write_report(&mut out, records, cfg.ranking())
        .with_context(|| format!("writing report {}", cfg.output.display()))?;

    print::header("fastest edge nodes");
    for (idx, record) in records.iter().take(TOP_SHOWN).enumerate() {
        print::edge_tree(idx, record);
    }

    print_summary(records.len(), total_time, cfg);
    Ok(())
}

fn print_summary(row_count: usize, total_time: Duration, cfg: &Config) {
    let rows: ColoredString = format!("{row_count} edge nodes").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString = format!("Scan Complete: {rows} found in {total_time}")
        .color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string());
    print::aligned_line("Report", cfg.output.display().to_string().color(colors::PRIMARY));
    print::aligned_line("Ranked by", format!("{:?}", cfg.ranking()).to_lowercase());
    success!("Wrote {row_count} rows to {}", cfg.output.display());
}
