use std::cmp::Ordering;

use edgescan_common::config::Ranking;
use edgescan_common::edge::record::EdgeRecord;

/// Orders the report in place.
///
/// * [`Ranking::Latency`]: fastest handshake first.
/// * [`Ranking::Throughput`]: fastest download first; failed measurements
///   (zero) end up last.
///
/// Equal keys fall back to address, then port, so the output is reproducible.
pub fn rank(records: &mut [EdgeRecord], ranking: Ranking) {
    match ranking {
        Ranking::Latency => records.sort_by(|a, b| {
            a.probe
                .latency
                .cmp(&b.probe.latency)
                .then_with(|| by_address(a, b))
        }),
        Ranking::Throughput => records.sort_by(|a, b| {
            throughput(b)
                .total_cmp(&throughput(a))
                .then_with(|| by_address(a, b))
        }),
    }
}

fn throughput(record: &EdgeRecord) -> f64 {
    record.throughput.unwrap_or(0.0)
}

fn by_address(a: &EdgeRecord, b: &EdgeRecord) -> Ordering {
    a.probe
        .ip()
        .cmp(&b.probe.ip())
        .then_with(|| a.probe.port().cmp(&b.probe.port()))
}
