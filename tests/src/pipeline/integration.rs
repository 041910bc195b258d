use std::io::Cursor;
use std::sync::Arc;

use edgescan_common::config::Ranking;
use edgescan_common::edge::record::EdgeRecord;
use edgescan_common::network::target::TargetList;
use edgescan_core::pipeline::{Pipeline, PipelineSettings};
use edgescan_core::progress::ScanProgress;
use edgescan_core::report;

use crate::support::{self, Edge, MockTransport};

fn pipeline(transport: MockTransport, targets: &TargetList, speed_workers: usize) -> Pipeline {
    Pipeline::new(
        Arc::new(transport),
        Arc::new(support::directory()),
        PipelineSettings {
            concurrency: 4,
            speed_workers,
            marker: "uag=Mozilla/5.0".to_string(),
        },
        Arc::new(ScanProgress::new(targets.len())),
    )
}

fn targets(input: &str) -> TargetList {
    TargetList::from_reader(Cursor::new(input)).unwrap()
}

fn render(records: &[EdgeRecord], ranking: Ranking) -> String {
    let mut buf = Vec::new();
    report::write_report(&mut buf, records, ranking).unwrap();
    String::from_utf8(buf).unwrap()
}

fn rows(csv: &str) -> Vec<Vec<&str>> {
    csv.lines().skip(1).map(|line| line.split(',').collect()).collect()
}

/*************************************************************
                         End to end
**************************************************************/

#[tokio::test]
async fn single_edge_in_small_block() {
    let transport = MockTransport::default().with(
        [198, 51, 100, 1],
        Edge { colo: "ABC", latency_ms: 20, kbps: None },
    );
    let targets = targets("198.51.100.0/30\n");
    let pipeline = pipeline(transport, &targets, 0);

    let records = pipeline.run(targets.candidates(443)).await;
    let csv = render(&records, pipeline.ranking());

    assert_eq!(
        csv,
        "IP Address,Port,Datacenter,Region,City,Latency\n198.51.100.1,443,ABC,R1,C1,20 ms\n"
    );

    let progress = pipeline.progress().snapshot();
    assert_eq!(progress.total, 4);
    assert_eq!(progress.completed, 4);
    assert_eq!(progress.found, 1);
}

#[tokio::test]
async fn nothing_answers_nothing_reported() {
    let targets = targets("198.51.100.0/29\n203.0.113.5\n");
    let pipeline = pipeline(MockTransport::default(), &targets, 5);

    let records = pipeline.run(targets.candidates(443)).await;
    assert!(records.is_empty());
    assert_eq!(pipeline.progress().snapshot().completed, 9);
}

#[tokio::test]
async fn duplicate_addresses_are_probed_twice() {
    let transport = MockTransport::default().with(
        [203, 0, 113, 5],
        Edge { colo: "LHR", latency_ms: 8, kbps: None },
    );
    let targets = targets("203.0.113.5\n203.0.113.5/32\n");
    let pipeline = pipeline(transport, &targets, 0);

    let records = pipeline.run(targets.candidates(443)).await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.probe.city.as_deref() == Some("London")));
}

#[tokio::test]
async fn latency_ranking_without_throughput() {
    let transport = MockTransport::default()
        .with([10, 0, 0, 1], Edge { colo: "SJC", latency_ms: 50, kbps: None })
        .with([10, 0, 0, 2], Edge { colo: "LHR", latency_ms: 10, kbps: None })
        .with([10, 0, 0, 3], Edge { colo: "XYZ", latency_ms: 30, kbps: None });
    let targets = targets("# lab block\n10.0.0.0/30\n\nnot-an-ip\n");
    let pipeline = pipeline(transport, &targets, 0);

    let records = pipeline.run(targets.candidates(8443)).await;
    let csv = render(&records, pipeline.ranking());
    let rows = rows(&csv);

    assert_eq!(pipeline.ranking(), Ranking::Latency);
    assert!(rows.iter().all(|row| row.len() == 6));
    assert_eq!(
        rows.iter().map(|row| row[0]).collect::<Vec<_>>(),
        vec!["10.0.0.2", "10.0.0.3", "10.0.0.1"]
    );
    assert_eq!(rows[1], vec!["10.0.0.3", "8443", "XYZ", "", "", "30 ms"]);
}

#[tokio::test]
async fn throughput_ranking_puts_failures_last() {
    let transport = MockTransport::default()
        .with([10, 0, 0, 1], Edge { colo: "SJC", latency_ms: 5, kbps: Some(800) })
        .with([10, 0, 0, 2], Edge { colo: "SJC", latency_ms: 6, kbps: None })
        .with([10, 0, 0, 3], Edge { colo: "LHR", latency_ms: 90, kbps: Some(2500) })
        .with([10, 0, 0, 4], Edge { colo: "LHR", latency_ms: 7, kbps: None });
    let targets = targets("10.0.0.0/29\n");
    let pipeline = pipeline(transport, &targets, 2);

    let records = pipeline.run(targets.candidates(443)).await;
    let csv = render(&records, pipeline.ranking());
    let rows = rows(&csv);

    assert_eq!(pipeline.ranking(), Ranking::Throughput);
    assert!(csv.starts_with("IP Address,Port,Datacenter,Region,City,Latency,Download Speed\n"));
    assert!(rows.iter().all(|row| row.len() == 7));
    assert_eq!(
        rows.iter().map(|row| (row[0], row[6])).collect::<Vec<_>>(),
        vec![
            ("10.0.0.3", "2500 kB/s"),
            ("10.0.0.1", "800 kB/s"),
            ("10.0.0.2", "0 kB/s"),
            ("10.0.0.4", "0 kB/s"),
        ]
    );
    assert_eq!(pipeline.progress().snapshot().measured, 4);
}
