//! CSV report writer.
//!
//! Fields are quoted only when they need it. Lines end with `\n`.

use std::io::Write;

use csv::Writer;
use edgescan_common::config::Ranking;
use edgescan_common::edge::record::EdgeRecord;

pub const HEADER: [&str; 6] = ["IP Address", "Port", "Datacenter", "Region", "City", "Latency"];
pub const THROUGHPUT_HEADER: &str = "Download Speed";

/// Writes the header and one row per record, in the given order. The
/// throughput column is present only for [`Ranking::Throughput`].
pub fn write_report<W: Write>(out: W, records: &[EdgeRecord], ranking: Ranking) -> csv::Result<()> {
    let with_speed = ranking == Ranking::Throughput;
    let mut wtr = Writer::from_writer(out);

    if with_speed {
        wtr.write_record(HEADER.into_iter().chain([THROUGHPUT_HEADER]))?;
    } else {
        wtr.write_record(HEADER)?;
    }

    for record in records {
        wtr.write_record(row(record, with_speed))?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn row(record: &EdgeRecord, with_speed: bool) -> Vec<String> {
    let probe = &record.probe;
    let mut fields = vec![
        probe.ip().to_string(),
        probe.port().to_string(),
        probe.colo.clone(),
        probe.region.clone().unwrap_or_default(),
        probe.city.clone().unwrap_or_default(),
        probe.latency_label(),
    ];

    if with_speed {
        fields.push(
            record
                .throughput_label()
                .unwrap_or_else(|| "0 kB/s".to_string()),
        );
    }

    fields
}
