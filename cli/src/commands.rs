pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::TypedValueParser;
use clap::{ArgAction, Parser};
use edgescan_common::config::{self, Config};

#[derive(Parser, Debug)]
#[command(name = "edgescan")]
#[command(version, about = "Find the fastest CDN edge nodes among a list of IP ranges.")]
pub struct CommandLine {
    /// File with one IPv4 address or CIDR block per line
    #[arg(short = 'f', long = "file", default_value = config::DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Where to write the CSV report
    #[arg(short = 'o', long = "outfile", default_value = config::DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Port to probe on every address
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// Maximum number of probes in flight
    #[arg(short = 'm', long = "max", default_value_t = config::DEFAULT_CONCURRENCY,
          value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    pub concurrency: usize,

    /// Parallel throughput tests, 0 disables them
    #[arg(short = 's', long = "speedtest", default_value_t = config::DEFAULT_SPEED_WORKERS)]
    pub speed_workers: usize,

    /// File downloaded by each throughput test
    #[arg(short = 'u', long = "url", default_value = config::DEFAULT_SPEED_URL)]
    pub speed_url: String,

    /// Trace document requested by each probe
    #[arg(long, default_value = config::DEFAULT_TRACE_URL)]
    pub trace_url: String,

    /// TCP connect timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = millis(config::DEFAULT_CONNECT_TIMEOUT))]
    pub connect_timeout: u64,

    /// Trace request timeout in milliseconds, after connect
    #[arg(long, value_name = "MS", default_value_t = millis(config::DEFAULT_REQUEST_TIMEOUT))]
    pub request_timeout: u64,

    /// Throughput test duration limit in milliseconds, after connect
    #[arg(long, value_name = "MS", default_value_t = millis(config::DEFAULT_DOWNLOAD_TIMEOUT))]
    pub download_timeout: u64,

    /// Local cache of the datacenter directory
    #[arg(long = "locations", default_value = config::DEFAULT_LOCATIONS_PATH)]
    pub locations_path: PathBuf,

    /// Where to fetch the datacenter directory when no cache exists
    #[arg(long, default_value = config::DEFAULT_LOCATIONS_URL)]
    pub locations_url: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        Config {
            input: self.input.clone(),
            output: self.output.clone(),
            port: self.port,
            concurrency: self.concurrency,
            speed_workers: self.speed_workers,
            speed_url: self.speed_url.clone(),
            trace_url: self.trace_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout),
            request_timeout: Duration::from_millis(self.request_timeout),
            download_timeout: Duration::from_millis(self.download_timeout),
            locations_path: self.locations_path.clone(),
            locations_url: self.locations_url.clone(),
        }
    }
}
