use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "ip.txt";
pub const DEFAULT_OUTPUT: &str = "ip.csv";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_SPEED_WORKERS: usize = 5;
pub const DEFAULT_TRACE_URL: &str = "https://speed.cloudflare.com/cdn-cgi/trace";
pub const DEFAULT_SPEED_URL: &str =
    "https://archlinux.cloudflaremirrors.com/archlinux/iso/latest/archlinux-x86_64.iso";
pub const DEFAULT_LOCATIONS_PATH: &str = "locations.json";
pub const DEFAULT_LOCATIONS_URL: &str = "https://speed.cloudflare.com/locations";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Sent with every request; the trace endpoint echoes it back as `uag=...`.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Run configuration. Built once in `main` and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub port: u16,
    /// Maximum number of identity probes in flight.
    pub concurrency: usize,
    /// Throughput workers. Zero disables the throughput stage.
    pub speed_workers: usize,
    pub speed_url: String,
    pub trace_url: String,
    pub connect_timeout: Duration,
    /// Bounds TLS handshake + trace request + response, after connect.
    pub request_timeout: Duration,
    /// Bounds one throughput exchange, after connect.
    pub download_timeout: Duration,
    pub locations_path: PathBuf,
    pub locations_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            port: DEFAULT_PORT,
            concurrency: DEFAULT_CONCURRENCY,
            speed_workers: DEFAULT_SPEED_WORKERS,
            speed_url: DEFAULT_SPEED_URL.to_string(),
            trace_url: DEFAULT_TRACE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            locations_path: PathBuf::from(DEFAULT_LOCATIONS_PATH),
            locations_url: DEFAULT_LOCATIONS_URL.to_string(),
        }
    }
}

impl Config {
    pub fn speed_test_enabled(&self) -> bool {
        self.speed_workers > 0
    }

    pub fn ranking(&self) -> Ranking {
        Ranking::for_speed_workers(self.speed_workers)
    }

    /// The token the trace body must contain for a response to count.
    pub fn identity_marker(&self) -> String {
        format!("uag={USER_AGENT}")
    }
}

/// Which key orders the final report. Also decides the report's column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Handshake latency, ascending.
    Latency,
    /// Measured throughput, descending.
    Throughput,
}

impl Ranking {
    /// Any speed worker at all switches the report to throughput order.
    pub fn for_speed_workers(speed_workers: usize) -> Self {
        if speed_workers > 0 {
            Ranking::Throughput
        } else {
            Ranking::Latency
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
