use colored::*;
use edgescan_common::log::SUCCESS_TARGET;
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::terminal::progress;

/// Events under this target are printed verbatim, without a status symbol.
pub const PRINT_TARGET: &str = "edgescan::print";

pub struct EdgeFormatter;

impl<S, N> FormatEvent<S, N> for EdgeFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() != PRINT_TARGET {
            let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
                match (*meta.level(), meta.target()) {
                    (Level::INFO, SUCCESS_TARGET) => ("[+]", |s| s.green().bold()),
                    (Level::TRACE, _) => ("[ ]", |s| s.dimmed()),
                    (Level::DEBUG, _) => ("[?]", |s| s.blue()),
                    (Level::INFO, _) => ("[*]", |s| s.cyan().bold()),
                    (Level::WARN, _) => ("[!]", |s| s.yellow().bold()),
                    _ => ("[-]", |s| s.red().bold()),
                };

            write!(writer, "{} ", color_func(symbol.into()))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Installs the global subscriber. `verbosity` is the number of `-v` flags;
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let indicatif_layer = IndicatifLayer::new().with_progress_style(progress::style()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(EdgeFormatter)
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .try_init()?;

    Ok(())
}
