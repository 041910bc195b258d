mod commands;
mod terminal;

use commands::{CommandLine, scan};
use edgescan_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose)?;
    print::banner();

    let cfg: Config = commands.to_config();

    print::header("starting scan");
    let result = scan::scan(&cfg).await;
    print::end_of_program();
    result
}
