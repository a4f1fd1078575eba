use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::{Parser, Subcommand};

use crate::api::DEFAULT_TOP_N;

const ABOUT: &str = "Wildfire risk TUI";

const LONG_ABOUT: &str = "
TUI for monitoring wildfire risk predictions served by the Rincon Fire API.

The dashboard ranks the riskiest areas for a prediction model, plots them on a map and compares
models side by side. Area pages show the latest weather, prediction and satellite capture.

The API base URL is taken from --api-url, else RINCON_API_BASE_URL (a .env file in the working
directory is read), else http://localhost:8000.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(
        long,
        global = true,
        env = "RINCON_API_BASE_URL",
        value_name = "URL",
        help = "Base URL of the risk API (e.g. http://localhost:8000)"
    )]
    pub api_url: Option<String>,

    #[arg(
        long,
        global = true,
        default_value_t = 10,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between refreshes"
    )]
    pub interval: u64,

    #[arg(long, global = true, help = "Show weather in imperial units")]
    pub imperial: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Write logs to a file instead of stderr"
    )]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Routed dashboard (default)
    Dashboard {
        #[arg(help = "Initial route, e.g. /compare or /areas/KSLC?model=rf")]
        route: Option<String>,
    },
    /// Single-page station dashboard
    Legacy,
    /// Print the top ranked areas once and exit
    Top {
        #[arg(long, default_value_t = DEFAULT_TOP_N, help = "Number of areas")]
        n: usize,
        #[arg(long, value_name = "ID", help = "Prediction model (first listed when omitted)")]
        model: Option<String>,
        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },
}

impl Args {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Dashboard { route: None })
    }
}
