use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::{error::Error, io};

mod api;
mod app;
mod cli;
mod config;
mod error;
mod fetch;
mod geo;
mod headless;
mod pages;
mod query;
mod risk;
mod route;
mod ui;
mod units;

use crate::api::ApiClient;
use crate::app::{run_app, App};
use crate::cli::{Args, Command};
use crate::config::Config;
use crate::fetch::Fetcher;
use crate::route::Location;

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        builder.target(Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

fn run_tui(app: &mut App, client: ApiClient) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    let fetcher = Fetcher::new(Arc::new(client), tx);

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let res = run_app(&mut terminal, app, &fetcher, &rx);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // .env must be loaded before clap reads RINCON_API_BASE_URL
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = Config::from_args(&args);
    let client = ApiClient::new(&config.api_base_url)?;
    log::info!("using API at {}", client.base_url());

    match args.command() {
        Command::Top { n, model, json } => {
            headless::print_top(&client, n, model.as_deref(), json, &mut io::stdout().lock())
        }
        Command::Legacy => run_tui(&mut App::legacy(config), client),
        Command::Dashboard { route } => {
            let location = route
                .as_deref()
                .map_or_else(Location::dashboard, Location::parse);
            run_tui(&mut App::routed(config, location), client)
        }
    }
}
