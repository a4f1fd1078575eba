use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info};
use ratatui::{backend::Backend, Terminal};

use crate::api::models::{ModelInfo, ModelsResponse};
use crate::config::Config;
use crate::fetch::{ApiCall, FetchRequest, FetchResponse, Fetcher, Payload, Slot};
use crate::pages::legacy::LegacyPage;
use crate::pages::Page;
use crate::query::Query;
use crate::route::Location;
use crate::ui;

/// The model list is shared by every page and refetched on mount once it
/// is this old.
const MODELS_STALE_SECS: i64 = 60;

/// Upper bound on how long the loop waits for a key, so responses are
/// drawn promptly.
const FRAME_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum View {
    Routed(Page),
    Legacy(LegacyPage),
}

#[derive(Debug)]
pub struct App {
    config: Config,
    models: Query<(), ModelsResponse>,
    view: View,
    /// Bumped whenever the page is replaced; responses from an older
    /// generation belong to a torn-down page.
    generation: u64,
    prompt: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn routed(config: Config, location: Location) -> Self {
        let page = Page::from_location(location, config.top_n);
        Self::with_view(config, View::Routed(page))
    }

    pub fn legacy(config: Config) -> Self {
        Self::with_view(config, View::Legacy(LegacyPage::new()))
    }

    fn with_view(config: Config, view: View) -> Self {
        Self {
            config,
            models: Query::new(),
            view,
            generation: 0,
            prompt: None,
            should_quit: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn models(&self) -> &[ModelInfo] {
        self.models
            .data()
            .map(|m| m.models.as_slice())
            .unwrap_or(&[])
    }

    pub fn models_query(&self) -> &Query<(), ModelsResponse> {
        &self.models
    }

    /// Current address; `None` for the legacy dashboard.
    pub fn location(&self) -> Option<Location> {
        match &self.view {
            View::Routed(page) => Some(page.location()),
            View::Legacy(_) => None,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Mounts the first page.
    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<FetchRequest> {
        self.mount(now)
    }

    fn mount(&mut self, now: DateTime<Utc>) -> Vec<FetchRequest> {
        let requests = match &mut self.view {
            View::Legacy(page) => page.mount(),
            View::Routed(page) => {
                let models = self
                    .models
                    .data()
                    .map(|m| m.models.as_slice())
                    .unwrap_or(&[]);
                let mut requests = page.mount(models);
                let stale = self
                    .models
                    .is_stale(now, chrono::Duration::seconds(MODELS_STALE_SECS));
                if stale && !self.models.is_fetching() {
                    let epoch = self.models.request(());
                    requests.push(FetchRequest::new(Slot::Models, epoch, ApiCall::Models));
                }
                requests
            }
        };
        self.stamp(requests)
    }

    fn stamp(&self, mut requests: Vec<FetchRequest>) -> Vec<FetchRequest> {
        for request in &mut requests {
            request.page = self.generation;
        }
        requests
    }

    /// Replaces the page unless only the model differs, which is a model
    /// switch on the mounted page.
    pub fn navigate(&mut self, location: Location, now: DateTime<Utc>) -> Vec<FetchRequest> {
        let View::Routed(page) = &mut self.view else {
            return Vec::new();
        };
        let current = page.location();
        if current.route == location.route {
            return match location.model.as_deref() {
                Some(model_id) => {
                    let requests = page.select_model(model_id);
                    self.stamp(requests)
                }
                None => Vec::new(),
            };
        }
        info!("navigate {current} -> {location}");
        self.generation += 1;
        self.view = View::Routed(Page::from_location(location, self.config.top_n));
        self.mount(now)
    }

    pub fn tick(&mut self) -> Vec<FetchRequest> {
        let requests = match &mut self.view {
            View::Routed(page) => page.tick(),
            View::Legacy(_) => Vec::new(),
        };
        self.stamp(requests)
    }

    /// Refetches now; a model list that never loaded is requested again.
    fn refresh(&mut self) -> Vec<FetchRequest> {
        let mut requests = self.tick();
        let failed = self.models.data().is_none() && self.models.error().is_some();
        if failed && !self.models.is_fetching() {
            let epoch = self.models.request(());
            requests.push(FetchRequest::new(Slot::Models, epoch, ApiCall::Models));
        }
        requests
    }

    pub fn on_response(&mut self, response: FetchResponse, now: DateTime<Utc>) -> Vec<FetchRequest> {
        if response.slot == Slot::Models {
            return self.on_models(response, now);
        }
        if response.page != self.generation {
            debug!(
                "dropping {:?} response for torn-down page {}",
                response.slot, response.page
            );
            return Vec::new();
        }
        match &mut self.view {
            View::Routed(page) => page.on_response(response, now),
            View::Legacy(page) => page.on_response(response, now),
        }
        Vec::new()
    }

    fn on_models(&mut self, response: FetchResponse, now: DateTime<Utc>) -> Vec<FetchRequest> {
        let result = match response.result {
            Ok(Payload::Models(models)) => Ok(models),
            Ok(other) => Err(format!("unexpected payload {other:?}")),
            Err(err) => Err(err.to_string()),
        };
        if !self.models.settle(response.epoch, result, now) {
            return Vec::new();
        }
        let View::Routed(page) = &mut self.view else {
            return Vec::new();
        };
        let models = self
            .models
            .data()
            .map(|m| m.models.as_slice())
            .unwrap_or(&[]);
        let requests = page.on_models(models);
        self.stamp(requests)
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Utc>) -> Vec<FetchRequest> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }
        if self.prompt.is_some() {
            return self.handle_prompt_key(key, now);
        }
        if matches!(self.view, View::Legacy(_)) {
            self.handle_legacy_key(key)
        } else {
            self.handle_routed_key(key, now)
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, now: DateTime<Utc>) -> Vec<FetchRequest> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char(c) => prompt.push(c),
            KeyCode::Backspace => {
                prompt.pop();
            }
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => {
                let address = self.prompt.take().unwrap_or_default();
                return self.navigate(Location::parse(&address), now);
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_routed_key(&mut self, key: KeyEvent, now: DateTime<Utc>) -> Vec<FetchRequest> {
        let View::Routed(page) = &mut self.view else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') | KeyCode::Esc | KeyCode::Backspace => {
                return self.navigate(Location::dashboard(), now)
            }
            KeyCode::Char('2') => return self.navigate(Location::compare(), now),
            KeyCode::Char(':') => {
                self.prompt = Some(page.location().to_string());
            }
            KeyCode::Char('m') => return self.cycle_model(1),
            KeyCode::Char('M') => return self.cycle_model(-1),
            KeyCode::Up | KeyCode::Char('k') => page.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => page.select_next(),
            KeyCode::Enter => {
                if let Some(location) = page.open_selected() {
                    return self.navigate(location, now);
                }
            }
            KeyCode::Char('v') => {
                if let Page::Dashboard(dashboard) = page {
                    if let Some(location) = dashboard.quick_view() {
                        return self.navigate(location, now);
                    }
                }
            }
            KeyCode::Char('r') => return self.refresh(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_legacy_key(&mut self, key: KeyEvent) -> Vec<FetchRequest> {
        let View::Legacy(page) = &mut self.view else {
            return Vec::new();
        };
        let requests = match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('p') => vec![page.get_predictions()],
            KeyCode::Char('s') => page.get_satellite().into_iter().collect(),
            KeyCode::Char('l') => vec![page.load_stations()],
            KeyCode::Up | KeyCode::Char('k') => {
                page.select_previous();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                page.select_next();
                Vec::new()
            }
            _ => Vec::new(),
        };
        self.stamp(requests)
    }

    /// Steps through the model list; an unknown selection starts at the
    /// first model.
    fn cycle_model(&mut self, step: isize) -> Vec<FetchRequest> {
        let View::Routed(page) = &mut self.view else {
            return Vec::new();
        };
        let models = self
            .models
            .data()
            .map(|m| m.models.as_slice())
            .unwrap_or(&[]);
        if models.is_empty() {
            return Vec::new();
        }
        let next = match page
            .selected_model()
            .and_then(|id| models.iter().position(|m| m.model_id == id))
        {
            Some(index) => index
                .checked_add_signed(step)
                .unwrap_or(models.len() - 1)
                % models.len(),
            None => 0,
        };
        let model_id = models[next].model_id.clone();
        let requests = page.select_model(&model_id);
        self.stamp(requests)
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    fetcher: &Fetcher,
    responses: &Receiver<FetchResponse>,
) -> io::Result<()> {
    fetcher.dispatch_all(app.start(Utc::now()));
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let until_tick = app.config().poll_interval.saturating_sub(last_tick.elapsed());
        if event::poll(until_tick.min(FRAME_WAIT))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    fetcher.dispatch_all(app.handle_key(key, Utc::now()));
                }
            }
        }

        while let Ok(response) = responses.try_recv() {
            fetcher.dispatch_all(app.on_response(response, Utc::now()));
        }

        if app.should_quit() {
            return Ok(());
        }

        if last_tick.elapsed() >= app.config().poll_interval {
            last_tick = Instant::now();
            fetcher.dispatch_all(app.tick());
        }
    }
}
