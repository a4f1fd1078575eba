use chrono::{DateTime, Utc};

use crate::api::fire_areas::{TopItem, TopResponse};
use crate::api::models::ModelInfo;
use crate::fetch::{ApiCall, FetchRequest, FetchResponse, Payload, Slot};
use crate::geo::MapView;
use crate::query::{Query, Status};
use crate::route::{Location, Route};

pub const MAP_EMPTY_MESSAGE: &str = "No predictions are available yet for the selected model. \
The worker may still be ingesting weather data.";
pub const TABLE_EMPTY_MESSAGE: &str =
    "No ranked fire areas yet. Check worker logs for prediction generation and storage events.";

/// Top-N areas for the selected model, polled.
#[derive(Debug)]
pub struct DashboardPage {
    selected_model: Option<String>,
    top_n: usize,
    areas: Query<String, TopResponse>,
    pub selected_row: usize,
    pub map: MapView,
}

impl DashboardPage {
    pub fn new(model: Option<String>, top_n: usize) -> Self {
        Self {
            selected_model: model.filter(|m| !m.is_empty()),
            top_n,
            areas: Query::new(),
            selected_row: 0,
            map: MapView::default(),
        }
    }

    pub fn location(&self) -> Location {
        Location {
            route: Route::Dashboard,
            model: self.selected_model.clone(),
        }
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn areas(&self) -> &Query<String, TopResponse> {
        &self.areas
    }

    pub fn items(&self) -> &[TopItem] {
        self.areas
            .data()
            .map(|top| top.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn mount(&mut self, models: &[ModelInfo]) -> Vec<FetchRequest> {
        super::adopt_first_model(&mut self.selected_model, models);
        self.request_areas().into_iter().collect()
    }

    /// The model list arrived. Picks the first model when the URL named
    /// none.
    pub fn on_models(&mut self, models: &[ModelInfo]) -> Vec<FetchRequest> {
        if super::adopt_first_model(&mut self.selected_model, models) {
            self.request_areas().into_iter().collect()
        } else {
            Vec::new()
        }
    }

    pub fn select_model(&mut self, model_id: &str) -> Vec<FetchRequest> {
        if model_id.is_empty() || self.selected_model.as_deref() == Some(model_id) {
            return Vec::new();
        }
        self.selected_model = Some(model_id.to_string());
        self.selected_row = 0;
        self.request_areas().into_iter().collect()
    }

    pub fn tick(&mut self) -> Vec<FetchRequest> {
        if self.areas.is_fetching() {
            return Vec::new();
        }
        self.request_areas().into_iter().collect()
    }

    fn request_areas(&mut self) -> Option<FetchRequest> {
        let model_id = self.selected_model.clone()?;
        let epoch = self.areas.request(model_id.clone());
        Some(FetchRequest::new(
            Slot::TopAreas,
            epoch,
            ApiCall::TopAreas {
                n: self.top_n,
                model_id: Some(model_id),
            },
        ))
    }

    pub fn on_response(&mut self, response: FetchResponse, now: DateTime<Utc>) {
        if response.slot != Slot::TopAreas {
            return;
        }
        let result = match response.result {
            Ok(Payload::TopAreas(top)) => Ok(top),
            Ok(other) => Err(format!("unexpected payload {other:?}")),
            Err(err) => Err(err.to_string()),
        };
        if self.areas.settle(response.epoch, result, now) {
            let points: Vec<(f64, f64)> = self.items().iter().map(|i| (i.lat, i.lon)).collect();
            self.map.sync(&points);
            self.selected_row = self.selected_row.min(self.items().len().saturating_sub(1));
        }
    }

    pub fn status(&self) -> Status {
        self.areas.status(|top| top.items.is_empty())
    }

    /// The empty-state message only shows for a selected model whose
    /// ranking settled with zero rows.
    pub fn show_empty_state(&self) -> bool {
        self.selected_model.is_some() && self.status() == Status::Empty
    }

    pub fn is_loading(&self) -> bool {
        self.areas.is_loading() && self.items().is_empty()
    }

    pub fn select_next(&mut self) {
        if self.selected_row + 1 < self.items().len() {
            self.selected_row += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn open_selected(&self) -> Option<Location> {
        let item = self.items().get(self.selected_row)?;
        Some(Location::area(&item.area_id, self.selected_model()))
    }

    /// Detail page of the highest-ranked area.
    pub fn quick_view(&self) -> Option<Location> {
        let item = self.items().first()?;
        Some(Location::area(&item.area_id, self.selected_model()))
    }
}
