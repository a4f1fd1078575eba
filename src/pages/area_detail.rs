use chrono::{DateTime, Utc};

use crate::api::areas::{PredictionLatest, SatelliteLatest, WeatherLatest};
use crate::api::models::ModelInfo;
use crate::fetch::{ApiCall, FetchRequest, FetchResponse, Payload, Slot};
use crate::query::Query;
use crate::route::Location;

/// Latest weather, prediction and satellite image of one area. Weather and
/// satellite are keyed on the area only, the prediction on (area, model).
#[derive(Debug)]
pub struct AreaDetailPage {
    area_id: String,
    selected_model: Option<String>,
    weather: Query<String, WeatherLatest>,
    prediction: Query<(String, String), PredictionLatest>,
    satellite: Query<String, SatelliteLatest>,
}

impl AreaDetailPage {
    pub fn new(area_id: &str, model: Option<String>) -> Self {
        Self {
            area_id: area_id.to_string(),
            selected_model: model.filter(|m| !m.is_empty()),
            weather: Query::new(),
            prediction: Query::new(),
            satellite: Query::new(),
        }
    }

    pub fn area_id(&self) -> &str {
        &self.area_id
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn location(&self) -> Location {
        Location::area(&self.area_id, self.selected_model())
    }

    pub fn weather(&self) -> &Query<String, WeatherLatest> {
        &self.weather
    }

    pub fn prediction(&self) -> &Query<(String, String), PredictionLatest> {
        &self.prediction
    }

    pub fn satellite(&self) -> &Query<String, SatelliteLatest> {
        &self.satellite
    }

    pub fn mount(&mut self, models: &[ModelInfo]) -> Vec<FetchRequest> {
        super::adopt_first_model(&mut self.selected_model, models);
        let mut requests = Vec::new();
        requests.extend(self.request_weather());
        requests.extend(self.request_prediction());
        requests.extend(self.request_satellite());
        requests
    }

    pub fn on_models(&mut self, models: &[ModelInfo]) -> Vec<FetchRequest> {
        if super::adopt_first_model(&mut self.selected_model, models) {
            self.request_prediction().into_iter().collect()
        } else {
            Vec::new()
        }
    }

    /// Only the prediction depends on the model, so a switch costs exactly
    /// one request.
    pub fn select_model(&mut self, model_id: &str) -> Vec<FetchRequest> {
        if model_id.is_empty() || self.selected_model.as_deref() == Some(model_id) {
            return Vec::new();
        }
        self.selected_model = Some(model_id.to_string());
        self.request_prediction().into_iter().collect()
    }

    pub fn tick(&mut self) -> Vec<FetchRequest> {
        let mut requests = Vec::new();
        if !self.weather.is_fetching() {
            requests.extend(self.request_weather());
        }
        if !self.prediction.is_fetching() {
            requests.extend(self.request_prediction());
        }
        if !self.satellite.is_fetching() {
            requests.extend(self.request_satellite());
        }
        requests
    }

    fn request_weather(&mut self) -> Option<FetchRequest> {
        if self.area_id.is_empty() {
            return None;
        }
        let epoch = self.weather.request(self.area_id.clone());
        Some(FetchRequest::new(
            Slot::Weather,
            epoch,
            ApiCall::Weather {
                area_id: self.area_id.clone(),
            },
        ))
    }

    fn request_prediction(&mut self) -> Option<FetchRequest> {
        if self.area_id.is_empty() {
            return None;
        }
        let model_id = self.selected_model.clone()?;
        let epoch = self
            .prediction
            .request((self.area_id.clone(), model_id.clone()));
        Some(FetchRequest::new(
            Slot::Prediction,
            epoch,
            ApiCall::Prediction {
                area_id: self.area_id.clone(),
                model_id: Some(model_id),
            },
        ))
    }

    fn request_satellite(&mut self) -> Option<FetchRequest> {
        if self.area_id.is_empty() {
            return None;
        }
        let epoch = self.satellite.request(self.area_id.clone());
        Some(FetchRequest::new(
            Slot::Satellite,
            epoch,
            ApiCall::Satellite {
                area_id: self.area_id.clone(),
            },
        ))
    }

    pub fn on_response(&mut self, response: FetchResponse, now: DateTime<Utc>) {
        let epoch = response.epoch;
        match (response.slot, response.result) {
            (Slot::Weather, Ok(Payload::Weather(weather))) => {
                self.weather.settle(epoch, Ok(weather), now);
            }
            (Slot::Weather, Err(err)) => {
                self.weather.settle(epoch, Err(err.to_string()), now);
            }
            (Slot::Prediction, Ok(Payload::Prediction(prediction))) => {
                self.prediction.settle(epoch, Ok(prediction), now);
            }
            (Slot::Prediction, Err(err)) => {
                self.prediction.settle(epoch, Err(err.to_string()), now);
            }
            (Slot::Satellite, Ok(Payload::Satellite(satellite))) => {
                self.satellite.settle(epoch, Ok(satellite), now);
            }
            (Slot::Satellite, Err(err)) => {
                self.satellite.settle(epoch, Err(err.to_string()), now);
            }
            (slot, _) => log::warn!("area detail ignored a {slot:?} response"),
        }
    }
}
