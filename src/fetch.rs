use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use log::{debug, warn};
use serde_json::Value;

use crate::api::areas::{PredictionLatest, SatelliteLatest, WeatherLatest};
use crate::api::fire_areas::{CompareResponse, TopResponse};
use crate::api::legacy::{PredictWeatherResponse, SatelliteImageRequest};
use crate::api::models::ModelsResponse;
use crate::api::RiskApi;
use crate::error::ApiError;

/// Which piece of page state a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Models,
    TopAreas,
    Compare,
    Weather,
    Prediction,
    Satellite,
    LegacyPredictions,
    LegacySatellite,
    LegacyStations,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Models,
    TopAreas { n: usize, model_id: Option<String> },
    Compare { n: usize },
    Weather { area_id: String },
    Prediction { area_id: String, model_id: Option<String> },
    Satellite { area_id: String },
    Stations,
    PredictWeather { n_stations: usize },
    SatelliteImage { request: SatelliteImageRequest },
}

#[derive(Debug)]
pub enum Payload {
    Models(ModelsResponse),
    TopAreas(TopResponse),
    Compare(CompareResponse),
    Weather(WeatherLatest),
    Prediction(PredictionLatest),
    Satellite(SatelliteLatest),
    Stations(Vec<Value>),
    Predictions(PredictWeatherResponse),
    SatelliteImage { url: String },
}

/// A call tagged with everything needed to route its answer back: the
/// page generation it was issued under, the slot and the query epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub page: u64,
    pub slot: Slot,
    pub epoch: u64,
    pub call: ApiCall,
}

impl FetchRequest {
    pub fn new(slot: Slot, epoch: u64, call: ApiCall) -> Self {
        Self {
            page: 0,
            slot,
            epoch,
            call,
        }
    }
}

#[derive(Debug)]
pub struct FetchResponse {
    pub page: u64,
    pub slot: Slot,
    pub epoch: u64,
    pub result: Result<Payload, ApiError>,
}

pub fn execute(api: &dyn RiskApi, call: &ApiCall) -> Result<Payload, ApiError> {
    Ok(match call {
        ApiCall::Models => Payload::Models(api.models()?),
        ApiCall::TopAreas { n, model_id } => {
            Payload::TopAreas(api.top_fire_areas(*n, model_id.as_deref())?)
        }
        ApiCall::Compare { n } => Payload::Compare(api.compare_fire_areas(*n)?),
        ApiCall::Weather { area_id } => Payload::Weather(api.latest_weather(area_id)?),
        ApiCall::Prediction { area_id, model_id } => {
            Payload::Prediction(api.latest_prediction(area_id, model_id.as_deref())?)
        }
        ApiCall::Satellite { area_id } => Payload::Satellite(api.latest_satellite(area_id)?),
        ApiCall::Stations => Payload::Stations(api.stations()?),
        ApiCall::PredictWeather { n_stations } => {
            Payload::Predictions(api.predict_weather(*n_stations)?)
        }
        ApiCall::SatelliteImage { request } => {
            let response = api.request_satellite_image(request)?;
            if let Some(path) = &response.path {
                debug!("satellite image stored at {path}");
            }
            Payload::SatelliteImage {
                url: api.satellite_image_url(&response.filename),
            }
        }
    })
}

/// Answer for a request whose thread never started, so its query settles
/// and the next tick can retry it.
fn not_started(page: u64, slot: Slot, epoch: u64, err: std::io::Error) -> FetchResponse {
    FetchResponse {
        page,
        slot,
        epoch,
        result: Err(ApiError::Worker(err)),
    }
}

/// Runs each request on its own thread and posts the answer to the event
/// loop. Requests are never aborted; the receiver drops what it no longer
/// wants.
pub struct Fetcher {
    api: Arc<dyn RiskApi>,
    tx: Sender<FetchResponse>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn RiskApi>, tx: Sender<FetchResponse>) -> Self {
        Self { api, tx }
    }

    pub fn dispatch(&self, request: FetchRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let name = format!("fetch-{:?}", request.slot).to_lowercase();
        debug!("dispatch {:?} epoch {} page {}", request.call, request.epoch, request.page);
        let (page, slot, epoch) = (request.page, request.slot, request.epoch);
        let spawned = thread::Builder::new().name(name).spawn(move || {
            let result = execute(api.as_ref(), &request.call);
            if let Err(err) = &result {
                warn!("{:?} failed: {err}", request.call);
            }
            let response = FetchResponse {
                page: request.page,
                slot: request.slot,
                epoch: request.epoch,
                result,
            };
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(response);
        });
        if let Err(err) = spawned {
            warn!("could not start fetch thread: {err}");
            let _ = self.tx.send(not_started(page, slot, epoch, err));
        }
    }

    pub fn dispatch_all(&self, requests: impl IntoIterator<Item = FetchRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }
}
