use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;

use crate::api::legacy::SatelliteImageRequest;
use crate::api::timestamp;
use crate::api::LEGACY_STATION_COUNT;
use crate::error::ApiError;
use crate::fetch::{ApiCall, FetchRequest, FetchResponse, Payload, Slot};

pub const NO_COORDINATES_MESSAGE: &str = "Predictions loaded, but no stations had coordinates. \
Ensure /api/v1/predict/weather returns lat/lon (or latitude/longitude) for each result.";
const PREDICTIONS_FAILED: &str = "Failed to load predictions.";
const SATELLITE_FAILED: &str = "Failed to get satellite image.";
const STATIONS_FAILED: &str = "Failed to load stations.";

pub const SATELLITE_ZOOM: u8 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub latest_observed_at: Option<DateTime<Utc>>,
    pub latest_predicted_at: Option<DateTime<Utc>>,
    pub weather: Option<Value>,
    pub prediction: Option<Value>,
}

impl Station {
    /// `wildfire_probability` of the attached prediction, when numeric.
    pub fn probability(&self) -> Option<f64> {
        self.prediction
            .as_ref()?
            .get("wildfire_probability")?
            .as_f64()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteShot {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

fn text_field<'a>(record: &'a Value, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| record.get(*name).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

/// Numbers only; strings and nulls do not count as coordinates.
fn coordinate(record: &Value, primary: &str, alternate: &str) -> Option<f64> {
    let value = match record.get(primary) {
        Some(Value::Null) | None => record.get(alternate)?,
        Some(value) => value,
    };
    value.as_f64().filter(|v| v.is_finite())
}

/// Turns raw station records into stations. Accepts either coordinate
/// convention (`lat`/`lon` or `latitude`/`longitude`) and drops records
/// without finite coordinates. Ids and names default to the record's
/// position in the raw list.
pub fn normalize_stations(records: &[Value]) -> Vec<Station> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let source = text_field(record, &["station", "area_id", "id"]);
            let id = source.map_or_else(|| format!("station-{index}"), str::to_string);
            let name = text_field(record, &["name"])
                .or(source)
                .map_or_else(|| format!("Station {}", index + 1), str::to_string);
            let lat = coordinate(record, "lat", "latitude")?;
            let lon = coordinate(record, "lon", "longitude")?;
            let time = |field: &str| {
                record
                    .get(field)
                    .and_then(Value::as_str)
                    .and_then(timestamp::parse)
            };
            Some(Station {
                id,
                name,
                lat,
                lon,
                latest_observed_at: time("latest_observed_at"),
                latest_predicted_at: time("latest_predicted_at"),
                weather: record.get("weather").filter(|w| !w.is_null()).cloned(),
                prediction: record.get("prediction").filter(|p| !p.is_null()).cloned(),
            })
        })
        .collect()
}

/// Backend `error` field, else the error text, else the fallback.
fn error_text(err: &ApiError, fallback: &str) -> String {
    err.backend_message()
        .or_else(|| Some(err.to_string()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| fallback.to_string())
}

/// The single-page station dashboard. Nothing is polled: every request is
/// triggered by the user, except the prediction load on mount.
#[derive(Debug, Default)]
pub struct LegacyPage {
    stations: Vec<Station>,
    selected_id: Option<String>,
    predictions_by_id: HashMap<String, Value>,
    satellite_by_id: HashMap<String, Vec<SatelliteShot>>,
    error_message: String,
    /// Satellite requests in flight, by ticket.
    pending: HashMap<u64, String>,
    satellite_ticket: u64,
    /// Predictions and station loads both replace the station list, so the
    /// newest of either wins.
    load_epoch: u64,
    loading: bool,
}

impl LegacyPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected_station(&self) -> Option<&Station> {
        let id = self.selected_id.as_deref()?;
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn prediction_for(&self, id: &str) -> Option<&Value> {
        self.predictions_by_id.get(id)
    }

    pub fn satellite_for(&self, id: &str) -> Option<&[SatelliteShot]> {
        self.satellite_by_id.get(id).map(Vec::as_slice)
    }

    pub fn error_message(&self) -> Option<&str> {
        Some(self.error_message.as_str()).filter(|m| !m.is_empty())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mount(&mut self) -> Vec<FetchRequest> {
        vec![self.get_predictions()]
    }

    fn next_load_epoch(&mut self) -> u64 {
        self.load_epoch += 1;
        self.load_epoch
    }

    pub fn get_predictions(&mut self) -> FetchRequest {
        self.error_message.clear();
        self.loading = true;
        let epoch = self.next_load_epoch();
        FetchRequest::new(
            Slot::LegacyPredictions,
            epoch,
            ApiCall::PredictWeather {
                n_stations: LEGACY_STATION_COUNT,
            },
        )
    }

    pub fn load_stations(&mut self) -> FetchRequest {
        self.error_message.clear();
        self.loading = true;
        let epoch = self.next_load_epoch();
        FetchRequest::new(Slot::LegacyStations, epoch, ApiCall::Stations)
    }

    /// Requests an image for the selected station; nothing when no station
    /// is selected.
    pub fn get_satellite(&mut self) -> Option<FetchRequest> {
        self.error_message.clear();
        let station = self.selected_station()?;
        let request = SatelliteImageRequest::png(station.lat, station.lon, SATELLITE_ZOOM);
        let station_id = station.id.clone();
        self.satellite_ticket += 1;
        self.pending.insert(self.satellite_ticket, station_id);
        Some(FetchRequest::new(
            Slot::LegacySatellite,
            self.satellite_ticket,
            ApiCall::SatelliteImage { request },
        ))
    }

    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.step_selection(-1);
    }

    fn step_selection(&mut self, delta: isize) {
        if self.stations.is_empty() {
            return;
        }
        let current = self
            .selected_id
            .as_deref()
            .and_then(|id| self.stations.iter().position(|s| s.id == id))
            .unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(self.stations.len() - 1);
        self.selected_id = Some(self.stations[next].id.clone());
    }

    fn replace_stations(&mut self, raw: &[Value]) {
        let stations = normalize_stations(raw);
        info!("{} of {} station records usable", stations.len(), raw.len());
        self.selected_id = stations.first().map(|s| s.id.clone());
        self.stations = stations;
    }

    pub fn on_response(&mut self, response: FetchResponse, now: DateTime<Utc>) {
        match (response.slot, response.result) {
            (Slot::LegacyPredictions, Ok(Payload::Predictions(data))) => {
                if response.epoch != self.load_epoch {
                    return;
                }
                self.loading = false;
                if let Some(count) = data.count {
                    debug!("prediction run reported {count} results");
                }
                self.replace_stations(&data.results);
                self.predictions_by_id = self
                    .stations
                    .iter()
                    .filter_map(|s| Some((s.id.clone(), s.prediction.clone()?)))
                    .collect();
                if !data.results.is_empty() && self.stations.is_empty() {
                    warn!("predictions arrived without usable coordinates");
                    self.error_message = NO_COORDINATES_MESSAGE.to_string();
                }
            }
            (Slot::LegacyStations, Ok(Payload::Stations(records))) => {
                if response.epoch != self.load_epoch {
                    return;
                }
                self.loading = false;
                self.replace_stations(&records);
            }
            (Slot::LegacySatellite, Ok(Payload::SatelliteImage { url })) => {
                let Some(station_id) = self.pending.remove(&response.epoch) else {
                    return;
                };
                self.satellite_by_id.insert(
                    station_id,
                    vec![SatelliteShot {
                        url,
                        timestamp: now,
                    }],
                );
            }
            (Slot::LegacySatellite, Err(err)) => {
                if self.pending.remove(&response.epoch).is_some() {
                    self.error_message = error_text(&err, SATELLITE_FAILED);
                }
            }
            (slot, Err(err)) => {
                if response.epoch != self.load_epoch {
                    debug!("dropping superseded {slot:?} failure");
                    return;
                }
                self.loading = false;
                let fallback = match slot {
                    Slot::LegacyStations => STATIONS_FAILED,
                    _ => PREDICTIONS_FAILED,
                };
                self.error_message = error_text(&err, fallback);
            }
            (slot, Ok(_)) => warn!("legacy page ignored a {slot:?} response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::legacy::PredictWeatherResponse;
    use reqwest::StatusCode;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn predictions(request: &FetchRequest, results: Vec<Value>) -> FetchResponse {
        FetchResponse {
            page: 0,
            slot: Slot::LegacyPredictions,
            epoch: request.epoch,
            result: Ok(Payload::Predictions(PredictWeatherResponse {
                count: Some(results.len()),
                results,
            })),
        }
    }

    #[test]
    fn accepts_both_coordinate_conventions() {
        let records = [
            json!({"station": "KSLC", "lat": 40.78, "lon": -111.97}),
            json!({"station": "KPVU", "latitude": 40.22, "longitude": -111.72}),
            json!({"station": "KOGD", "lat": 41.19}),
            json!({"station": "KCDC", "lat": "37.7", "lon": -113.1}),
            json!({"lat": null, "latitude": 38.1, "lon": -111.0}),
            json!({"station": "KNAN", "lat": 40.0, "lon": null}),
        ];
        let stations = normalize_stations(&records);
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["KSLC", "KPVU", "station-4"]);
        assert_eq!((stations[1].lat, stations[1].lon), (40.22, -111.72));
        assert_eq!(stations[2].name, "Station 5");
        assert_eq!(stations[2].lat, 38.1);
    }

    #[test]
    fn station_list_records_normalize_too() {
        let records = [json!({
            "area_id": "KSLC", "name": "Salt Lake City", "lat": 40.78, "lon": -111.97,
            "latest_observed_at": "2025-06-01T10:00:00", "latest_predicted_at": null
        })];
        let stations = normalize_stations(&records);
        assert_eq!(stations[0].id, "KSLC");
        assert_eq!(stations[0].name, "Salt Lake City");
        assert!(stations[0].latest_observed_at.is_some());
        assert!(stations[0].latest_predicted_at.is_none());
    }

    #[test]
    fn mount_loads_predictions_and_selects_first_station() {
        let mut page = LegacyPage::new();
        let requests = page.mount();
        assert_eq!(requests[0].call, ApiCall::PredictWeather { n_stations: 25 });

        page.on_response(
            predictions(
                &requests[0],
                vec![
                    json!({"station": "A", "lat": 40.0, "lon": -111.0,
                           "prediction": {"wildfire_probability": 0.83, "label": 1}}),
                    json!({"station": "B", "latitude": 39.0, "longitude": -112.0}),
                ],
            ),
            now(),
        );
        assert_eq!(page.selected_id(), Some("A"));
        assert_eq!(page.stations().len(), 2);
        assert!(page.prediction_for("A").is_some());
        assert!(page.prediction_for("B").is_none());
        assert_eq!(page.selected_station().unwrap().probability(), Some(0.83));
        assert_eq!(page.error_message(), None);
    }

    #[test]
    fn warns_when_every_result_lacked_coordinates() {
        let mut page = LegacyPage::new();
        let request = page.get_predictions();
        page.on_response(
            predictions(&request, vec![json!({"station": "A"}), json!({"station": "B", "lat": 1.0})]),
            now(),
        );
        assert!(page.stations().is_empty());
        assert_eq!(page.error_message(), Some(NO_COORDINATES_MESSAGE));
    }

    #[test]
    fn no_warning_for_an_empty_result_set() {
        let mut page = LegacyPage::new();
        let request = page.get_predictions();
        page.on_response(predictions(&request, vec![]), now());
        assert_eq!(page.error_message(), None);
    }

    #[test]
    fn satellite_shot_is_recorded_for_the_requesting_station() {
        let mut page = LegacyPage::new();
        assert!(page.get_satellite().is_none());

        let request = page.get_predictions();
        page.on_response(
            predictions(
                &request,
                vec![
                    json!({"station": "A", "lat": 40.0, "lon": -111.0}),
                    json!({"station": "B", "lat": 39.0, "lon": -112.0}),
                ],
            ),
            now(),
        );
        let satellite = page.get_satellite().unwrap();
        assert_eq!(
            satellite.call,
            ApiCall::SatelliteImage {
                request: SatelliteImageRequest::png(40.0, -111.0, 10)
            }
        );
        page.select_next();
        assert_eq!(page.selected_id(), Some("B"));

        page.on_response(
            FetchResponse {
                page: 0,
                slot: Slot::LegacySatellite,
                epoch: satellite.epoch,
                result: Ok(Payload::SatelliteImage {
                    url: "http://localhost:8000/api/v1/satellite/image/a.png".to_string(),
                }),
            },
            now(),
        );
        let shots = page.satellite_for("A").unwrap();
        assert_eq!(shots[0].url, "http://localhost:8000/api/v1/satellite/image/a.png");
        assert!(page.satellite_for("B").is_none());
    }

    #[test]
    fn error_prefers_backend_message() {
        let mut page = LegacyPage::new();
        let request = page.get_predictions();
        page.on_response(
            FetchResponse {
                page: 0,
                slot: Slot::LegacyPredictions,
                epoch: request.epoch,
                result: Err(ApiError::from_status(
                    StatusCode::BAD_REQUEST,
                    r#"{"error":"n_stations must be > 0"}"#.to_string(),
                )),
            },
            now(),
        );
        assert_eq!(page.error_message(), Some("n_stations must be > 0"));
        assert!(!page.is_loading());

        page.get_predictions();
        assert_eq!(page.error_message(), None);
    }

    fn failure(request: &FetchRequest, status: StatusCode) -> FetchResponse {
        FetchResponse {
            page: 0,
            slot: request.slot,
            epoch: request.epoch,
            result: Err(ApiError::from_status(status, String::new())),
        }
    }

    #[test]
    fn satellite_request_does_not_supersede_a_pending_load() {
        let mut page = LegacyPage::new();
        let first = page.get_predictions();
        page.on_response(
            predictions(&first, vec![json!({"station": "A", "lat": 40.0, "lon": -111.0})]),
            now(),
        );

        let reload = page.get_predictions();
        let satellite = page.get_satellite().unwrap();
        page.on_response(
            predictions(
                &reload,
                vec![
                    json!({"station": "A", "lat": 40.0, "lon": -111.0}),
                    json!({"station": "B", "lat": 39.0, "lon": -112.0}),
                ],
            ),
            now(),
        );
        assert_eq!(page.stations().len(), 2);
        assert!(!page.is_loading());

        page.on_response(failure(&satellite, StatusCode::BAD_GATEWAY), now());
        assert_eq!(page.error_message(), Some("Request failed with 502"));
        assert_eq!(page.stations().len(), 2);
    }

    #[test]
    fn superseded_failure_is_ignored() {
        let mut page = LegacyPage::new();
        let old = page.get_predictions();
        let new = page.load_stations();
        page.on_response(failure(&old, StatusCode::BAD_GATEWAY), now());
        assert_eq!(page.error_message(), None);
        assert!(page.is_loading());

        page.on_response(
            FetchResponse {
                page: 0,
                slot: Slot::LegacyStations,
                epoch: new.epoch,
                result: Ok(Payload::Stations(vec![json!({"area_id": "A", "lat": 1.0, "lon": 2.0})])),
            },
            now(),
        );
        let older = page.get_predictions();
        let newer = page.get_predictions();
        page.on_response(predictions(&newer, vec![]), now());
        page.on_response(failure(&older, StatusCode::BAD_GATEWAY), now());
        assert_eq!(page.error_message(), None);
        assert!(!page.is_loading());
    }

    #[test]
    fn selection_stays_in_range() {
        let mut page = LegacyPage::new();
        page.select_next();
        assert_eq!(page.selected_id(), None);

        let request = page.load_stations();
        page.on_response(
            FetchResponse {
                page: 0,
                slot: Slot::LegacyStations,
                epoch: request.epoch,
                result: Ok(Payload::Stations(vec![
                    json!({"area_id": "A", "lat": 1.0, "lon": 2.0}),
                    json!({"area_id": "B", "lat": 3.0, "lon": 4.0}),
                ])),
            },
            now(),
        );
        page.select_previous();
        assert_eq!(page.selected_id(), Some("A"));
        page.select_next();
        page.select_next();
        assert_eq!(page.selected_id(), Some("B"));
    }
}
