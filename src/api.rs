use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const DEFAULT_TOP_N: usize = 5;
pub const LEGACY_STATION_COUNT: usize = 25;

/// Timestamps from the API come either as RFC 3339 or as naive ISO-8601
/// (the server stores UTC without an offset).
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        DateTime::parse_from_rfc3339(text)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    /// Same shape as JavaScript's `toISOString`.
    pub fn iso(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {text}")))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(text) => parse(&text)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {text}"))),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn accepts_offset_and_naive_forms() {
            let zulu = parse("2025-06-01T12:30:00Z").unwrap();
            let naive = parse("2025-06-01T12:30:00").unwrap();
            let offset = parse("2025-06-01T14:30:00+02:00").unwrap();
            assert_eq!(zulu, naive);
            assert_eq!(zulu, offset);
            assert_eq!(iso(&zulu), "2025-06-01T12:30:00.000Z");
            assert!(parse("yesterday").is_none());
        }

        #[test]
        fn keeps_fractional_seconds() {
            let ts = parse("2025-06-01T12:30:00.250").unwrap();
            assert_eq!(iso(&ts), "2025-06-01T12:30:00.250Z");
        }
    }
}

pub mod models {
    use super::*;

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct ModelInfo {
        pub model_id: String,
        pub name: String,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Deserialize, Serialize, Debug, Clone, Default)]
    pub struct ModelsResponse {
        pub models: Vec<ModelInfo>,
    }
}

pub mod fire_areas {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct TopItem {
        pub area_id: String,
        pub name: String,
        pub lat: f64,
        pub lon: f64,
        #[serde(deserialize_with = "timestamp::deserialize")]
        pub predicted_at: DateTime<Utc>,
        pub probability: f64,
        pub model_id: String,
    }

    #[derive(Deserialize, Serialize, Debug, Clone, Default)]
    pub struct TopResponse {
        pub items: Vec<TopItem>,
    }

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct ComparePrediction {
        pub model_id: String,
        #[serde(default)]
        pub probability: Option<f64>,
        #[serde(default, deserialize_with = "timestamp::option::deserialize")]
        pub predicted_at: Option<DateTime<Utc>>,
    }

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct CompareAreaItem {
        pub area_id: String,
        pub name: String,
        pub lat: f64,
        pub lon: f64,
        #[serde(default)]
        pub predictions: Vec<ComparePrediction>,
    }

    #[derive(Deserialize, Serialize, Debug, Clone, Default)]
    pub struct CompareResponse {
        #[serde(default)]
        pub models: Vec<models::ModelInfo>,
        pub items: Vec<CompareAreaItem>,
    }
}

pub mod areas {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct WeatherLatest {
        pub area_id: String,
        #[serde(deserialize_with = "timestamp::deserialize")]
        pub observed_at: DateTime<Utc>,
        #[serde(default)]
        pub temperature_c: Option<f64>,
        #[serde(default)]
        pub dewpoint_c: Option<f64>,
        #[serde(default, alias = "humidity_pct")]
        pub relative_humidity_pct: Option<f64>,
        #[serde(default)]
        pub wind_direction_deg: Option<f64>,
        #[serde(default)]
        pub wind_speed_kph: Option<f64>,
        #[serde(default)]
        pub wind_gust_kph: Option<f64>,
        #[serde(default, alias = "precipitation_mm")]
        pub precipitation_3h_mm: Option<f64>,
        #[serde(default)]
        pub barometric_pressure_pa: Option<f64>,
        #[serde(default)]
        pub visibility_m: Option<f64>,
        #[serde(default)]
        pub heat_index_c: Option<f64>,
    }

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct PredictionLatest {
        pub area_id: String,
        pub model_id: String,
        #[serde(deserialize_with = "timestamp::deserialize")]
        pub predicted_at: DateTime<Utc>,
        pub probability: f64,
        pub label: i64,
    }

    impl PredictionLatest {
        pub fn label_text(&self) -> &'static str {
            if self.label == 1 {
                "Fire Risk"
            } else {
                "No Fire Risk"
            }
        }
    }

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    pub struct SatelliteLatest {
        pub area_id: String,
        #[serde(deserialize_with = "timestamp::deserialize")]
        pub captured_at: DateTime<Utc>,
        pub filename: String,
        pub file_path: String,
        pub satellite_url: String,
        pub content_type: String,
    }
}

pub mod legacy {
    use super::*;

    #[derive(Serialize, Debug, Clone, PartialEq)]
    pub struct PredictWeatherRequest {
        pub n_stations: usize,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct PredictWeatherResponse {
        #[serde(default)]
        pub count: Option<usize>,
        #[serde(default)]
        pub results: Vec<Value>,
    }

    #[derive(Serialize, Debug, Clone, PartialEq)]
    pub struct SatelliteImageRequest {
        pub lat: f64,
        pub lon: f64,
        pub zoom: u8,
        pub format: String,
        pub return_image: bool,
    }

    impl SatelliteImageRequest {
        pub fn png(lat: f64, lon: f64, zoom: u8) -> Self {
            Self {
                lat,
                lon,
                zoom,
                format: "png".to_string(),
                return_image: false,
            }
        }
    }

    #[derive(Deserialize, Debug, Clone, PartialEq)]
    pub struct SatelliteImageResponse {
        pub filename: String,
        #[serde(default)]
        pub path: Option<String>,
    }

    /// `/stations` has answered both as a bare list and wrapped in `items`.
    pub fn station_records(value: Value) -> Result<Vec<Value>> {
        match value {
            Value::Array(records) => Ok(records),
            Value::Object(mut object) => match object.remove("items") {
                Some(Value::Array(records)) => Ok(records),
                _ => Err(ApiError::Decode(serde::de::Error::custom(
                    "station list has no `items` array",
                ))),
            },
            _ => Err(ApiError::Decode(serde::de::Error::custom(
                "station list is not a list",
            ))),
        }
    }
}

use areas::{PredictionLatest, SatelliteLatest, WeatherLatest};
use fire_areas::{CompareResponse, TopResponse};
use legacy::{PredictWeatherResponse, SatelliteImageRequest, SatelliteImageResponse};
use models::ModelsResponse;

/// Everything the dashboards read from the backend. The HTTP client is the
/// only production implementation.
pub trait RiskApi: Send + Sync {
    fn models(&self) -> Result<ModelsResponse>;

    fn top_fire_areas(&self, n: usize, model_id: Option<&str>) -> Result<TopResponse>;

    fn compare_fire_areas(&self, n: usize) -> Result<CompareResponse>;

    fn latest_weather(&self, area_id: &str) -> Result<WeatherLatest>;

    fn latest_prediction(&self, area_id: &str, model_id: Option<&str>) -> Result<PredictionLatest>;

    fn latest_satellite(&self, area_id: &str) -> Result<SatelliteLatest>;

    fn stations(&self) -> Result<Vec<Value>>;

    fn predict_weather(&self, n_stations: usize) -> Result<PredictWeatherResponse>;

    fn request_satellite_image(&self, request: &SatelliteImageRequest)
        -> Result<SatelliteImageResponse>;

    /// Servable URL of a stored image. Builds a link, sends nothing.
    fn satellite_image_url(&self, filename: &str) -> String;
}

pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder().user_agent("rincon-fire").build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins path segments onto the base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");
        send_json(self.http.get(url))
    }

    fn post_json<T: DeserializeOwned, B: Serialize>(&self, url: Url, body: &B) -> Result<T> {
        debug!("POST {url}");
        send_json(self.http.post(url).json(body))
    }
}

fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send()?;
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(ApiError::from_status(status, body));
    }
    Ok(serde_json::from_str(&body)?)
}

impl RiskApi for ApiClient {
    fn models(&self) -> Result<ModelsResponse> {
        self.get_json(self.endpoint(&["api", "v1", "models"])?)
    }

    fn top_fire_areas(&self, n: usize, model_id: Option<&str>) -> Result<TopResponse> {
        let n = n.to_string();
        let mut query = vec![("n", n.as_str())];
        if let Some(model_id) = model_id.filter(|m| !m.is_empty()) {
            query.push(("model_id", model_id));
        }
        self.get_json(self.endpoint_with_query(&["api", "v1", "fire-areas", "top"], &query)?)
    }

    fn compare_fire_areas(&self, n: usize) -> Result<CompareResponse> {
        let n = n.to_string();
        self.get_json(
            self.endpoint_with_query(&["api", "v1", "fire-areas", "compare"], &[("n", &n)])?,
        )
    }

    fn latest_weather(&self, area_id: &str) -> Result<WeatherLatest> {
        self.get_json(self.endpoint(&["api", "v1", "areas", area_id, "weather", "latest"])?)
    }

    fn latest_prediction(&self, area_id: &str, model_id: Option<&str>) -> Result<PredictionLatest> {
        let segments = ["api", "v1", "areas", area_id, "predictions", "latest"];
        let url = match model_id.filter(|m| !m.is_empty()) {
            Some(model_id) => self.endpoint_with_query(&segments, &[("model_id", model_id)])?,
            None => self.endpoint(&segments)?,
        };
        self.get_json(url)
    }

    fn latest_satellite(&self, area_id: &str) -> Result<SatelliteLatest> {
        self.get_json(self.endpoint(&["api", "v1", "areas", area_id, "satellite", "latest"])?)
    }

    fn stations(&self) -> Result<Vec<Value>> {
        let value: Value = self.get_json(self.endpoint(&["stations"])?)?;
        legacy::station_records(value)
    }

    fn predict_weather(&self, n_stations: usize) -> Result<PredictWeatherResponse> {
        let url = self.endpoint(&["api", "v1", "predict", "weather"])?;
        self.post_json(url, &legacy::PredictWeatherRequest { n_stations })
    }

    fn request_satellite_image(
        &self,
        request: &SatelliteImageRequest,
    ) -> Result<SatelliteImageResponse> {
        let url = self.endpoint(&["api", "v1", "satellite", "image"])?;
        self.post_json(url, request)
    }

    fn satellite_image_url(&self, filename: &str) -> String {
        match self.endpoint(&["api", "v1", "satellite", "image", filename]) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}/api/v1/satellite/image/{filename}",
                self.base.as_str().trim_end_matches('/')
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8000").unwrap()
    }

    #[test]
    fn builds_encoded_area_paths() {
        let url = client()
            .endpoint(&["api", "v1", "areas", "KSLC/2 x", "weather", "latest"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/areas/KSLC%2F2%20x/weather/latest"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client = ApiClient::new("http://example.com/fire/").unwrap();
        let url = client
            .endpoint_with_query(&["api", "v1", "fire-areas", "top"], &[("n", "5"), ("model_id", "rf")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.com/fire/api/v1/fire-areas/top?n=5&model_id=rf"
        );
    }

    #[test]
    fn satellite_image_url_is_a_link() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(
            client.satellite_image_url("utah 1.png"),
            "http://localhost:8000/api/v1/satellite/image/utah%201.png"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn weather_accepts_both_field_names() {
        let modern: areas::WeatherLatest = serde_json::from_str(
            r#"{"area_id":"A","observed_at":"2025-06-01T00:00:00","temperature_c":21.5,
                "relative_humidity_pct":12.0,"wind_speed_kph":null,"precipitation_3h_mm":0.0}"#,
        )
        .unwrap();
        assert_eq!(modern.relative_humidity_pct, Some(12.0));
        assert_eq!(modern.wind_speed_kph, None);
        assert_eq!(modern.heat_index_c, None);

        let older: areas::WeatherLatest = serde_json::from_str(
            r#"{"area_id":"A","observed_at":"2025-06-01T00:00:00Z","humidity_pct":40.0,"precipitation_mm":1.5}"#,
        )
        .unwrap();
        assert_eq!(older.relative_humidity_pct, Some(40.0));
        assert_eq!(older.precipitation_3h_mm, Some(1.5));
    }

    #[test]
    fn compare_prediction_may_be_null() {
        let response: fire_areas::CompareResponse = serde_json::from_str(
            r#"{"models":[{"model_id":"rf","name":"Random Forest","description":""}],
                "items":[{"area_id":"A","name":"Alpha","lat":40.0,"lon":-111.0,
                  "predictions":[{"model_id":"rf","probability":null,"predicted_at":null}]}]}"#,
        )
        .unwrap();
        assert_eq!(response.items[0].predictions[0].probability, None);
    }

    #[test]
    fn station_records_accepts_list_or_items() {
        let bare = legacy::station_records(serde_json::json!([{"id": 1}])).unwrap();
        assert_eq!(bare.len(), 1);
        let wrapped =
            legacy::station_records(serde_json::json!({"items": [{"area_id": "A"}, {}]})).unwrap();
        assert_eq!(wrapped.len(), 2);
        assert!(legacy::station_records(serde_json::json!({"stations": []})).is_err());
    }
}
