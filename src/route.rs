use std::fmt;

use percent_encoding::percent_decode_str;
use reqwest::Url;

const APP_ORIGIN: &str = "rincon://app/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Compare,
    AreaDetail { area_id: String },
    NotFound { path: String },
}

/// Where the user is: the page plus the selected model. The URL form is
/// only a serialization of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    pub model: Option<String>,
}

impl Location {
    pub fn dashboard() -> Self {
        Self {
            route: Route::Dashboard,
            model: None,
        }
    }

    pub fn compare() -> Self {
        Self {
            route: Route::Compare,
            model: None,
        }
    }

    pub fn area(area_id: &str, model: Option<&str>) -> Self {
        Self {
            route: Route::AreaDetail {
                area_id: area_id.to_string(),
            },
            model: model.filter(|m| !m.is_empty()).map(str::to_string),
        }
    }

    /// Parses an address such as `/areas/KSLC?model=rf`. `/home` redirects
    /// to the dashboard and drops its query, unknown paths are not-found.
    pub fn parse(input: &str) -> Self {
        let not_found = || Self {
            route: Route::NotFound {
                path: input.to_string(),
            },
            model: None,
        };

        let Some(url) = Url::parse(APP_ORIGIN)
            .ok()
            .and_then(|origin| origin.join(input.trim()).ok())
        else {
            return not_found();
        };
        if url.scheme() != "rincon" || url.host_str() != Some("app") {
            return not_found();
        }

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(decode_segment)
                    .collect()
            })
            .unwrap_or_default();
        let model = url
            .query_pairs()
            .find(|(key, _)| key == "model")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());

        match segments.as_slice() {
            [] => Self {
                route: Route::Dashboard,
                model,
            },
            [home] if home == "home" => Self::dashboard(),
            [compare] if compare == "compare" => Self::compare(),
            [areas, area_id] if areas == "areas" => Self {
                route: Route::AreaDetail {
                    area_id: area_id.clone(),
                },
                model,
            },
            _ => not_found(),
        }
    }

    /// Only the dashboard and the area detail carry a model.
    pub fn carries_model(&self) -> bool {
        matches!(self.route, Route::Dashboard | Route::AreaDetail { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(mut url) = Url::parse(APP_ORIGIN) else {
            return write!(f, "/");
        };
        match &self.route {
            Route::Dashboard => url.set_path("/"),
            Route::Compare => url.set_path("/compare"),
            Route::AreaDetail { area_id } => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.clear().extend(["areas", area_id.as_str()]);
                }
            }
            Route::NotFound { path } => return write!(f, "{path}"),
        }
        if let (true, Some(model)) = (self.carries_model(), &self.model) {
            url.query_pairs_mut().append_pair("model", model);
        }
        write!(f, "{}", url.path())?;
        if let Some(query) = url.query() {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Url hands out path segments in their encoded form.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
