pub mod area_detail;
pub mod compare;
pub mod dashboard;
pub mod legacy;

use chrono::{DateTime, Utc};

use crate::api::models::ModelInfo;
use crate::fetch::{FetchRequest, FetchResponse};
use crate::route::{Location, Route};

use self::area_detail::AreaDetailPage;
use self::compare::ComparePage;
use self::dashboard::DashboardPage;

/// Selects the first listed model when none is selected yet. Returns true
/// when the selection changed.
pub(crate) fn adopt_first_model(selected: &mut Option<String>, models: &[ModelInfo]) -> bool {
    if selected.is_some() {
        return false;
    }
    match models.first() {
        Some(first) => {
            *selected = Some(first.model_id.clone());
            true
        }
        None => false,
    }
}

/// The mounted page of the routed dashboard. Each variant owns its queries,
/// so dropping the page drops its polling.
#[derive(Debug)]
pub enum Page {
    Dashboard(DashboardPage),
    Compare(ComparePage),
    AreaDetail(AreaDetailPage),
    NotFound(String),
}

impl Page {
    pub fn from_location(location: Location, top_n: usize) -> Self {
        match location.route {
            Route::Dashboard => Page::Dashboard(DashboardPage::new(location.model, top_n)),
            Route::Compare => Page::Compare(ComparePage::new(top_n)),
            Route::AreaDetail { area_id } => {
                Page::AreaDetail(AreaDetailPage::new(&area_id, location.model))
            }
            Route::NotFound { path } => Page::NotFound(path),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Page::Dashboard(page) => page.location(),
            Page::Compare(_) => Location::compare(),
            Page::AreaDetail(page) => page.location(),
            Page::NotFound(path) => Location {
                route: Route::NotFound { path: path.clone() },
                model: None,
            },
        }
    }

    pub fn selected_model(&self) -> Option<&str> {
        match self {
            Page::Dashboard(page) => page.selected_model(),
            Page::AreaDetail(page) => page.selected_model(),
            Page::Compare(_) | Page::NotFound(_) => None,
        }
    }

    pub fn mount(&mut self, models: &[ModelInfo]) -> Vec<FetchRequest> {
        match self {
            Page::Dashboard(page) => page.mount(models),
            Page::Compare(page) => page.mount(),
            Page::AreaDetail(page) => page.mount(models),
            Page::NotFound(_) => Vec::new(),
        }
    }

    pub fn on_models(&mut self, models: &[ModelInfo]) -> Vec<FetchRequest> {
        match self {
            Page::Dashboard(page) => page.on_models(models),
            Page::AreaDetail(page) => page.on_models(models),
            Page::Compare(_) | Page::NotFound(_) => Vec::new(),
        }
    }

    pub fn select_model(&mut self, model_id: &str) -> Vec<FetchRequest> {
        match self {
            Page::Dashboard(page) => page.select_model(model_id),
            Page::AreaDetail(page) => page.select_model(model_id),
            Page::Compare(_) | Page::NotFound(_) => Vec::new(),
        }
    }

    pub fn tick(&mut self) -> Vec<FetchRequest> {
        match self {
            Page::Dashboard(page) => page.tick(),
            Page::Compare(page) => page.tick(),
            Page::AreaDetail(page) => page.tick(),
            Page::NotFound(_) => Vec::new(),
        }
    }

    pub fn on_response(&mut self, response: FetchResponse, now: DateTime<Utc>) {
        match self {
            Page::Dashboard(page) => page.on_response(response, now),
            Page::Compare(page) => page.on_response(response, now),
            Page::AreaDetail(page) => page.on_response(response, now),
            Page::NotFound(_) => {}
        }
    }

    pub fn select_next(&mut self) {
        match self {
            Page::Dashboard(page) => page.select_next(),
            Page::Compare(page) => page.select_next(),
            Page::AreaDetail(_) | Page::NotFound(_) => {}
        }
    }

    pub fn select_previous(&mut self) {
        match self {
            Page::Dashboard(page) => page.select_previous(),
            Page::Compare(page) => page.select_previous(),
            Page::AreaDetail(_) | Page::NotFound(_) => {}
        }
    }

    /// Where `Enter` leads from the current row, if anywhere.
    pub fn open_selected(&self) -> Option<Location> {
        match self {
            Page::Dashboard(page) => page.open_selected(),
            Page::Compare(page) => page
                .selected_area()
                .map(|area_id| Location::area(area_id, None)),
            Page::AreaDetail(_) | Page::NotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::model;
    use crate::fetch::Slot;

    #[test]
    fn first_model_is_adopted_once() {
        let mut selected = None;
        assert!(!adopt_first_model(&mut selected, &[]));
        assert!(adopt_first_model(&mut selected, &[model("rf"), model("xgb")]));
        assert_eq!(selected.as_deref(), Some("rf"));
        assert!(!adopt_first_model(&mut selected, &[model("xgb")]));
        assert_eq!(selected.as_deref(), Some("rf"));
    }

    #[test]
    fn pages_follow_the_location() {
        let page = Page::from_location(Location::parse("/areas/KSLC?model=rf"), 5);
        assert!(matches!(page, Page::AreaDetail(_)));
        assert_eq!(page.location().to_string(), "/areas/KSLC?model=rf");

        let page = Page::from_location(Location::parse("/nope"), 5);
        assert_eq!(page.location().to_string(), "/nope");

        let page = Page::from_location(Location::parse("/compare?model=rf"), 5);
        assert_eq!(page.location().to_string(), "/compare");
        assert_eq!(page.selected_model(), None);
    }

    #[test]
    fn compare_ignores_models() {
        let mut page = Page::from_location(Location::compare(), 5);
        let requests = page.mount(&[model("rf")]);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].slot, Slot::Compare);
        assert!(page.select_model("rf").is_empty());
        assert!(page.on_models(&[model("rf")]).is_empty());
    }

    #[test]
    fn not_found_is_inert() {
        let mut page = Page::from_location(Location::parse("/x/y/z"), 5);
        assert!(page.mount(&[model("rf")]).is_empty());
        assert!(page.tick().is_empty());
        assert!(page.open_selected().is_none());
    }
}
