use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::api::fire_areas::{CompareAreaItem, ComparePrediction, CompareResponse};
use crate::api::models::ModelInfo;
use crate::fetch::{ApiCall, FetchRequest, FetchResponse, Payload, Slot};
use crate::query::{Query, Status};

pub const EMPTY_MESSAGE: &str = "No ranked areas are available yet. \
The worker may still be ingesting weather data and predictions.";

/// One row of the cross-model grid: an area and one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRow {
    pub area_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// `None` renders as the placeholder.
    pub cells: Vec<Option<f64>>,
    /// Newest prediction time among the shown models.
    pub latest: Option<DateTime<Utc>>,
}

/// Pivots area predictions into rows = areas, columns = models. Each row
/// gets its own model index, so duplicate or missing predictions in one
/// row never leak into another.
pub fn pivot(models: &[ModelInfo], items: &[CompareAreaItem]) -> Vec<CompareRow> {
    items
        .iter()
        .map(|item| {
            let by_model: HashMap<&str, &ComparePrediction> = item
                .predictions
                .iter()
                .map(|p| (p.model_id.as_str(), p))
                .collect();
            let shown: Vec<Option<&ComparePrediction>> = models
                .iter()
                .map(|model| by_model.get(model.model_id.as_str()).copied())
                .collect();
            CompareRow {
                area_id: item.area_id.clone(),
                name: item.name.clone(),
                lat: item.lat,
                lon: item.lon,
                cells: shown.iter().map(|p| p.and_then(|p| p.probability)).collect(),
                latest: shown.iter().flatten().filter_map(|p| p.predicted_at).max(),
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ComparePage {
    top_n: usize,
    compare: Query<usize, CompareResponse>,
    pub selected_row: usize,
}

impl ComparePage {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            ..Self::default()
        }
    }

    pub fn compare(&self) -> &Query<usize, CompareResponse> {
        &self.compare
    }

    pub fn mount(&mut self) -> Vec<FetchRequest> {
        vec![self.request()]
    }

    pub fn tick(&mut self) -> Vec<FetchRequest> {
        if self.compare.is_fetching() {
            return Vec::new();
        }
        vec![self.request()]
    }

    fn request(&mut self) -> FetchRequest {
        let epoch = self.compare.request(self.top_n);
        FetchRequest::new(Slot::Compare, epoch, ApiCall::Compare { n: self.top_n })
    }

    pub fn on_response(&mut self, response: FetchResponse, now: DateTime<Utc>) {
        if response.slot != Slot::Compare {
            return;
        }
        let result = match response.result {
            Ok(Payload::Compare(compare)) => Ok(compare),
            Ok(other) => Err(format!("unexpected payload {other:?}")),
            Err(err) => Err(err.to_string()),
        };
        if self.compare.settle(response.epoch, result, now) {
            self.selected_row = self.selected_row.min(self.items().len().saturating_sub(1));
        }
    }

    pub fn items(&self) -> &[CompareAreaItem] {
        self.compare
            .data()
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    /// Columns: the models the comparison was computed with, else the
    /// shared model list.
    pub fn columns<'a>(&'a self, fallback: &'a [ModelInfo]) -> &'a [ModelInfo] {
        match self.compare.data() {
            Some(compare) if !compare.models.is_empty() => compare.models.as_slice(),
            _ => fallback,
        }
    }

    pub fn rows(&self, fallback: &[ModelInfo]) -> Vec<CompareRow> {
        pivot(self.columns(fallback), self.items())
    }

    pub fn status(&self) -> Status {
        self.compare.status(|c| c.items.is_empty())
    }

    pub fn show_empty_state(&self) -> bool {
        self.status() == Status::Empty
    }

    pub fn select_next(&mut self) {
        if self.selected_row + 1 < self.items().len() {
            self.selected_row += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn selected_area(&self) -> Option<&str> {
        self.items()
            .get(self.selected_row)
            .map(|item| item.area_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::model;

    fn prediction(model_id: &str, probability: Option<f64>) -> ComparePrediction {
        ComparePrediction {
            model_id: model_id.to_string(),
            probability,
            predicted_at: None,
        }
    }

    fn area(area_id: &str, predictions: Vec<ComparePrediction>) -> CompareAreaItem {
        CompareAreaItem {
            area_id: area_id.to_string(),
            name: area_id.to_string(),
            lat: 40.0,
            lon: -111.0,
            predictions,
        }
    }

    #[test]
    fn one_cell_per_area_and_model() {
        let models = [model("rf"), model("xgb"), model("nb")];
        let items = [
            area("A", vec![prediction("rf", Some(0.9)), prediction("nb", Some(0.1))]),
            area("B", vec![prediction("xgb", Some(0.4))]),
        ];
        let rows = pivot(&models, &items);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.cells.len() == models.len()));
        assert_eq!(rows[0].cells, [Some(0.9), None, Some(0.1)]);
        assert_eq!(rows[1].cells, [None, Some(0.4), None]);
    }

    #[test]
    fn prediction_order_does_not_matter() {
        let models = [model("rf"), model("xgb")];
        let forward = [area("A", vec![prediction("rf", Some(0.2)), prediction("xgb", Some(0.7))])];
        let reversed = [area("A", vec![prediction("xgb", Some(0.7)), prediction("rf", Some(0.2))])];
        assert_eq!(pivot(&models, &forward), pivot(&models, &reversed));

        let swapped_models = [model("xgb"), model("rf")];
        assert_eq!(pivot(&swapped_models, &forward)[0].cells, [Some(0.7), Some(0.2)]);
    }

    #[test]
    fn null_probability_and_unknown_model_are_placeholders() {
        let models = [model("rf")];
        let items = [
            area("A", vec![prediction("rf", None)]),
            area("B", vec![prediction("other", Some(0.5))]),
        ];
        let rows = pivot(&models, &items);
        assert_eq!(rows[0].cells, [None]);
        assert_eq!(rows[1].cells, [None]);
    }

    #[test]
    fn latest_ignores_hidden_models() {
        let at = |secs| DateTime::from_timestamp(secs, 0);
        let models = [model("rf")];
        let items = [area(
            "A",
            vec![
                ComparePrediction {
                    predicted_at: at(100),
                    ..prediction("rf", Some(0.3))
                },
                ComparePrediction {
                    predicted_at: at(900),
                    ..prediction("other", Some(0.6))
                },
            ],
        )];
        assert_eq!(pivot(&models, &items)[0].latest, at(100));
    }

    #[test]
    fn rows_do_not_share_an_index() {
        let models = [model("rf")];
        let items = [area("A", vec![prediction("rf", Some(0.8))]), area("B", vec![])];
        let rows = pivot(&models, &items);
        assert_eq!(rows[1].cells, [None]);
    }

    #[test]
    fn columns_prefer_the_comparison_models() {
        let mut page = ComparePage::new(5);
        let fallback = [model("rf")];
        assert_eq!(page.columns(&fallback), &fallback);

        let requests = page.mount();
        page.on_response(
            FetchResponse {
                page: 0,
                slot: Slot::Compare,
                epoch: requests[0].epoch,
                result: Ok(Payload::Compare(CompareResponse {
                    models: vec![model("rf"), model("xgb")],
                    items: vec![],
                })),
            },
            DateTime::from_timestamp(0, 0).unwrap(),
        );
        assert_eq!(page.columns(&fallback).len(), 2);
        assert!(page.show_empty_state());
    }
}
