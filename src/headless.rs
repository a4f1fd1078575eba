use std::error::Error;
use std::io::Write;

use log::info;
use serde::Serialize;

use crate::api::fire_areas::TopItem;
use crate::api::{timestamp, RiskApi};
use crate::risk::{format_probability, RiskTier};

#[derive(Serialize, Debug)]
struct RankedArea<'a> {
    rank: usize,
    area_id: &'a str,
    name: &'a str,
    lat: f64,
    lon: f64,
    probability: f64,
    tier: &'static str,
    color: &'static str,
    predicted_at: String,
    model_id: &'a str,
}

impl<'a> RankedArea<'a> {
    fn new(rank: usize, item: &'a TopItem) -> Self {
        let tier = RiskTier::from_probability(item.probability);
        Self {
            rank,
            area_id: &item.area_id,
            name: &item.name,
            lat: item.lat,
            lon: item.lon,
            probability: item.probability,
            tier: tier.label(),
            color: tier.hex(),
            predicted_at: timestamp::iso(&item.predicted_at),
            model_id: &item.model_id,
        }
    }
}

/// Fetches the ranking once and prints it. Without a model the first
/// registered model is used, as the dashboard does.
pub fn print_top(
    api: &dyn RiskApi,
    n: usize,
    model: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let model_id = match model.filter(|m| !m.is_empty()) {
        Some(model_id) => model_id.to_string(),
        None => api
            .models()?
            .models
            .into_iter()
            .next()
            .map(|m| m.model_id)
            .ok_or("no prediction models are registered")?,
    };
    info!("top {n} areas for model {model_id}");

    let top = api.top_fire_areas(n, Some(&model_id))?;
    let ranked: Vec<RankedArea> = top
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| RankedArea::new(i + 1, item))
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &ranked)?;
        writeln!(out)?;
        return Ok(());
    }

    if ranked.is_empty() {
        writeln!(
            out,
            "No ranked fire areas yet for model {model_id}. Check worker logs for prediction generation and storage events."
        )?;
        return Ok(());
    }
    writeln!(out, "Top {} areas for model {model_id}", ranked.len())?;
    writeln!(
        out,
        "{:>2}  {:<24} {:<20} {:<24} {:>7}  {}",
        "#", "Area", "Location", "Predicted At (UTC)", "Prob", "Tier"
    )?;
    for area in &ranked {
        writeln!(
            out,
            "{:>2}  {:<24} {:<20} {:<24} {:>7}  {}",
            area.rank,
            area.name,
            format!("{:.4}, {:.4}", area.lat, area.lon),
            area.predicted_at,
            format_probability(area.probability),
            area.tier
        )?;
    }
    Ok(())
}
