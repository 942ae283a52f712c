pub mod builder;
mod config;
pub mod manual;
mod sentiment;

use log::{debug, info, warn};

use std::collections::BTreeMap;

pub use crate::config::*;
pub use crate::sentiment::{label_comments, tally, wordcloud_corpus};

/// Converts a mean rating on the 1..=7 scale to the 0..=100 scale.
///
/// Halves are rounded to the nearest even integer.
pub fn rescale(mean: f64) -> u32 {
    (mean * 100.0 / RATING_MAX).round_ties_even() as u32
}

/// The overall satisfaction: the rounded mean of already rounded scores.
pub fn composite_score(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let total: u32 = scores.iter().sum();
    (total as f64 / scores.len() as f64).round_ties_even() as u32
}

/// The rows whose start timestamp contains the given token (for example `2024-09`).
///
/// This is a plain substring test on the raw timestamp, no date is parsed.
pub fn filter_by_month(dataset: &Dataset, month: &str) -> Dataset {
    let res = dataset.retain_rows(|r| r.started_at.contains(month));
    debug!(
        "filter_by_month: {:?}: {} -> {} rows",
        month,
        dataset.len(),
        res.len()
    );
    res
}

/// The rows that belong to a single entity.
pub fn filter_by_entity(dataset: &Dataset, entity: &str) -> Dataset {
    dataset.retain_rows(|r| r.entity == entity)
}

fn group_by_entity(rows: &[SurveyRow]) -> BTreeMap<&str, Vec<&SurveyRow>> {
    let mut groups: BTreeMap<&str, Vec<&SurveyRow>> = BTreeMap::new();
    for r in rows.iter() {
        groups.entry(r.entity.as_str()).or_default().push(r);
    }
    groups
}

// Returns None if one of the dimensions has no answer at all.
fn score_rows(schema: &DatasetSchema, rows: &[&SurveyRow]) -> Option<ScoreRow> {
    let mut dimensions: Vec<(String, u32)> = Vec::with_capacity(NUM_DIMENSIONS);
    for (idx, name) in schema.dimension_columns.iter().enumerate() {
        let values: Vec<f64> = rows.iter().filter_map(|r| r.ratings[idx]).collect();
        if values.is_empty() {
            debug!("score_rows: no answer for dimension {:?}", name);
            return None;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        dimensions.push((name.clone(), rescale(mean)));
    }
    let scores: Vec<u32> = dimensions.iter().map(|(_, s)| *s).collect();
    Some(ScoreRow {
        composite: composite_score(&scores),
        dimensions,
    })
}

/// Computes the scores of every entity present in the dataset.
///
/// For each entity, each dimension is averaged over the answers of that
/// entity, then rescaled to 0..=100. The composite is the mean of the
/// rescaled dimensions. An entity for which a whole dimension is unanswered
/// is left out.
pub fn scores_by_entity(dataset: &Dataset) -> ScoreTable {
    info!("scores_by_entity: processing {} rows", dataset.len());
    let mut res = ScoreTable::default();
    for (entity, rows) in group_by_entity(&dataset.rows) {
        match score_rows(&dataset.schema, &rows) {
            Some(sr) => {
                info!(
                    "scores_by_entity: {}: {} rows, composite {}",
                    entity,
                    rows.len(),
                    sr.composite
                );
                res.rows.insert(entity.to_string(), sr);
            }
            None => {
                warn!(
                    "scores_by_entity: {}: skipped, a dimension has no answer in {} rows",
                    entity,
                    rows.len()
                );
            }
        }
    }
    res
}

/// Computes the scores of the whole dataset, taken as a single entity.
///
/// Returns None for an empty dataset.
pub fn scores_overall(dataset: &Dataset) -> Option<ScoreRow> {
    info!("scores_overall: processing {} rows", dataset.len());
    let rows: Vec<&SurveyRow> = dataset.rows.iter().collect();
    if rows.is_empty() {
        return None;
    }
    score_rows(&dataset.schema, &rows)
}

fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round_ties_even() as u32
    }
}

fn is_affirmative(r: &SurveyRow, affirmative: &str) -> bool {
    r.revisit == affirmative
}

/// The percentage of respondents of each entity who answered exactly `affirmative`.
pub fn revisit_rates(dataset: &Dataset, affirmative: &str) -> RevisitTable {
    let mut res = RevisitTable::default();
    for (entity, rows) in group_by_entity(&dataset.rows) {
        let yes = rows.iter().filter(|r| is_affirmative(r, affirmative)).count() as u64;
        let rate = percentage(yes, rows.len() as u64);
        debug!(
            "revisit_rates: {}: {}/{} -> {}%",
            entity,
            yes,
            rows.len(),
            rate
        );
        res.rates.insert(entity.to_string(), rate);
    }
    res
}

/// The revisit percentage of a single entity. Zero if the entity has no rows.
pub fn revisit_rate_for(dataset: &Dataset, entity: &str, affirmative: &str) -> u32 {
    let mut yes: u64 = 0;
    let mut total: u64 = 0;
    for r in dataset.rows.iter().filter(|r| r.entity == entity) {
        total += 1;
        if is_affirmative(r, affirmative) {
            yes += 1;
        }
    }
    percentage(yes, total)
}
