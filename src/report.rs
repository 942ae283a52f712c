use log::{debug, error, info, warn};

use snafu::{prelude::*, Snafu};
use survey_metrics::*;

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::report::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find the worksheet {name:?} in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Line {lineno}: cannot understand the cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("{path}: missing column {column:?}"))]
    MissingColumn { path: String, column: String },
    #[snafu(display("{path}, line {lineno}: the value {content:?} of column {column:?} is not a rating"))]
    InvalidRating {
        path: String,
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("{path}, line {lineno}: {source}"))]
    InvalidRow {
        source: MetricsError,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Unknown provider {provider:?}, expected csv or xlsx"))]
    UnknownProvider { provider: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error encoding the report as JSON"))]
    EncodingJson { source: serde_json::Error },
    #[snafu(display("Error writing the report to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration path {path} has no parent directory"))]
    MissingParentDir { path: String },
    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },
    #[snafu(display("The report differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type ReportResult<T> = Result<T, ReportError>;
pub type BReportResult<T> = Result<T, Box<ReportError>>;

/// The outcome of loading one survey export.
///
/// A source that cannot be read does not stop the report: the sections
/// that depend on it are skipped.
#[derive(PartialEq, Debug, Clone)]
pub enum LoadedSource {
    Available(Dataset),
    Unavailable { name: String, reason: String },
}

impl LoadedSource {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            LoadedSource::Available(ds) => Some(ds),
            LoadedSource::Unavailable { .. } => None,
        }
    }
}

fn read_survey_data(source: &ResolvedSource) -> BReportResult<Dataset> {
    info!("Attempting to read survey file {:?}", source.path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_survey(&source.path, &source.schema),
        "xlsx" | "excel" => io_excel::read_excel_survey(
            &source.path,
            source.worksheet_name.as_deref(),
            &source.schema,
        ),
        x => Err(Box::new(ReportError::UnknownProvider {
            provider: x.to_string(),
        })),
    }
}

pub fn load_source(name: &str, source: Option<&ResolvedSource>) -> LoadedSource {
    let source = match source {
        Some(s) => s,
        None => {
            warn!("No {} survey configured", name);
            return LoadedSource::Unavailable {
                name: name.to_string(),
                reason: "not configured".to_string(),
            };
        }
    };
    match read_survey_data(source) {
        Ok(ds) => LoadedSource::Available(ds),
        Err(e) => {
            error!("Cannot read the {} survey: {}", name, e);
            LoadedSource::Unavailable {
                name: name.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

fn delta(current: Option<u32>, previous: Option<u32>) -> Option<i64> {
    match (current, previous) {
        (Some(c), Some(p)) => Some(c as i64 - p as i64),
        _ => None,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

fn score_row_to_json(row: &ScoreRow) -> JSValue {
    let dimensions: Vec<JSValue> = row
        .dimensions
        .iter()
        .map(|(name, score)| json!({"dimension": name, "score": score}))
        .collect();
    json!({"dimensions": dimensions, "composite": row.composite})
}

fn score_table_to_json(table: &ScoreTable) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for (entity, row) in table.rows.iter() {
        res.insert(entity.clone(), score_row_to_json(row));
    }
    JSValue::Object(res)
}

fn dimension_means_to_json(means: &[(String, f64)]) -> JSValue {
    let l: Vec<JSValue> = means
        .iter()
        .map(|(name, m)| json!({"dimension": name, "score": round1(*m)}))
        .collect();
    JSValue::Array(l)
}

fn tally_to_json(t: &SentimentTally) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for (label, count) in t.entries() {
        res.insert(label.to_string(), json!(count));
    }
    res.insert("total".to_string(), json!(t.total()));
    let mut shares: JSMap<String, JSValue> = JSMap::new();
    for label in SentimentLabel::ALL {
        shares.insert(label.to_string(), json!(round1(t.share(label))));
    }
    res.insert("share".to_string(), JSValue::Object(shares));
    JSValue::Object(res)
}

fn comparison_js(current: Option<u32>, previous: Option<u32>) -> JSValue {
    json!({"current": current, "previous": previous, "delta": delta(current, previous)})
}

// The data of one month, as needed by the report.
struct MonthView {
    dataset: Dataset,
    scores: ScoreTable,
}

impl MonthView {
    fn new(ds: &Dataset, month: &str) -> MonthView {
        let dataset = filter_by_month(ds, month);
        let scores = scores_by_entity(&dataset);
        MonthView { dataset, scores }
    }
}

fn store_detail_js(
    settings: &ReportSettings,
    store: &str,
    current: &MonthView,
    previous: Option<&MonthView>,
) -> JSValue {
    let cur_rows = filter_by_entity(&current.dataset, store);
    let cur_score = current.scores.get(store);
    let prev_score = previous.and_then(|p| p.scores.get(store));
    let revisit_cur = revisit_rate_for(&current.dataset, store, &settings.affirmative_response);
    let revisit_prev = previous
        .map(|p| revisit_rate_for(&p.dataset, store, &settings.affirmative_response));

    if cur_rows.is_empty() {
        warn!(
            "{}: no respondent in {}",
            store, settings.current_month
        );
    }

    let dimensions: Vec<JSValue> = current
        .dataset
        .schema
        .dimension_columns
        .iter()
        .map(|name| {
            let c = cur_score.and_then(|r| r.dimension(name));
            let p = prev_score.and_then(|r| r.dimension(name));
            json!({"dimension": name, "current": c, "previous": p, "delta": delta(c, p)})
        })
        .collect();

    let sentiment = tally(&settings.lexicon, cur_rows.comments());
    let comments: Vec<JSValue> = label_comments(&settings.lexicon, cur_rows.comments())
        .iter()
        .map(|lc| json!({"comment": lc.comment, "label": lc.label.to_string()}))
        .collect();
    info!(
        "{}: satisfaction {:?}, revisit {}%, comments {:?}",
        store,
        cur_score.map(|r| r.composite),
        revisit_cur,
        sentiment.entries()
    );

    json!({
        "store": store,
        "respondents": cur_rows.len(),
        "satisfaction": comparison_js(cur_score.map(|r| r.composite), prev_score.map(|r| r.composite)),
        "revisitRate": comparison_js(Some(revisit_cur), revisit_prev),
        "dimensions": dimensions,
        "sentiment": tally_to_json(&sentiment),
        "comments": comments,
        "wordcloudText": wordcloud_corpus(&settings.lexicon, cur_rows.comments()),
    })
}

/// Assembles the whole report. Sections depending on an unavailable source are null.
pub fn build_report_js(
    settings: &ReportSettings,
    offline: &LoadedSource,
    online: &LoadedSource,
) -> JSValue {
    let cur_month = settings.current_month.as_str();
    let prev_month = settings.previous_month.as_deref();

    let offline_cur = offline.dataset().map(|ds| MonthView::new(ds, cur_month));
    let offline_prev = offline
        .dataset()
        .zip(prev_month)
        .map(|(ds, m)| MonthView::new(ds, m));

    let online_cur = online
        .dataset()
        .map(|ds| scores_overall(&filter_by_month(ds, cur_month)));
    let online_prev = online
        .dataset()
        .zip(prev_month)
        .map(|(ds, m)| scores_overall(&filter_by_month(ds, m)));

    // Summary for all the channels.
    let summary_stores: Option<Vec<JSValue>> = offline_cur.as_ref().map(|cur| {
        settings
            .stores
            .iter()
            .map(|store| {
                let c = cur.scores.composite(store);
                let p = offline_prev.as_ref().and_then(|p| p.scores.composite(store));
                json!({"store": store, "satisfaction": c, "delta": delta(c, p)})
            })
            .collect()
    });
    let summary_online: Option<JSValue> = online_cur.as_ref().map(|cur| {
        let c = cur.as_ref().map(|r| r.composite);
        let p = online_prev
            .as_ref()
            .and_then(|p| p.as_ref())
            .map(|r| r.composite);
        json!({"satisfaction": c, "delta": delta(c, p)})
    });

    let offline_js: Option<JSValue> = offline_cur.as_ref().map(|cur| {
        if cur.scores.is_empty() {
            warn!("offline: no score for {}", cur_month);
        }
        json!({
            "respondents": cur.dataset.len(),
            "scores": score_table_to_json(&cur.scores),
            "dimensionMeans": {
                "current": dimension_means_to_json(&cur.scores.dimension_means()),
                "previous": offline_prev.as_ref().map(|p| dimension_means_to_json(&p.scores.dimension_means())),
            },
        })
    });

    let online_js: Option<JSValue> = online_cur
        .as_ref()
        .map(|cur| json!({"scores": cur.as_ref().map(score_row_to_json)}));

    let stores_js: Option<Vec<JSValue>> = offline_cur.as_ref().map(|cur| {
        settings
            .stores
            .iter()
            .map(|store| store_detail_js(settings, store, cur, offline_prev.as_ref()))
            .collect()
    });

    let unavailable: Vec<JSValue> = [offline, online]
        .iter()
        .filter_map(|ls| match ls {
            LoadedSource::Unavailable { name, reason } => {
                Some(json!({"source": name, "reason": reason}))
            }
            LoadedSource::Available(_) => None,
        })
        .collect();

    json!({
        "config": {
            "reportName": settings.report_name,
            "currentMonth": settings.current_month,
            "previousMonth": settings.previous_month,
        },
        "summary": {"stores": summary_stores, "online": summary_online},
        "offline": offline_js,
        "online": online_js,
        "stores": stores_js,
        "unavailable": unavailable,
    })
}

fn write_output(output_path: Option<&str>, contents: &str) -> BReportResult<()> {
    match output_path {
        None | Some("stdout") | Some("") => {
            println!("{}", contents);
        }
        Some(path) => {
            fs::write(path, contents).context(WritingOutputSnafu { path })?;
            info!("Report written to {}", path);
        }
    }
    Ok(())
}

fn read_reference(path: &str) -> BReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_report(settings: &ReportSettings, check_reference_path: Option<String>) -> BReportResult<()> {
    info!(
        "Report {:?}: {} compared to {:?}",
        settings.report_name, settings.current_month, settings.previous_month
    );
    let offline = load_source("offline", settings.offline.as_ref());
    let online = load_source("online", settings.online.as_ref());

    let report_js = build_report_js(settings, &offline, &online);
    let pretty_js_report = serde_json::to_string_pretty(&report_js).context(EncodingJsonSnafu {})?;
    debug!("report: {}", pretty_js_report);
    write_output(settings.output_path.as_deref(), &pretty_js_report)?;

    // The reference report, if provided for comparison
    if let Some(reference_p) = check_reference_path {
        let reference = read_reference(&reference_p)?;
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference).context(EncodingJsonSnafu {})?;
        if pretty_js_reference != pretty_js_report {
            warn!("Found differences with the reference report");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_report.as_ref(),
                "\n",
            );
            return Err(Box::new(ReportError::ReferenceMismatch { path: reference_p }));
        }
        info!("The report matches the reference {}", reference_p);
    }
    Ok(())
}
