use crate::args::Args;
use crate::report::*;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORES: &[&str] = &["명동점", "인천공항점", "부산점"];
pub const DEFAULT_AFFIRMATIVE_RESPONSE: &str = "예.";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "reportName")]
    pub report_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnSettings {
    #[serde(rename = "entityColumn")]
    pub entity_column: Option<String>,
    #[serde(rename = "timestampColumn")]
    pub timestamp_column: Option<String>,
    #[serde(rename = "dimensionColumns")]
    pub dimension_columns: Option<Vec<String>>,
    #[serde(rename = "revisitColumn")]
    pub revisit_column: Option<String>,
    #[serde(rename = "commentColumn")]
    pub comment_column: Option<String>,
    #[serde(rename = "implicitEntity")]
    pub implicit_entity: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub columns: Option<ColumnSettings>,
}

impl FileSource {
    /// The default layout, with the overrides of this source applied.
    pub fn schema(&self, default: &DatasetSchema) -> ReportResult<DatasetSchema> {
        let mut schema = default.clone();
        let cols = match &self.columns {
            Some(c) => c,
            None => return Ok(schema),
        };
        if let Some(c) = &cols.entity_column {
            // An empty name means there is no store column.
            schema.entity_column = if c.is_empty() { None } else { Some(c.clone()) };
        }
        if let Some(c) = &cols.timestamp_column {
            schema.timestamp_column = c.clone();
        }
        if let Some(dims) = &cols.dimension_columns {
            schema.dimension_columns = match dims.clone().try_into() {
                Ok(x) => x,
                Err(v) => {
                    let v: Vec<String> = v;
                    whatever!(
                        "{}: exactly {} dimension columns are expected, found {}",
                        self.file_path,
                        NUM_DIMENSIONS,
                        v.len()
                    )
                }
            };
        }
        if let Some(c) = &cols.revisit_column {
            schema.revisit_column = c.clone();
        }
        if let Some(c) = &cols.comment_column {
            schema.comment_column = if c.is_empty() { None } else { Some(c.clone()) };
        }
        if let Some(c) = &cols.implicit_entity {
            schema.implicit_entity = c.clone();
        }
        Ok(schema)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesConfig {
    pub offline: Option<FileSource>,
    pub online: Option<FileSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSettings {
    #[serde(rename = "currentMonth")]
    pub current_month: String,
    #[serde(rename = "previousMonth")]
    pub previous_month: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct LexiconSettings {
    pub stopwords: Option<Vec<String>>,
    #[serde(rename = "positiveKeywords")]
    pub positive_keywords: Option<Vec<String>>,
    #[serde(rename = "negativeKeywords")]
    pub negative_keywords: Option<Vec<String>>,
    #[serde(rename = "neutralKeywords")]
    pub neutral_keywords: Option<Vec<String>>,
}

impl LexiconSettings {
    /// Each list that is provided replaces the built-in one.
    pub fn lexicon(&self) -> SentimentLexicon {
        let pick = |o: &Option<Vec<String>>, default: &[&str]| -> Vec<String> {
            match o {
                Some(l) => l.clone(),
                None => default.iter().map(|s| s.to_string()).collect(),
            }
        };
        SentimentLexicon::from_lists(
            &pick(&self.stopwords, DEFAULT_STOPWORDS),
            &pick(&self.positive_keywords, DEFAULT_POSITIVE_KEYWORDS),
            &pick(&self.negative_keywords, DEFAULT_NEGATIVE_KEYWORDS),
            &pick(&self.neutral_keywords, DEFAULT_NEUTRAL_KEYWORDS),
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(default)]
    pub sources: SourcesConfig,
    pub period: Option<PeriodSettings>,
    pub stores: Option<Vec<String>>,
    #[serde(rename = "affirmativeResponse")]
    pub affirmative_response: Option<String>,
    pub lexicon: Option<LexiconSettings>,
}

/// A source that is ready to be read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolvedSource {
    pub provider: String,
    pub path: String,
    pub worksheet_name: Option<String>,
    pub schema: DatasetSchema,
}

/// Everything needed to run a report, after the command line and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub report_name: String,
    pub output_path: Option<String>,
    pub offline: Option<ResolvedSource>,
    pub online: Option<ResolvedSource>,
    pub current_month: String,
    pub previous_month: Option<String>,
    pub stores: Vec<String>,
    pub affirmative_response: String,
    pub lexicon: SentimentLexicon,
}

pub fn read_config(path: &str) -> BReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// The month before a `YYYY-MM` token, if the token has this shape.
pub fn previous_month_of(month: &str) -> Option<String> {
    let first_day = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    let (year, month) = if first_day.month() == 1 {
        (first_day.year() - 1, 12)
    } else {
        (first_day.year(), first_day.month() - 1)
    };
    Some(format!("{:04}-{:02}", year, month))
}

fn resolve_source(
    root: &Path,
    source: &FileSource,
    default_schema: &DatasetSchema,
) -> ReportResult<ResolvedSource> {
    let p: PathBuf = root.join(&source.file_path);
    Ok(ResolvedSource {
        provider: source.provider.clone(),
        path: p.as_path().display().to_string(),
        worksheet_name: source.excel_worksheet_name.clone(),
        schema: source.schema(default_schema)?,
    })
}

// The command line takes precedence over the configuration file.
fn override_source(
    config_source: Option<FileSource>,
    path_o: &Option<String>,
    args: &Args,
) -> Option<FileSource> {
    match (config_source, path_o) {
        (cs, None) => cs,
        (Some(cs), Some(path)) => Some(FileSource {
            provider: args.input_type.clone().unwrap_or(cs.provider),
            file_path: path.clone(),
            excel_worksheet_name: args
                .excel_worksheet_name
                .clone()
                .or(cs.excel_worksheet_name),
            columns: cs.columns,
        }),
        (None, Some(path)) => Some(FileSource {
            provider: args.input_type.clone().unwrap_or_else(|| "csv".to_string()),
            file_path: path.clone(),
            excel_worksheet_name: args.excel_worksheet_name.clone(),
            columns: None,
        }),
    }
}

/// Merges the configuration file (if any) with the command line.
pub fn build_config(args: &Args) -> BReportResult<ReportSettings> {
    let (config, root_p): (ReportConfig, PathBuf) = match &args.config {
        Some(config_path) => {
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (read_config(config_path)?, root)
        }
        None => (ReportConfig::default(), PathBuf::new()),
    };
    info!("config: {:?}", config);

    let offline_cs = override_source(config.sources.offline.clone(), &args.offline, args);
    let online_cs = override_source(config.sources.online.clone(), &args.online, args);
    if offline_cs.is_none() && online_cs.is_none() {
        return Err(Box::new(ReportError::InvalidConfig {
            message: "no survey source: use --offline, --online or a configuration file"
                .to_string(),
        }));
    }

    // Paths given on the command line are taken as they are.
    let offline_root = if args.offline.is_some() {
        Path::new("")
    } else {
        root_p.as_path()
    };
    let online_root = if args.online.is_some() {
        Path::new("")
    } else {
        root_p.as_path()
    };
    let offline = match &offline_cs {
        Some(cs) => Some(resolve_source(offline_root, cs, &DatasetSchema::offline())?),
        None => None,
    };
    let online = match &online_cs {
        Some(cs) => Some(resolve_source(online_root, cs, &DatasetSchema::online())?),
        None => None,
    };

    let current_month = match (&args.month, &config.period) {
        (Some(m), _) => m.clone(),
        (None, Some(p)) => p.current_month.clone(),
        (None, None) => {
            return Err(Box::new(ReportError::InvalidConfig {
                message: "no month to report on: use --month or period.currentMonth".to_string(),
            }));
        }
    };
    let previous_month = args
        .previous_month
        .clone()
        .or_else(|| {
            config
                .period
                .as_ref()
                .filter(|_| args.month.is_none())
                .and_then(|p| p.previous_month.clone())
        })
        .or_else(|| previous_month_of(&current_month));
    if previous_month.is_none() {
        warn!(
            "Cannot infer the month before {:?}: no comparison will be made",
            current_month
        );
    }

    let output_settings = config.output_settings.clone().unwrap_or_default();
    let output_path = match &args.out {
        Some(out) => Some(out.clone()),
        None => output_settings
            .output_path
            .map(|p| root_p.join(p).as_path().display().to_string()),
    };

    Ok(ReportSettings {
        report_name: output_settings
            .report_name
            .unwrap_or_else(|| format!("{} 고객만족도", current_month)),
        output_path,
        offline,
        online,
        current_month,
        previous_month,
        stores: args
            .stores
            .clone()
            .or(config.stores)
            .unwrap_or_else(|| DEFAULT_STORES.iter().map(|s| s.to_string()).collect()),
        affirmative_response: config
            .affirmative_response
            .unwrap_or_else(|| DEFAULT_AFFIRMATIVE_RESPONSE.to_string()),
        lexicon: config.lexicon.unwrap_or_default().lexicon(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(cli: &[&str]) -> Args {
        let mut all = vec!["survey-report"];
        all.extend_from_slice(cli);
        Args::parse_from(all)
    }

    #[test]
    fn previous_month() {
        assert_eq!(previous_month_of("2024-09"), Some("2024-08".to_string()));
        assert_eq!(previous_month_of("2024-01"), Some("2023-12".to_string()));
        assert_eq!(previous_month_of("9월"), None);
    }

    #[test]
    fn command_line_only() {
        let a = args(&["--offline", "off.csv", "--month", "2024-09"]);
        let s = build_config(&a).unwrap();
        assert_eq!(s.current_month, "2024-09");
        assert_eq!(s.previous_month.as_deref(), Some("2024-08"));
        let off = s.offline.unwrap();
        assert_eq!(off.path, "off.csv");
        assert_eq!(off.provider, "csv");
        assert_eq!(off.schema, DatasetSchema::offline());
        assert_eq!(s.online, None);
        assert_eq!(s.stores.len(), 3);
        assert_eq!(s.affirmative_response, "예.");
        assert_eq!(s.lexicon, SentimentLexicon::default());
    }

    #[test]
    fn no_source() {
        let a = args(&["--month", "2024-09"]);
        assert!(build_config(&a).is_err());
    }

    #[test]
    fn no_month() {
        let a = args(&["--offline", "off.csv"]);
        assert!(build_config(&a).is_err());
    }

    #[test]
    fn config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("report.json");
        let mut f = fs::File::create(&config_path).unwrap();
        f.write_all(
            r#"{
                "outputSettings": { "reportName": "9월 고객만족도", "outputPath": "out.json" },
                "sources": {
                    "offline": { "provider": "csv", "filePath": "240809off.csv" },
                    "online": {
                        "provider": "xlsx",
                        "filePath": "240809on.xlsx",
                        "excelWorksheetName": "Sheet1",
                        "columns": { "commentColumn": "", "implicitEntity": "앱" }
                    }
                },
                "period": { "currentMonth": "2024-09", "previousMonth": "2024-07" },
                "stores": ["명동점"],
                "lexicon": { "negativeKeywords": ["별로"] }
            }"#
            .as_bytes(),
        )
        .unwrap();
        let config_s = config_path.display().to_string();

        let s = build_config(&args(&["--config", &config_s])).unwrap();
        assert_eq!(s.report_name, "9월 고객만족도");
        assert_eq!(s.previous_month.as_deref(), Some("2024-07"));
        assert_eq!(s.stores, vec!["명동점".to_string()]);
        let off = s.offline.unwrap();
        assert_eq!(off.path, dir.path().join("240809off.csv").display().to_string());
        let on = s.online.unwrap();
        assert_eq!(on.provider, "xlsx");
        assert_eq!(on.worksheet_name.as_deref(), Some("Sheet1"));
        assert_eq!(on.schema.comment_column, None);
        assert_eq!(on.schema.implicit_entity, "앱");
        assert_eq!(
            s.output_path,
            Some(dir.path().join("out.json").display().to_string())
        );
        assert_eq!(
            s.lexicon.classify("좋았는데 별로"),
            SentimentLabel::Positive
        );
        assert_eq!(s.lexicon.classify("불편"), SentimentLabel::Neutral);

        // The command line wins.
        let s = build_config(&args(&[
            "--config",
            &config_s,
            "--online",
            "other.csv",
            "--input-type",
            "csv",
            "--month",
            "2024-10",
            "--out",
            "stdout",
        ]))
        .unwrap();
        let on = s.online.unwrap();
        assert_eq!(on.path, "other.csv");
        assert_eq!(on.provider, "csv");
        assert_eq!(on.schema.implicit_entity, "앱");
        assert_eq!(s.current_month, "2024-10");
        assert_eq!(s.previous_month.as_deref(), Some("2024-09"));
        assert_eq!(s.output_path.as_deref(), Some("stdout"));
    }

    #[test]
    fn config_path_without_parent() {
        let res = build_config(&args(&["--config", "/", "--month", "2024-09"]));
        let e = res.map_err(|e| *e).unwrap_err();
        assert_eq!(
            e.to_string(),
            "The configuration path / has no parent directory"
        );
        assert!(matches!(e, ReportError::MissingParentDir { .. }));
    }

    #[test]
    fn wrong_dimension_count() {
        let fs_ = FileSource {
            provider: "csv".to_string(),
            file_path: "off.csv".to_string(),
            excel_worksheet_name: None,
            columns: Some(ColumnSettings {
                dimension_columns: Some(vec!["a".to_string(), "b".to_string()]),
                ..Default::default()
            }),
        };
        assert!(fs_.schema(&DatasetSchema::offline()).is_err());
    }
}
