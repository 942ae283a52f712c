// Primitives shared by the CSV and Excel readers.

use std::path::Path;

use survey_metrics::builder::Builder;

use crate::report::*;

/// The content of a cell, before it is checked against the schema.
#[derive(PartialEq, Debug, Clone)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    pub fn from_text(s: &str) -> RawCell {
        if s.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }

    /// The cell as text. Empty cells are None.
    fn to_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(n) => Some(format_number(*n)),
        }
    }
}

// Integral values are printed without a decimal part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The cleaned up names of the header row.
pub fn header_names(header: &[RawCell]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let s = c.to_text().unwrap_or_default();
            // Files exported from Excel often start with a byte order mark.
            let s = if idx == 0 {
                s.trim_start_matches('\u{feff}').to_string()
            } else {
                s
            };
            s.trim().to_string()
        })
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct ColumnIndexes {
    entity: Option<usize>,
    timestamp: usize,
    dimensions: Vec<usize>,
    revisit: usize,
    comment: Option<usize>,
}

fn get_col_index(path: &str, header: &[String], column: &str) -> BReportResult<usize> {
    let idx = header
        .iter()
        .position(|h| h == column)
        .context(MissingColumnSnafu { path, column })?;
    Ok(idx)
}

fn get_col_indexes(
    path: &str,
    header: &[String],
    schema: &DatasetSchema,
) -> BReportResult<ColumnIndexes> {
    let entity = match &schema.entity_column {
        Some(c) => Some(get_col_index(path, header, c)?),
        None => None,
    };
    let comment = match &schema.comment_column {
        Some(c) => Some(get_col_index(path, header, c)?),
        None => None,
    };
    let mut dimensions: Vec<usize> = Vec::new();
    for c in schema.dimension_columns.iter() {
        dimensions.push(get_col_index(path, header, c)?);
    }
    Ok(ColumnIndexes {
        entity,
        timestamp: get_col_index(path, header, &schema.timestamp_column)?,
        dimensions,
        revisit: get_col_index(path, header, &schema.revisit_column)?,
        comment,
    })
}

fn read_rating(
    cell: &RawCell,
    path: &str,
    lineno: usize,
    column: &str,
) -> BReportResult<Option<f64>> {
    match cell {
        RawCell::Empty => Ok(None),
        RawCell::Number(n) => Ok(Some(*n)),
        RawCell::Text(s) if s.trim().is_empty() => Ok(None),
        RawCell::Text(s) => {
            let x = s.trim().parse::<f64>().ok().context(InvalidRatingSnafu {
                path,
                lineno,
                column,
                content: s.clone(),
            })?;
            Ok(Some(x))
        }
    }
}

/// Checks all the rows against the schema and assembles the dataset.
///
/// `rows` are the data rows following the header; the header is line 1.
/// Rows with an empty store cell are dropped.
pub fn assemble_dataset<I>(
    path: &str,
    schema: &DatasetSchema,
    header: &[String],
    rows: I,
) -> BReportResult<Dataset>
where
    I: Iterator<Item = BReportResult<Vec<RawCell>>>,
{
    debug!("assemble_dataset: {:?}: header: {:?}", path, header);
    let cols = get_col_indexes(path, header, schema)?;
    debug!("assemble_dataset: {:?}: columns: {:?}", path, cols);
    let empty = RawCell::Empty;

    let mut builder = Builder::new(schema);
    for (idx, row_r) in rows.enumerate() {
        let lineno = idx + 2;
        let row = row_r?;
        let cell = |i: usize| row.get(i).unwrap_or(&empty);

        let entity = match cols.entity {
            Some(i) => match cell(i).to_text() {
                Some(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => {
                    warn!(
                        "assemble_dataset: {}: line {}: no store, skipping row",
                        simplify_file_name(path),
                        lineno
                    );
                    continue;
                }
            },
            None => schema.implicit_entity.clone(),
        };

        let mut ratings: Vec<Option<f64>> = Vec::new();
        for (i, column) in cols.dimensions.iter().zip(schema.dimension_columns.iter()) {
            ratings.push(read_rating(cell(*i), path, lineno, column)?);
        }

        let started_at = cell(cols.timestamp).to_text().unwrap_or_default();
        let revisit = cell(cols.revisit).to_text().unwrap_or_default();
        let comment = cols.comment.and_then(|i| cell(i).to_text());

        debug!(
            "assemble_dataset: lineno: {:?} entity: {:?} ratings: {:?}",
            lineno, entity, ratings
        );
        builder
            .add_row(&entity, &started_at, &ratings, &revisit, comment.as_deref())
            .context(InvalidRowSnafu { path, lineno })?;
    }
    info!(
        "Read {} rows from {}",
        builder.len(),
        simplify_file_name(path)
    );
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn online_header() -> Vec<String> {
        header(&[
            "시작일시",
            "로그인 접속",
            "상품 검색",
            "상품 준비",
            "상품 결제",
            "앱 사용성",
            "재이용의향률",
            "추가 의견",
        ])
    }

    fn text_row(cells: &[&str]) -> BReportResult<Vec<RawCell>> {
        Ok(cells.iter().map(|s| RawCell::from_text(s)).collect())
    }

    #[test]
    fn numbers_and_text_are_accepted() {
        let rows = vec![Ok(vec![
            RawCell::Text("2024-09-01 10:00:00".to_string()),
            RawCell::Number(7.0),
            RawCell::Text(" 6 ".to_string()),
            RawCell::Empty,
            RawCell::Number(5.0),
            RawCell::Number(4.0),
            RawCell::Text("예.".to_string()),
            RawCell::Empty,
        ])];
        let ds = assemble_dataset(
            "on.xlsx",
            &DatasetSchema::online(),
            &online_header(),
            rows.into_iter(),
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        let row = &ds.rows[0];
        assert_eq!(row.entity, "온라인");
        assert_eq!(row.ratings, [Some(7.0), Some(6.0), None, Some(5.0), Some(4.0)]);
        assert_eq!(row.comment, None);
    }

    #[test]
    fn missing_column_is_reported() {
        let mut h = online_header();
        h.retain(|c| c != "앱 사용성");
        let res = assemble_dataset(
            "on.csv",
            &DatasetSchema::online(),
            &h,
            Vec::new().into_iter(),
        );
        match res.map_err(|e| *e) {
            Err(ReportError::MissingColumn { column, .. }) => assert_eq!(column, "앱 사용성"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn bad_rating_gives_line_number() {
        let rows = vec![
            text_row(&["2024-09-01", "7", "7", "7", "7", "7", "예.", ""]),
            text_row(&["2024-09-01", "7", "좋음", "7", "7", "7", "예.", ""]),
        ];
        let res = assemble_dataset(
            "on.csv",
            &DatasetSchema::online(),
            &online_header(),
            rows.into_iter(),
        );
        match res.map_err(|e| *e) {
            Err(ReportError::InvalidRating {
                lineno,
                column,
                content,
                ..
            }) => {
                assert_eq!(lineno, 3);
                assert_eq!(column, "상품 검색");
                assert_eq!(content, "좋음");
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn rating_out_of_scale() {
        let rows = vec![text_row(&["2024-09-01", "7", "9", "7", "7", "7", "예.", ""])];
        let res = assemble_dataset(
            "on.csv",
            &DatasetSchema::online(),
            &online_header(),
            rows.into_iter(),
        );
        assert!(matches!(
            res.map_err(|e| *e),
            Err(ReportError::InvalidRow { lineno: 2, .. })
        ));
    }

    #[test]
    fn header_names_strip_bom() {
        let h = header_names(&[
            RawCell::Text("\u{feff}점포".to_string()),
            RawCell::Text(" 시작일시 ".to_string()),
            RawCell::Number(3.0),
        ]);
        assert_eq!(h, header(&["점포", "시작일시", "3"]));
    }

    #[test]
    fn simplify_path() {
        assert_eq!(simplify_file_name("/data/240809off.csv"), "240809off.csv");
    }
}
