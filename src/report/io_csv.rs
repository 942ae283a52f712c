// Primitives for reading CSV files.

use crate::report::{
    io_common::{assemble_dataset, header_names, RawCell},
    *,
};

pub fn read_csv_survey(path: &str, schema: &DatasetSchema) -> BReportResult<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let header_cells: Vec<RawCell> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(RawCell::from_text)
        .collect();
    let header = header_names(&header_cells);

    let rows = rdr
        .into_records()
        .enumerate()
        .map(|(idx, line_r)| -> BReportResult<Vec<RawCell>> {
            // The header takes the first line.
            let lineno = idx + 2;
            let line = line_r.context(CsvLineParseSnafu { lineno })?;
            Ok(line.iter().map(RawCell::from_text).collect())
        });
    assemble_dataset(path, schema, &header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const OFFLINE: &str = "\u{feff}점포,시작일시,직원 서비스,정보 제공,상품 준비,신속 결제,매장 환경,재이용의향률,추가 의견
명동점,2024-09-02 10:12:00,7,6,7,6,7,예.,직원분들이 친절해서 좋았어요
부산점,2024-09-03 14:40:00,5,5,4,3,5,아니오.,
,2024-09-03 14:41:00,5,5,4,3,5,아니오.,
인천공항점,2024-08-30 09:00:00,6,,6,6,6,예.,\"대기가 길어서, 불편했어요\"
";

    #[test]
    fn read_offline_csv() {
        let f = write_tmp(OFFLINE);
        let path = f.path().display().to_string();
        let ds = read_csv_survey(&path, &DatasetSchema::offline()).unwrap();
        // The row without a store is dropped.
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.rows[0].entity, "명동점");
        assert_eq!(ds.rows[0].started_at, "2024-09-02 10:12:00");
        assert_eq!(ds.rows[0].revisit, "예.");
        assert_eq!(
            ds.rows[0].comment.as_deref(),
            Some("직원분들이 친절해서 좋았어요")
        );
        assert_eq!(ds.rows[1].comment, None);
        assert_eq!(ds.rows[2].ratings[1], None);
        assert_eq!(
            ds.rows[2].comment.as_deref(),
            Some("대기가 길어서, 불편했어요")
        );
    }

    #[test]
    fn missing_file() {
        let res = read_csv_survey("/nonexistent/240809off.csv", &DatasetSchema::offline());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(ReportError::OpeningCsv { .. })
        ));
    }

    #[test]
    fn wrong_schema() {
        let f = write_tmp(OFFLINE);
        let path = f.path().display().to_string();
        // The offline file does not have the online columns.
        let res = read_csv_survey(&path, &DatasetSchema::online());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(ReportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn ragged_line() {
        let content = OFFLINE.replace(",예.,직원분들이", ",예.,extra,직원분들이");
        let f = write_tmp(&content);
        let path = f.path().display().to_string();
        let res = read_csv_survey(&path, &DatasetSchema::offline());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(ReportError::CsvLineParse { lineno: 2, .. })
        ));
    }
}
