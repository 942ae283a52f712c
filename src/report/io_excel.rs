// Primitives for reading Excel workbooks.

use calamine::DataType;
use chrono::NaiveDateTime;

use crate::report::{
    io_common::{assemble_dataset, header_names, RawCell},
    *,
};

/// The layout of the timestamps exported by the survey tool.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn read_excel_survey(
    path: &str,
    worksheet_name: Option<&str>,
    schema: &DatasetSchema,
) -> BReportResult<Dataset> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let header_cells = header_row
        .iter()
        .map(|c| read_cell(c, 1))
        .collect::<BReportResult<Vec<RawCell>>>()?;
    let header = header_names(&header_cells);

    let rows = iter.enumerate().map(|(idx, row)| {
        let lineno = idx + 2;
        row.iter()
            .map(|c| read_cell(c, lineno))
            .collect::<BReportResult<Vec<RawCell>>>()
    });
    assemble_dataset(path, schema, &header, rows)
}

fn read_cell(cell: &DataType, lineno: usize) -> BReportResult<RawCell> {
    match cell {
        DataType::Empty => Ok(RawCell::Empty),
        DataType::String(s) => Ok(RawCell::from_text(s)),
        DataType::Float(f) => Ok(RawCell::Number(*f)),
        DataType::Int(i) => Ok(RawCell::Number(*i as f64)),
        DataType::Bool(b) => Ok(RawCell::Text(b.to_string())),
        DataType::DateTime(_) => {
            let dt: NaiveDateTime = cell.as_datetime().context(ExcelWrongCellTypeSnafu {
                lineno,
                content: format!("{:?}", cell),
            })?;
            Ok(RawCell::Text(dt.format(TIMESTAMP_FORMAT).to_string()))
        }
        _ => Err(Box::new(ReportError::ExcelWrongCellType {
            lineno,
            content: format!("{:?}", cell),
        })),
    }
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> BReportResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_survey: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let names = workbook.sheet_names().to_owned();
        if names.len() > 1 {
            warn!(
                "read_excel_survey: {} has {} worksheets, using the first one ({:?})",
                path,
                names.len(),
                names.first()
            );
        }
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}
