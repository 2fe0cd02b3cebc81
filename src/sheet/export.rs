use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Deserialize;
use tracing::debug;

use super::SheetRow;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no rows to export")]
    Empty,
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => XLSX_CONTENT_TYPE,
            Self::Csv => CSV_CONTENT_TYPE,
        }
    }
}

/// Column order is the key order of the first row.
pub fn columns(rows: &[SheetRow]) -> Vec<&str> {
    rows.first()
        .map(|row| row.keys().collect())
        .unwrap_or_default()
}

pub fn export_to_xlsx(rows: &[SheetRow], sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let columns = columns(rows);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header = Format::new().set_bold();
    for (col, key) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *key, &header)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (col, key) in columns.iter().enumerate() {
            worksheet.write_string(line, col as u16, row.get(key).unwrap_or(""))?;
        }
    }

    worksheet.autofit();

    let buffer = workbook.save_to_buffer()?;
    debug!("Built xlsx with {} rows", rows.len());
    Ok(buffer)
}

pub fn export_to_csv(rows: &[SheetRow]) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let columns = columns(rows);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for row in rows {
        writer.write_record(columns.iter().map(|key| row.get(key).unwrap_or("")))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))
}

/// A finished download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn build(
        rows: &[SheetRow],
        base_name: &str,
        sheet_name: &str,
        format: ExportFormat,
    ) -> Result<Self, ExportError> {
        let bytes = match format {
            ExportFormat::Xlsx => export_to_xlsx(rows, sheet_name)?,
            ExportFormat::Csv => export_to_csv(rows)?,
        };

        Ok(Self {
            file_name: format!("{}.{}", base_name, format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<SheetRow> {
        vec![
            SheetRow::new()
                .with("Data", "10/01/2024")
                .with("Suporte", "Chat")
                .with("Motivo", "r1"),
            SheetRow::new()
                .with("Suporte", "Voz")
                .with("Data", "11/01/2024")
                .with("Extra", "ignored"),
        ]
    }

    #[test]
    fn test_columns_follow_first_row() {
        assert_eq!(columns(&rows()), vec!["Data", "Suporte", "Motivo"]);
    }

    #[test]
    fn test_csv_uses_first_row_columns() {
        let bytes = export_to_csv(&rows()).expect("csv");
        let text = String::from_utf8(bytes).expect("utf8");

        assert_eq!(
            text,
            "Data,Suporte,Motivo\n10/01/2024,Chat,r1\n11/01/2024,Voz,\n"
        );
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let bytes = export_to_xlsx(&rows(), "Tickets").expect("xlsx");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_rows_are_refused() {
        assert!(matches!(export_to_csv(&[]), Err(ExportError::Empty)));
        assert!(matches!(export_to_xlsx(&[], "Tickets"), Err(ExportError::Empty)));
    }

    #[test]
    fn test_export_file_response_headers() {
        let file = ExportFile::build(&rows(), "relatorio-tickets", "Tickets", ExportFormat::Csv)
            .expect("build");
        assert_eq!(file.file_name, "relatorio-tickets.csv");

        let response = file.into_response();
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"relatorio-tickets.csv\"")
        );
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some(CSV_CONTENT_TYPE)
        );
    }
}
