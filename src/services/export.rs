//! Export service: renders a filtered disruption list as a download.
//!
//! DESIGN
//! ======
//! Every format renders from the same slice. CSV and XLSX use a flat row
//! (location split into longitude/latitude, timestamp as RFC 3339) so
//! spreadsheet tools get one scalar per cell. JSON is the pretty-printed
//! record array in wire shape. NDJSON leads with a meta line and then one
//! record per line so large exports can stream. PDF is a landscape A4
//! report: title block, then the same flat rows as a text table that
//! continues across pages with the header repeated.
//!
//! An empty input renders nothing; callers map `ExportError::Empty` to 204.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Disruption;

pub const FILENAME_PREFIX: &str = "supply-chain-disruptions";
pub const XLSX_SHEET_NAME: &str = "Data";

pub const COLUMNS: [&str; 12] = [
    "id",
    "type",
    "locationName",
    "region",
    "longitude",
    "latitude",
    "severity",
    "status",
    "confidence",
    "affectedRoutes",
    "timestamp",
    "description",
];

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xlsx encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf encoding failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

impl crate::frame::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_EXPORT_EMPTY",
            Self::UnsupportedFormat(_) => "E_UNSUPPORTED_FORMAT",
            Self::Csv(_) | Self::Json(_) | Self::Xlsx(_) | Self::Pdf(_) => "E_EXPORT_FAILED",
        }
    }
}

// =============================================================================
// FORMAT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Ndjson,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    /// # Errors
    ///
    /// Returns `ExportError::UnsupportedFormat` for anything else.
    pub fn parse(raw: &str) -> Result<Self, ExportError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            "xlsx" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "jsonl",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Ndjson => "application/x-ndjson; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

// =============================================================================
// ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location_name: String,
    pub region: String,
    pub longitude: f64,
    pub latitude: f64,
    pub severity: String,
    pub status: String,
    pub confidence: f64,
    pub affected_routes: u32,
    pub timestamp: String,
    pub description: String,
}

impl From<&Disruption> for ExportRow {
    fn from(d: &Disruption) -> Self {
        Self {
            id: d.id.clone(),
            kind: d.kind.clone(),
            location_name: d.location_name.clone(),
            region: d.region.as_str().to_string(),
            longitude: d.longitude(),
            latitude: d.latitude(),
            severity: d.severity.as_str().to_string(),
            status: d.status.as_str().to_string(),
            confidence: d.confidence,
            affected_routes: d.affected_routes,
            timestamp: d.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            description: d.description.clone(),
        }
    }
}

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl ExportRow {
    fn cells(&self) -> [Cell<'_>; 12] {
        [
            Cell::Text(&self.id),
            Cell::Text(&self.kind),
            Cell::Text(&self.location_name),
            Cell::Text(&self.region),
            Cell::Number(self.longitude),
            Cell::Number(self.latitude),
            Cell::Text(&self.severity),
            Cell::Text(&self.status),
            Cell::Number(self.confidence),
            Cell::Number(f64::from(self.affected_routes)),
            Cell::Text(&self.timestamp),
            Cell::Text(&self.description),
        ]
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// A rendered export. `chunks` is one element per NDJSON line and a single
/// element for every other format.
#[derive(Debug)]
pub struct Rendered {
    pub format: ExportFormat,
    pub filename: String,
    pub chunks: Vec<Vec<u8>>,
}

impl Rendered {
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Vec::is_empty)
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// `supply-chain-disruptions-2026-05-12.csv`
#[must_use]
pub fn filename(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("{FILENAME_PREFIX}-{}.{}", now.format("%Y-%m-%d"), format.extension())
}

/// # Errors
///
/// `ExportError::Empty` when `records` is empty, otherwise any encoder
/// failure.
pub fn render(format: ExportFormat, records: &[Disruption], now: DateTime<Utc>) -> Result<Rendered, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let chunks = match format {
        ExportFormat::Csv => vec![to_csv(records)?],
        ExportFormat::Json => vec![to_json(records)?],
        ExportFormat::Ndjson => to_ndjson_lines(records, now)?,
        ExportFormat::Xlsx => vec![to_xlsx(records)?],
        ExportFormat::Pdf => vec![to_pdf(records, now)?],
    };
    Ok(Rendered { format, filename: filename(format, now), chunks })
}

/// Header row plus one flat row per record.
///
/// # Errors
///
/// Propagates `csv` write failures.
pub fn to_csv(records: &[Disruption]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }
    writer.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))
}

/// Pretty-printed array in wire shape.
///
/// # Errors
///
/// Propagates `serde_json` failures.
pub fn to_json(records: &[Disruption]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(records)?)
}

#[derive(Serialize)]
struct NdjsonMetaLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    version: u8,
    exported_at: DateTime<Utc>,
    record_count: usize,
}

#[derive(Serialize)]
struct NdjsonRecordLine<'a> {
    #[serde(rename = "type")]
    line_type: &'static str,
    record: &'a Disruption,
}

/// Meta line first, then one `{"type":"disruption","record":{..}}` per line.
///
/// # Errors
///
/// Propagates `serde_json` failures.
pub fn to_ndjson_lines(records: &[Disruption], now: DateTime<Utc>) -> Result<Vec<Vec<u8>>, ExportError> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    let meta = NdjsonMetaLine {
        line_type: "disruption_export_meta",
        version: 1,
        exported_at: now,
        record_count: records.len(),
    };
    lines.push(json_line(&meta)?);
    for record in records {
        lines.push(json_line(&NdjsonRecordLine { line_type: "disruption", record })?);
    }
    Ok(lines)
}

fn json_line<T: Serialize>(value: &T) -> Result<Vec<u8>, ExportError> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    Ok(line)
}

/// Single "Data" sheet: header row, one row per record, columns sized to
/// their widest cell.
///
/// # Errors
///
/// Propagates `rust_xlsxwriter` failures.
pub fn to_xlsx(records: &[Disruption]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let header = rust_xlsxwriter::Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET_NAME)?;

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }

    for (row, record) in (1u32..).zip(records) {
        let flat = ExportRow::from(record);
        for ((col, cell), width) in (0u16..).zip(flat.cells()).zip(widths.iter_mut()) {
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, col, text)?;
                    *width = (*width).max(text.chars().count());
                }
                Cell::Number(n) => {
                    sheet.write_number(row, col, n)?;
                    *width = (*width).max(n.to_string().len());
                }
            }
        }
    }

    for (col, width) in (0u16..).zip(widths) {
        #[allow(clippy::cast_precision_loss)]
        sheet.set_column_width(col, (width + 2) as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

pub const PDF_TITLE: &str = "Supply Chain Disruptions Report";

const PDF_PAGE_WIDTH: f32 = 297.0;
const PDF_PAGE_HEIGHT: f32 = 210.0;
const PDF_MARGIN: f32 = 14.0;
const PDF_TABLE_TOP: f32 = 45.0;
const PDF_ROW_HEIGHT: f32 = 4.5;
const PDF_TABLE_FONT_SIZE: f32 = 7.0;
/// Rough Helvetica advance at the table font size.
const PDF_CHAR_WIDTH: f32 = 1.3;
/// Column widths in millimetres, summing to the printable width.
const PDF_COLUMN_WIDTHS: [f32; 12] = [20.0, 26.0, 24.0, 20.0, 15.0, 15.0, 14.0, 16.0, 16.0, 18.0, 36.0, 49.0];

/// Landscape A4 report: title, generation time, record count, then one
/// table row per record. Pages break at the bottom margin and repeat the
/// header row.
///
/// # Errors
///
/// Propagates `printpdf` font and serialization failures.
pub fn to_pdf(records: &[Disruption], now: DateTime<Utc>) -> Result<Vec<u8>, ExportError> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    let (doc, page, layer) = PdfDocument::new(PDF_TITLE, Mm(PDF_PAGE_WIDTH), Mm(PDF_PAGE_HEIGHT), "Table");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    // printpdf measures y from the bottom edge; the layout reads top-down.
    let at = |top: f32| Mm(PDF_PAGE_HEIGHT - top);

    let mut layer = doc.get_page(page).get_layer(layer);
    layer.use_text(PDF_TITLE, 18.0, Mm(PDF_MARGIN), at(22.0), &bold);
    layer.use_text(
        format!("Generated: {}", now.format("%Y-%m-%d %H:%M:%S UTC")),
        10.0,
        Mm(PDF_MARGIN),
        at(32.0),
        &regular,
    );
    layer.use_text(format!("Total Records: {}", records.len()), 10.0, Mm(PDF_MARGIN), at(38.0), &regular);

    let header: Vec<String> = COLUMNS.iter().map(|c| (*c).to_string()).collect();
    for (index, rows) in pdf_pages(records.len()).into_iter().enumerate() {
        let mut top = PDF_TABLE_TOP;
        if index > 0 {
            let (page, next) = doc.add_page(Mm(PDF_PAGE_WIDTH), Mm(PDF_PAGE_HEIGHT), "Table");
            layer = doc.get_page(page).get_layer(next);
            top = PDF_MARGIN;
        }
        pdf_row(&layer, &header, at(top), &bold);
        for record in &records[rows] {
            top += PDF_ROW_HEIGHT;
            let row: Vec<String> = ExportRow::from(record)
                .cells()
                .iter()
                .map(|cell| match cell {
                    Cell::Text(text) => (*text).to_string(),
                    Cell::Number(n) => n.to_string(),
                })
                .collect();
            pdf_row(&layer, &row, at(top), &regular);
        }
    }

    Ok(doc.save_to_bytes()?)
}

/// Record index ranges per page. The first page starts its table below the
/// title block; later pages start at the top margin.
fn pdf_pages(count: usize) -> Vec<std::ops::Range<usize>> {
    let rows_below = |header_top: f32| {
        let free = PDF_PAGE_HEIGHT - PDF_MARGIN - header_top;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rows = (free / PDF_ROW_HEIGHT).floor() as usize;
        rows.max(1)
    };

    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = rows_below(PDF_TABLE_TOP);
    while start < count {
        let end = (start + capacity).min(count);
        pages.push(start..end);
        start = end;
        capacity = rows_below(PDF_MARGIN);
    }
    pages
}

fn pdf_row(layer: &printpdf::PdfLayerReference, cells: &[String], y: printpdf::Mm, font: &printpdf::IndirectFontRef) {
    let mut x = PDF_MARGIN;
    for (text, width) in cells.iter().zip(PDF_COLUMN_WIDTHS) {
        layer.use_text(fit_cell(text, width), PDF_TABLE_FONT_SIZE, printpdf::Mm(x), y, font);
        x += width;
    }
}

/// Builtin fonts only cover ASCII reliably; anything else prints as `?`.
/// Text wider than the column is cut with a trailing `...`.
fn fit_cell(text: &str, width_mm: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_chars = ((width_mm - 1.0) / PDF_CHAR_WIDTH).max(4.0) as usize;
    let ascii: String = text.chars().map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' }).collect();
    if ascii.len() <= max_chars {
        return ascii;
    }
    let mut cut: String = ascii.chars().take(max_chars - 3).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
