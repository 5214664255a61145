use crate::clipboard::write_rows_markup;
use crate::html;
use crate::notify::{Notifier, Severity, messages};
use crate::table::Table;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Fill applied to odd body rows that have no class color of their own.
pub const BANDING_COLOR: &str = "F9FAFB";
/// Fill of body rows without a class color.
pub const PLAIN_ROW_COLOR: &str = "FFFFFF";
/// Border color of every exported cell.
pub const BORDER_COLOR: &str = "333333";

/// Excel export configuration
///
/// Colors are six digit RGB hex strings without a leading `#`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExcelSettings {
    /// Name of the generated file, `.xlsx` extension included.
    pub file_name: String,

    /// Name of the single worksheet
    pub sheet_name: String,

    /// Row CSS class to fill color, checked in order; the first class contained
    /// in a row's class attribute wins.
    pub row_colors: Vec<(String, String)>,

    /// Fill of header rows
    pub header_color: String,

    /// Width applied to every column, in characters
    pub col_width: f64,
}

impl Default for ExcelSettings {
    fn default() -> Self {
        let row_colors = [
            ("row-theory", "FFFFFF"),
            ("row-practical", "F0FDF4"),
            ("row-coop", "FFFBEB"),
            ("row-mixed", "F5F3FF"),
            ("row-self", "FCE7F3"),
        ]
        .iter()
        .map(|(class, color)| (class.to_string(), color.to_string()))
        .collect();

        Self {
            file_name: "تقرير.xlsx".to_string(),
            sheet_name: "البيانات".to_string(),
            row_colors,
            header_color: "1E3A5F".to_string(),
            col_width: 12.0,
        }
    }
}

impl ExcelSettings {
    /// Fill color for the body row at `body_index` with the given class attribute.
    pub fn body_fill(&self, class: &str, body_index: usize) -> &str {
        let color = self
            .row_colors
            .iter()
            .find(|(name, _)| class.contains(name.as_str()))
            .map_or(PLAIN_ROW_COLOR, |(_, color)| color.as_str());

        if color == PLAIN_ROW_COLOR && body_index % 2 == 1 {
            BANDING_COLOR
        } else {
            color
        }
    }

    /// File name for the legacy HTML workbook.
    pub fn legacy_file_name(&self) -> String {
        self.file_name.replace(".xlsx", ".xls")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[cfg(feature = "xlsx")]
    #[error("xlsx writer failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("invalid color {0:?}, expected six hex digits")]
    InvalidColor(String),
    #[error("xlsx support is not compiled in")]
    Unsupported,
}

/// Which writer produced an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExcelFormat {
    Xlsx,
    /// HTML table saved with an `.xls` name, opened by Excel in compatibility mode.
    LegacyHtml,
}

#[derive(Clone, Debug)]
pub struct ExcelExport {
    pub file_name: String,
    pub format: ExcelFormat,
    pub bytes: Vec<u8>,
}

impl ExcelExport {
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ExcelFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExcelFormat::LegacyHtml => "application/vnd.ms-excel",
        }
    }

    /// Base64 `data:` URI suitable for a download link.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

/// Export a table to Excel, falling back to the legacy HTML workbook.
///
/// The xlsx writer is tried first; if it fails (or is not compiled in) a
/// warning is reported and the legacy workbook is produced instead, so this
/// always returns a file.
pub fn export_to_excel(
    table: &Table,
    settings: &ExcelSettings,
    notifier: &dyn Notifier,
) -> ExcelExport {
    notifier.notify(messages::EXCEL_STARTED, Severity::Info);

    match to_xlsx(table, settings) {
        Ok(bytes) => {
            info!("exported {} rows to {}", table.row_count(), settings.file_name);
            notifier.notify(messages::EXCEL_DONE, Severity::Success);
            ExcelExport {
                file_name: settings.file_name.clone(),
                format: ExcelFormat::Xlsx,
                bytes,
            }
        }
        Err(err) => {
            warn!("XLSX export error: {}", err);
            notifier.notify(messages::EXCEL_FALLBACK, Severity::Warning);
            let bytes = to_legacy_xls(table, settings);
            notifier.notify(messages::EXCEL_LEGACY_DONE, Severity::Success);
            ExcelExport {
                file_name: settings.legacy_file_name(),
                format: ExcelFormat::LegacyHtml,
                bytes,
            }
        }
    }
}

/// Convert a table to XLSX format
///
/// Spans become merged ranges. Header rows get the header fill with a white
/// bold font; body rows get their class color or the white/banded fill. All
/// cells are centered with thin borders, every column gets the configured
/// width and the sheet reads right to left.
#[cfg(feature = "xlsx")]
pub fn to_xlsx(table: &Table, settings: &ExcelSettings) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

    let border = Color::RGB(parse_color(BORDER_COLOR)?);
    let header_format = Format::new()
        .set_background_color(Color::RGB(parse_color(&settings.header_color)?))
        .set_font_color(Color::White)
        .set_bold()
        .set_font_size(11)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border);

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(&settings.sheet_name)?;
    worksheet.set_right_to_left(true);

    let head_rows = table.head.len();
    let rows: Vec<_> = table.rows().collect();

    for placed in table.layout() {
        let format = if placed.row < head_rows {
            header_format.clone()
        } else {
            let row = rows[placed.row];
            body_format(settings.body_fill(&row.class, placed.row - head_rows), border)?
        };

        let text = html::collapse_line_breaks(&placed.cell.text);
        let (first_row, first_col) = (placed.row as u32, placed.col as u16);
        let (last_row, last_col) = (placed.last_row() as u32, placed.last_col() as u16);

        if first_row == last_row && first_col == last_col {
            worksheet.write_string_with_format(first_row, first_col, &text, &format)?;
        } else {
            worksheet.merge_range(first_row, first_col, last_row, last_col, &text, &format)?;
        }
    }

    for col in 0..table.column_count() {
        worksheet.set_column_width(col as u16, settings.col_width)?;
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(feature = "xlsx")]
fn body_format(
    fill: &str,
    border: rust_xlsxwriter::Color,
) -> Result<rust_xlsxwriter::Format, ExportError> {
    use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};

    Ok(Format::new()
        .set_background_color(Color::RGB(parse_color(fill)?))
        .set_font_size(10)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(border))
}

#[cfg(not(feature = "xlsx"))]
pub fn to_xlsx(_table: &Table, _settings: &ExcelSettings) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unsupported)
}

/// Legacy workbook: an HTML document Excel opens as a right-to-left sheet.
pub fn to_legacy_xls(table: &Table, settings: &ExcelSettings) -> Vec<u8> {
    let mut rows = String::new();
    if !table.head.is_empty() {
        rows.push_str("<thead>");
        write_rows_markup(&mut rows, table.head.iter(), true);
        rows.push_str("</thead>");
    }
    rows.push_str("<tbody>");
    write_rows_markup(&mut rows, table.body.iter(), true);
    rows.push_str("</tbody>");

    let document = format!(
        r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel" xmlns="http://www.w3.org/TR/REC-html40">
    <head>
        <!--[if gte mso 9]>
        <xml>
            <x:ExcelWorkbook>
                <x:ExcelWorksheets>
                    <x:ExcelWorksheet>
                        <x:Name>{sheet_name}</x:Name>
                        <x:WorksheetOptions>
                            <x:DisplayGridlines/>
                            <x:RightToLeft/>
                        </x:WorksheetOptions>
                    </x:ExcelWorksheet>
                </x:ExcelWorksheets>
            </x:ExcelWorkbook>
        </xml>
        <![endif]-->
        <meta http-equiv="content-type" content="text/plain; charset=UTF-8"/>
        <style>
            body {{ font-family: 'Cairo', sans-serif; direction: rtl; }}
            table {{ border-collapse: collapse; width: 100%; }}
            th, td {{ border: 0.5pt solid #000000; padding: 5px; text-align: center; vertical-align: middle; }}
            th {{ background-color: #{header_color}; color: #ffffff; font-weight: bold; }}
        </style>
    </head>
    <body>
        <table>{rows}</table>
    </body>
    </html>"#,
        sheet_name = html::escape(&settings.sheet_name),
        header_color = html::escape(&settings.header_color),
        rows = rows,
    );

    document.into_bytes()
}

#[cfg_attr(not(feature = "xlsx"), allow(dead_code))]
fn parse_color(hex: &str) -> Result<u32, ExportError> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Err(ExportError::InvalidColor(hex.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| ExportError::InvalidColor(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::TableCell;
    use crate::notify::testing::RecordingNotifier;
    use crate::table::TableRow;

    fn report() -> Table {
        Table::new(
            vec![TableRow::new(vec![
                TableCell::header("المقرر"),
                TableCell::header("الشعب").with_colspan(2),
            ])],
            vec![
                TableRow::new(vec![
                    TableCell::data("CS101"),
                    TableCell::data("3"),
                    TableCell::data("4"),
                ])
                .with_class("row-practical"),
                TableRow::new(vec![
                    TableCell::data("CS102").with_rowspan(2),
                    TableCell::data("1"),
                    TableCell::data("2"),
                ]),
                TableRow::new(vec![TableCell::data("5"), TableCell::data("6")]),
            ],
        )
    }

    #[test]
    fn body_fill_prefers_class_then_banding() {
        let settings = ExcelSettings::default();
        assert_eq!(settings.body_fill("row-practical", 1), "F0FDF4");
        assert_eq!(settings.body_fill("big row-self", 0), "FCE7F3");
        assert_eq!(settings.body_fill("", 0), PLAIN_ROW_COLOR);
        assert_eq!(settings.body_fill("", 1), BANDING_COLOR);
        // theory rows are white and therefore banded too
        assert_eq!(settings.body_fill("row-theory", 3), BANDING_COLOR);
    }

    #[test]
    fn legacy_file_name_swaps_extension() {
        assert_eq!(ExcelSettings::default().legacy_file_name(), "تقرير.xls");
    }

    #[test]
    fn legacy_workbook_wraps_table_markup() {
        let settings = ExcelSettings::default();
        let doc = String::from_utf8(to_legacy_xls(&report(), &settings)).unwrap();
        assert!(doc.contains("<x:Name>البيانات</x:Name>"));
        assert!(doc.contains("background-color: #1E3A5F"));
        let head = "<thead><tr><th>المقرر</th><th colspan=\"2\">الشعب</th></tr></thead>";
        assert!(doc.contains(head));
        assert!(doc.contains("<tr class=\"row-practical\"><td>CS101</td>"));
        assert!(doc.contains("<td rowspan=\"2\">CS102</td>"));
    }

    #[test]
    fn colors_are_validated() {
        assert_eq!(parse_color("#2563eb").unwrap(), 0x2563EB);
        assert!(parse_color("blue").is_err());
        assert!(parse_color("12345").is_err());
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn xlsx_export_produces_zip() {
        let notifier = RecordingNotifier::default();
        let export = export_to_excel(&report(), &ExcelSettings::default(), &notifier);
        assert_eq!(export.format, ExcelFormat::Xlsx);
        assert_eq!(export.file_name, "تقرير.xlsx");
        assert_eq!(&export.bytes[..2], b"PK");
        assert_eq!(notifier.severities(), vec![Severity::Info, Severity::Success]);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn overlapping_spans_still_export_xlsx() {
        let table = Table::new(
            vec![],
            vec![
                TableRow::new(vec![
                    TableCell::data("x"),
                    TableCell::data("y").with_rowspan(2),
                ]),
                TableRow::new(vec![TableCell::data("z").with_colspan(3)]),
            ],
        );
        let settings = ExcelSettings::default();
        assert!(to_xlsx(&table, &settings).is_ok());
        let export = export_to_excel(&table, &settings, &RecordingNotifier::default());
        assert_eq!(export.format, ExcelFormat::Xlsx);
    }

    #[test]
    fn bad_settings_fall_back_to_legacy() {
        let notifier = RecordingNotifier::default();
        let settings = ExcelSettings {
            header_color: "not-a-color".to_string(),
            ..Default::default()
        };
        let export = export_to_excel(&report(), &settings, &notifier);
        assert_eq!(export.format, ExcelFormat::LegacyHtml);
        assert_eq!(export.file_name, "تقرير.xls");
        assert!(export.data_uri().starts_with("data:application/vnd.ms-excel;base64,"));
        assert_eq!(
            notifier.severities(),
            vec![Severity::Info, Severity::Warning, Severity::Success]
        );
    }
}
