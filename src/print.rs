//! Export to PDF through the browser's print dialog.
//!
//! The table is rendered into a standalone right-to-left HTML document that
//! prints itself once loaded; the host opens it in a new window.

use crate::clipboard::write_rows_markup;
use crate::html::escape;
use crate::notify::{Notifier, Severity, messages};
use crate::table::Table;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

/// Print export configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PdfSettings {
    /// Report title, also used as the document title
    pub title: String,

    /// Extra line shown in the middle of the title row
    pub subtitle: String,

    pub orientation: Orientation,

    /// CSS color of the column header row and title underline
    pub header_color: String,

    /// Table font size in pixels
    pub font_size: u32,

    /// Print zoom in percent
    pub zoom: u32,

    /// Date printed in the title row; today when unset.
    pub date: Option<NaiveDate>,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            title: "تقرير".to_string(),
            subtitle: String::new(),
            orientation: Orientation::Landscape,
            header_color: "#2563eb".to_string(),
            font_size: 8,
            zoom: 90,
            date: None,
        }
    }
}

/// A rendered print document.
#[derive(Clone, Debug, PartialEq)]
pub struct PrintDocument {
    pub title: String,
    pub html: String,
}

/// Render the table and the notifications around it.
pub fn export_to_pdf(
    table: &Table,
    settings: &PdfSettings,
    notifier: &dyn Notifier,
) -> PrintDocument {
    notifier.notify(messages::PDF_STARTED, Severity::Info);
    let html = render_print_document(table, settings);
    notifier.notify(messages::PDF_OPENED, Severity::Success);
    PrintDocument {
        title: settings.title.clone(),
        html,
    }
}

pub fn render_print_document(table: &Table, settings: &PdfSettings) -> String {
    let mut head = String::new();
    write_rows_markup(&mut head, table.head.iter(), true);
    let mut body = String::new();
    write_rows_markup(&mut body, table.body.iter(), true);

    let date = settings
        .date
        .unwrap_or_else(|| Local::now().date_naive())
        .format("%Y/%m/%d");
    let title = escape(&settings.title);
    let header_color = escape(&settings.header_color);

    format!(
        r#"<!DOCTYPE html>
<html dir="rtl" lang="ar">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <link href="https://fonts.googleapis.com/css2?family=Cairo:wght@400;600;700&display=swap" rel="stylesheet">
    <style>
        @page {{
            size: {orientation};
            margin: 10mm 10mm 25mm 10mm;
            @bottom-center {{
                content: "صفحة " counter(page) " من " counter(pages);
                font-family: 'Cairo', sans-serif;
                font-size: 9pt;
                color: #555;
            }}
        }}
        body {{
            font-family: 'Cairo', sans-serif;
            direction: rtl;
            margin: 0;
            padding: 5mm 15mm 10mm 15mm;
            box-sizing: border-box;
        }}
        table {{
            border-collapse: collapse;
            width: 100%;
            font-size: {font_size}px;
            page-break-inside: auto;
        }}
        thead {{ display: table-header-group; }}
        tfoot {{ display: table-footer-group; }}
        .report-title-row td {{
            background: white !important;
            color: #1f2937 !important;
            border: none !important;
            border-bottom: 2px solid {header_color} !important;
            padding: 8px 10px !important;
            font-size: 10px;
            -webkit-print-color-adjust: exact;
            print-color-adjust: exact;
        }}
        .report-title-row .title-right {{ text-align: right; font-weight: bold; font-size: 13px; }}
        .report-title-row .title-center {{ text-align: center; font-weight: bold; font-size: 11px; color: #444; }}
        .report-title-row .title-left {{ text-align: left; font-size: 9px; color: #666; }}
        thead tr:not(.report-title-row) th {{
            background: {header_color} !important;
            color: white !important;
            border: 0.5px solid {header_color};
            padding: 4px 3px;
            font-weight: 600;
            -webkit-print-color-adjust: exact;
            print-color-adjust: exact;
        }}
        td {{
            border: 0.5px solid #333;
            padding: 2px 3px;
            text-align: center;
            white-space: nowrap;
        }}
        tbody tr:nth-child(even) {{
            background: #f3f4f6 !important;
            -webkit-print-color-adjust: exact;
            print-color-adjust: exact;
        }}
        @media print {{
            body {{ zoom: {zoom}%; }}
        }}
    </style>
</head>
<body>
    <table>
        <thead>
            <tr class="report-title-row">
                <td class="title-right" colspan="10">📊 {title}</td>
                <td class="title-center" colspan="10">{subtitle}</td>
                <td class="title-left" colspan="10">التاريخ: {date}</td>
            </tr>
            {head}
        </thead>
        <tbody>
            {body}
        </tbody>
    </table>
    <script>
        window.onload = () => {{
            setTimeout(() => {{
                window.print();
                window.close();
            }}, 500);
        }};
    </script>
</body>
</html>
"#,
        title = title,
        orientation = settings.orientation.as_str(),
        font_size = settings.font_size,
        header_color = header_color,
        zoom = settings.zoom,
        subtitle = escape(&settings.subtitle),
        date = date,
        head = head,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::TableCell;
    use crate::notify::testing::RecordingNotifier;
    use crate::table::TableRow;

    fn settings() -> PdfSettings {
        PdfSettings {
            subtitle: "الفصل الأول".to_string(),
            orientation: Orientation::Portrait,
            date: NaiveDate::from_ymd_opt(2024, 9, 1),
            ..Default::default()
        }
    }

    #[test]
    fn document_carries_settings_and_rows() {
        let table = Table::new(
            vec![TableRow::new(vec![TableCell::header("المقرر")])],
            vec![TableRow::new(vec![TableCell::data("CS101")]).with_class("row-coop")],
        );
        let doc = render_print_document(&table, &settings());
        assert!(doc.contains("size: portrait;"));
        assert!(doc.contains("font-size: 8px;"));
        assert!(doc.contains("zoom: 90%;"));
        assert!(doc.contains("التاريخ: 2024/09/01"));
        assert!(doc.contains("<td class=\"title-center\" colspan=\"10\">الفصل الأول</td>"));
        assert!(doc.contains("<tr><th>المقرر</th></tr>"));
        assert!(doc.contains("<tr class=\"row-coop\"><td>CS101</td></tr>"));
    }

    #[test]
    fn title_is_escaped() {
        let settings = PdfSettings {
            title: "<script>".to_string(),
            ..settings()
        };
        let doc = render_print_document(&Table::default(), &settings);
        assert!(doc.contains("<title>&lt;script&gt;</title>"));
    }

    #[test]
    fn export_notifies_around_render() {
        let notifier = RecordingNotifier::default();
        let doc = export_to_pdf(&Table::default(), &settings(), &notifier);
        assert_eq!(doc.title, "تقرير");
        assert_eq!(notifier.severities(), vec![Severity::Info, Severity::Success]);
    }
}
