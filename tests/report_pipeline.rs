use reportkit::{
    AppContext, CopyOutcome, ExcelFormat, ExcelSettings, MemoryClipboard, NullNotifier,
    PdfSettings, Table, TableCell, TableRow, parse_csv, parse_delimited_text, parse_line,
    serialize_for_clipboard,
};
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

const COURSES: &str = "code,title,sections\r\n\
CS101,\"Intro, part 1\",3\r\n\
\r\n\
CS102,\"The \"\"Real\"\" Thing\"\r\n\
MA201, Calculus ,2,extra\r\n";

fn course_table() -> Table {
    let data = parse_csv(COURSES);
    Table::from_rows(&data.headers, &data.rows)
}

#[test]
fn csv_rows_are_normalized() {
    let rows = parse_delimited_text(COURSES);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("title"), Some("Intro, part 1"));
    assert_eq!(rows[1].get("title"), Some("The \"Real\" Thing"));
    assert_eq!(rows[1].get("sections"), Some(""));
    assert_eq!(rows[2].get("title"), Some("Calculus"));
    assert_eq!(rows[2].len(), 3);
}

#[test]
fn parse_line_field_count_follows_top_level_commas() {
    for line in ["a,b,c", "a,\"b,c\",d", "\"x,y,z\"", ",", "a,\"b\"\"c\",d"] {
        let top_level_commas = {
            let mut quoted = false;
            line.chars()
                .filter(|&c| {
                    if c == '"' {
                        quoted = !quoted;
                    }
                    c == ',' && !quoted
                })
                .count()
        };
        assert_eq!(parse_line(line).len(), top_level_commas + 1, "line {line:?}");
    }
}

#[test]
fn clipboard_text_round_trips_the_csv_grid() {
    let table = course_table();
    let payload = serialize_for_clipboard(&table);
    let grid: Vec<Vec<&str>> = payload
        .text
        .split("\r\n")
        .map(|line| line.split('\t').collect())
        .collect();
    let expected: Vec<Vec<&str>> = table
        .rows()
        .map(|row| row.cells.iter().map(|c| c.text.trim()).collect())
        .collect();
    assert_eq!(grid, expected);
    assert!(payload.html.starts_with("<table border=\"1\"><tr><th>code</th>"));
}

#[test]
fn header_only_csv_still_copies_its_header() {
    let data = parse_csv("code,title\r\n");
    let payload = serialize_for_clipboard(&Table::from_rows(&data.headers, &data.rows));
    assert_eq!(payload.text, "code\ttitle");
    assert_eq!(
        payload.html,
        "<table border=\"1\"><tr><th>code</th><th>title</th></tr></table>"
    );
}

#[test]
fn spanned_rows_keep_their_width() {
    let table = Table::new(
        vec![
            TableRow::new(vec![
                TableCell::header("Course").with_rowspan(2),
                TableCell::header("Load").with_colspan(3),
            ]),
            TableRow::new(vec![
                TableCell::header("Theory"),
                TableCell::header("Lab"),
                TableCell::header("Coop"),
            ]),
        ],
        vec![TableRow::new(vec![
            TableCell::data("CS101"),
            TableCell::data("2"),
            TableCell::data("1"),
            TableCell::data("0"),
        ])],
    );
    let payload = serialize_for_clipboard(&table);
    let widths: Vec<usize> = payload
        .text
        .split("\r\n")
        .map(|line| line.split('\t').count())
        .collect();
    let spans: Vec<usize> = table.rows().map(TableRow::span_width).collect();
    assert_eq!(widths, spans);
    assert_eq!(widths, vec![4, 3, 4]);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SavedView {
    file: String,
    sort_by: String,
}

#[test]
fn context_drives_exports_and_storage() {
    let dir = tempdir().unwrap();
    let mut ctx = AppContext::new(dir.path()).with_notifier(Box::new(NullNotifier));
    let table = course_table();

    let mut clipboard = MemoryClipboard::default();
    assert_eq!(ctx.copy_table(&table, &mut clipboard).unwrap(), CopyOutcome::Rich);

    let settings = ExcelSettings {
        header_color: "#XYZ".to_string(),
        ..Default::default()
    };
    let export = ctx.export_excel(&table, &settings);
    assert_eq!(export.format, ExcelFormat::LegacyHtml);
    assert!(String::from_utf8(export.bytes).unwrap().contains("<td>CS101</td>"));

    let doc = ctx.export_pdf(&table, &PdfSettings::default());
    assert!(doc.html.contains("window.print()"));

    let view = SavedView {
        file: "courses.csv".to_string(),
        sort_by: "sections".to_string(),
    };
    ctx.save("savedState", &view).unwrap();
    ctx.close();
    let loaded = ctx.load("savedState").unwrap().unwrap();
    assert_eq!(loaded.data::<SavedView>().unwrap(), view);
}
