use crate::html;
use crate::notify::{Notifier, Severity, messages};
use crate::table::{Table, TableRow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Field separator of the plain-text representation.
pub const FIELD_SEPARATOR: &str = "\t";
/// Row separator of the plain-text representation.
pub const ROW_SEPARATOR: &str = "\r\n";

/// Both clipboard representations of one table.
///
/// `html` is what rich paste targets (spreadsheets, word processors) pick up;
/// `text` is tab separated with spanned columns padded so that pasted cells
/// line up with the visual grid.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard write was rejected: {0}")]
    Rejected(String),
    #[error("clipboard backend is unavailable: {0}")]
    Unavailable(String),
}

/// Destination of a copy operation.
pub trait ClipboardSink {
    /// Write the markup and the plain text as one multi-format entry.
    fn write_rich(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError>;

    /// Write plain text only.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// What ended up on the clipboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Rich,
    PlainTextOnly,
}

/// Serialize a table for the clipboard.
///
/// Markup cell text is HTML-escaped (`<` becomes `&lt;`, `&` becomes `&amp;`
/// and so on), so the markup is not byte-for-byte the raw cell text even
/// though it pastes back to the same text. The plain text is never escaped.
///
/// # Examples
/// ```
/// use reportkit::{Table, TableCell, TableRow, serialize_for_clipboard};
///
/// let table = Table::new(
///     vec![TableRow::new(vec![TableCell::header("Total").with_colspan(3)])],
///     vec![TableRow::new(vec![
///         TableCell::data("1"),
///         TableCell::data("2"),
///         TableCell::data("3"),
///     ])],
/// );
/// let payload = serialize_for_clipboard(&table);
/// assert_eq!(payload.text, "Total\t\t\r\n1\t2\t3");
/// ```
pub fn serialize_for_clipboard(table: &Table) -> ClipboardPayload {
    let mut markup = String::from("<table border=\"1\">");
    write_rows_markup(&mut markup, table.rows(), false);
    markup.push_str("</table>");

    let text = table
        .rows()
        .map(plain_text_row)
        .collect::<Vec<_>>()
        .join(ROW_SEPARATOR);

    ClipboardPayload { html: markup, text }
}

fn plain_text_row(row: &TableRow) -> String {
    let mut fields = Vec::with_capacity(row.span_width());
    for cell in &row.cells {
        fields.push(html::collapse_for_tsv(&cell.text));
        for _ in 1..cell.width() {
            fields.push(String::new());
        }
    }
    fields.join(FIELD_SEPARATOR)
}

/// Append `<tr>` markup for `rows`.
///
/// Cell text is trimmed, line breaks are folded into spaces and the result is
/// escaped. With `keep_class` the row's CSS classes are carried over, which
/// the print and legacy workbook exports need for their styling.
pub(crate) fn write_rows_markup<'a>(
    out: &mut String,
    rows: impl Iterator<Item = &'a TableRow>,
    keep_class: bool,
) {
    for row in rows {
        if keep_class && !row.class.is_empty() {
            out.push_str(&format!("<tr class=\"{}\">", html::escape(&row.class)));
        } else {
            out.push_str("<tr>");
        }
        for cell in &row.cells {
            let tag = cell.kind.tag();
            out.push_str(&format!(
                "<{tag}{}>{}</{tag}>",
                cell.span_attributes(),
                html::escape(&html::collapse_line_breaks(&cell.text)),
            ));
        }
        out.push_str("</tr>");
    }
}

/// Copy a table to `sink` in both formats.
///
/// When the rich write is rejected the plain text is written alone, so the
/// copy still succeeds for targets that only understand text. Only a failure
/// of that fallback is returned as an error.
pub fn copy_table(
    table: &Table,
    sink: &mut dyn ClipboardSink,
    notifier: &dyn Notifier,
) -> Result<CopyOutcome, ClipboardError> {
    let payload = serialize_for_clipboard(table);
    debug!(
        "copying table: html_bytes={} text_bytes={}",
        payload.html.len(),
        payload.text.len()
    );

    match sink.write_rich(&payload) {
        Ok(()) => {
            notifier.notify(messages::COPY_DONE, Severity::Success);
            Ok(CopyOutcome::Rich)
        }
        Err(err) => {
            warn!("Clipboard write failed: {}", err);
            sink.write_text(&payload.text)?;
            notifier.notify(messages::COPY_PLAIN_ONLY, Severity::Success);
            Ok(CopyOutcome::PlainTextOnly)
        }
    }
}

/// In-process clipboard, handy for hosts without a system clipboard and for tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub html: Option<String>,
    pub text: Option<String>,
    /// Reject rich writes, like a runtime that does not allow multi-format entries.
    pub text_only: bool,
}

impl ClipboardSink for MemoryClipboard {
    fn write_rich(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError> {
        if self.text_only {
            return Err(ClipboardError::Rejected("rich content not allowed".to_string()));
        }
        self.html = Some(payload.html.clone());
        self.text = Some(payload.text.clone());
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.html = None;
        self.text = Some(text.to_string());
        Ok(())
    }
}
