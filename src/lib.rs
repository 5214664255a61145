/*!
# reportkit

Presentation helpers for tabular course reports: CSV ingestion, clipboard
serialization, PDF and Excel export, badges and tooltips, and the small
collaborators (notifications, persistent storage, theme) around them.

## Overview

A report page shows one large table. The helpers in this crate turn that
table, or the CSV it was built from, into whatever the user asks for:

- rows keyed by header, parsed from CSV text
- a rich + plain-text clipboard entry that pastes into spreadsheets with the
  columns lined up
- a print-ready HTML document (the page prints it to PDF)
- an `.xlsx` workbook with header and row-class colors, or the legacy HTML
  workbook when the xlsx writer is unavailable

Parsing and serialization are pure functions. Everything with side effects
(notifications, clipboard, storage, theme) goes through an explicit
collaborator, most conveniently an [`AppContext`].

## Modules

- **loader**: CSV parsing (`parse_line`, `parse_delimited_text`, `from_csv`)
- **cell**, **table**: the displayed table model and span layout
- **clipboard**: `serialize_for_clipboard` and the copy routine
- **downloader**: Excel export with fallback
- **print**: PDF export via a print document
- **components**: badges, density/pass classes, tooltips
- **stats**: standard deviation
- **notify**: toasts and the `Notifier` trait
- **saving**: key-value store with timestamped JSON payloads
- **theme**: light/dark preference
- **context**: the application context owning the collaborators

## Example

```
use reportkit::{Table, parse_delimited_text, serialize_for_clipboard};

let rows = parse_delimited_text("code,sections\nCS101,3\nCS102,\"1,5\"");
let headers: Vec<String> = rows[0].columns().map(str::to_string).collect();
let table = Table::from_rows(&headers, &rows);

let payload = serialize_for_clipboard(&table);
assert_eq!(payload.text, "code\tsections\r\nCS101\t3\r\nCS102\t1,5");
```
*/

pub mod cell;
pub mod clipboard;
pub mod components;
pub mod context;
pub mod downloader;
pub mod html;
pub mod loader;
pub mod notify;
pub mod print;
pub mod saving;
pub mod stats;
pub mod table;
pub mod theme;

pub use cell::{CellKind, TableCell};
pub use clipboard::{
    ClipboardError, ClipboardPayload, ClipboardSink, CopyOutcome, MemoryClipboard, copy_table,
    serialize_for_clipboard,
};
pub use components::{
    Course, CourseCatalog, CourseType, Section, Tooltip, density_class, instructor_tooltip,
    pass_class, sections_tooltip, type_badge,
};
pub use context::AppContext;
pub use downloader::{ExcelExport, ExcelFormat, ExcelSettings, ExportError, export_to_excel};
pub use loader::{
    CsvData, LoadError, Row, from_csv, parse_csv, parse_delimited_text, parse_line, read_csv,
};
pub use notify::{LogNotifier, Notifier, NullNotifier, Severity, Toast};
pub use print::{Orientation, PdfSettings, PrintDocument, export_to_pdf};
pub use saving::{SavedRecord, Store, StoreConfig, StoreError};
pub use stats::std_dev;
pub use table::{PlacedCell, Table, TableRow};
pub use theme::{Theme, ThemeError, ThemeStore};
