use serde::{Deserialize, Serialize};

/// Whether a cell belongs to a header (`th`) or data (`td`) column.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Header,
    #[default]
    Data,
}

impl CellKind {
    pub fn tag(self) -> &'static str {
        match self {
            CellKind::Header => "th",
            CellKind::Data => "td",
        }
    }
}

/// One displayed table cell.
///
/// Spans default to 1. A span of 0 is treated as 1 everywhere it matters, the
/// same way a browser ignores a non-positive `colspan` attribute.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TableCell {
    pub text: String,
    #[serde(default = "default_span")]
    pub colspan: u32,
    #[serde(default = "default_span")]
    pub rowspan: u32,
    #[serde(default)]
    pub kind: CellKind,
}

fn default_span() -> u32 {
    1
}

impl TableCell {
    pub fn create(text: impl Into<String>, kind: CellKind) -> Self {
        TableCell {
            text: text.into(),
            colspan: 1,
            rowspan: 1,
            kind,
        }
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self::create(text, CellKind::Header)
    }

    pub fn data(text: impl Into<String>) -> Self {
        Self::create(text, CellKind::Data)
    }

    pub fn with_colspan(mut self, colspan: u32) -> Self {
        self.colspan = colspan;
        self
    }

    pub fn with_rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = rowspan;
        self
    }

    /// Number of grid columns the cell occupies (never less than 1).
    pub fn width(&self) -> u32 {
        self.colspan.max(1)
    }

    /// Number of grid rows the cell occupies (never less than 1).
    pub fn height(&self) -> u32 {
        self.rowspan.max(1)
    }

    /// `colspan`/`rowspan` attributes for markup output, only when they differ
    /// from the default.
    pub fn span_attributes(&self) -> String {
        let mut attrs = String::new();
        if self.width() != 1 {
            attrs.push_str(&format!(" colspan=\"{}\"", self.width()));
        }
        if self.height() != 1 {
            attrs.push_str(&format!(" rowspan=\"{}\"", self.height()));
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spans_emit_no_attributes() {
        let cell = TableCell::data("x");
        assert_eq!(cell.span_attributes(), "");
        assert_eq!(cell.kind.tag(), "td");
    }

    #[test]
    fn spans_are_emitted_and_clamped() {
        let cell = TableCell::header("x").with_colspan(3).with_rowspan(2);
        assert_eq!(cell.span_attributes(), " colspan=\"3\" rowspan=\"2\"");
        assert_eq!(TableCell::data("y").with_colspan(0).width(), 1);
    }

    #[test]
    fn spans_default_when_missing_from_json() {
        let cell: TableCell = serde_json::from_str(r#"{"text":"a"}"#).unwrap();
        assert_eq!(cell, TableCell::data("a"));
    }
}
