use crate::cell::TableCell;
use crate::loader::Row;
use serde::{Deserialize, Serialize};

/// One displayed table row.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Space separated CSS classes of the row element (e.g. `row-practical`).
    #[serde(default)]
    pub class: String,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        TableRow {
            cells,
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Sum of the column spans of the row's cells.
    pub fn span_width(&self) -> usize {
        self.cells.iter().map(|c| c.width() as usize).sum()
    }
}

/// A table split into its header (`thead`) and body (`tbody`) sections.
///
/// Display order is every head row followed by every body row.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Table {
    #[serde(default)]
    pub head: Vec<TableRow>,
    #[serde(default)]
    pub body: Vec<TableRow>,
}

/// A cell pinned to its top-left grid slot after span resolution.
///
/// `width` and `height` are the spans actually granted on the grid. They are
/// smaller than the cell's own spans when those would run into a slot another
/// cell already covers, or past the last row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedCell<'a> {
    pub row: usize,
    pub col: usize,
    pub width: usize,
    pub height: usize,
    pub cell: &'a TableCell,
}

impl<'a> PlacedCell<'a> {
    pub fn last_row(&self) -> usize {
        self.row + self.height - 1
    }

    pub fn last_col(&self) -> usize {
        self.col + self.width - 1
    }
}

fn is_covered(row: &[bool], col: usize) -> bool {
    row.get(col).copied().unwrap_or(false)
}

impl Table {
    pub fn new(head: Vec<TableRow>, body: Vec<TableRow>) -> Self {
        Table { head, body }
    }

    /// Build a table from parsed CSV rows: one header row of `th` cells
    /// followed by one body row per record, in `headers` order.
    pub fn from_rows(headers: &[String], rows: &[Row]) -> Self {
        let head = if headers.is_empty() {
            Vec::new()
        } else {
            vec![TableRow::new(
                headers.iter().map(|h| TableCell::header(h.as_str())).collect(),
            )]
        };
        let body = rows
            .iter()
            .map(|row| {
                TableRow::new(
                    headers
                        .iter()
                        .map(|h| TableCell::data(row.get(h).unwrap_or_default()))
                        .collect(),
                )
            })
            .collect();
        Table { head, body }
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.head.iter().chain(self.body.iter())
    }

    pub fn row_count(&self) -> usize {
        self.head.len() + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Resolve spans into grid positions.
    ///
    /// Cells fill the leftmost free slot of their row; slots covered by a
    /// `rowspan` from an earlier row are skipped, the way an HTML table lays out.
    /// Spans are clipped so no two placed cells share a slot: a colspan stops at
    /// the first covered column and a rowspan at the end of the table.
    pub fn layout(&self) -> Vec<PlacedCell<'_>> {
        let total_rows = self.row_count();
        // occupied[r] holds the covered columns of row r
        let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); total_rows];
        let mut placed = Vec::new();

        for (r, row) in self.rows().enumerate() {
            let mut col = 0;
            for cell in &row.cells {
                while is_covered(&occupied[r], col) {
                    col += 1;
                }
                let width = (col..col + cell.width() as usize)
                    .take_while(|&c| !is_covered(&occupied[r], c))
                    .count();
                // an earlier rowspan reaching a lower row also covers this one,
                // so free slots here stay free all the way down
                let height = (cell.height() as usize).min(total_rows - r);

                for covered in occupied.iter_mut().skip(r).take(height) {
                    let end = col + width;
                    if covered.len() < end {
                        covered.resize(end, false);
                    }
                    for slot in &mut covered[col..end] {
                        *slot = true;
                    }
                }
                placed.push(PlacedCell {
                    row: r,
                    col,
                    width,
                    height,
                    cell,
                });
                col += width;
            }
        }

        placed
    }

    /// Number of grid columns after span resolution.
    pub fn column_count(&self) -> usize {
        self.layout()
            .iter()
            .map(|p| p.last_col() + 1)
            .max()
            .unwrap_or(0)
    }
}
