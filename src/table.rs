//! Text tables that fit the terminal.
//!
//! [`layout`] decides which columns are shown and how wide they are; rendering
//! then formats every cell with that layout. Rows are only read: widths and
//! alignments live in the [`Layout`], so the same rows can be rendered again
//! with other options.

use itertools::Itertools;
use tracing::debug;

use crate::{
    error::{Error, Result},
    output,
    rich::{Align, Rich},
    row::{Column, Header, Row},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show every column at the width of its longest cell.
    pub no_truncate: bool,
    /// Line width to fit; the terminal width when unset.
    pub width: Option<usize>,
    pub sep: String,
    pub header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            no_truncate: false,
            width: None,
            sep: " ".to_string(),
            header: true,
        }
    }
}

impl RenderOptions {
    pub fn line_width(&self) -> usize {
        self.width.unwrap_or_else(output::terminal_width)
    }
}

/// Width and alignment chosen for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub key: String,
    pub width: usize,
    pub align: Align,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub slots: Vec<Slot>,
}

impl Layout {
    pub fn width_of(&self, key: &str) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| slot.width)
    }
}

struct Candidate<'a> {
    column: &'a Column,
    real: usize,
    width: usize,
}

pub fn layout(
    rows: &[Row],
    columns: &[Column],
    header: &Header,
    options: &RenderOptions,
) -> Layout {
    // a column is shown only if every row has the field
    let mut candidates: Vec<Candidate> = columns
        .iter()
        .filter(|column| rows.iter().all(|row| row.contains_key(&column.key)))
        .map(|column| {
            let real = rows
                .iter()
                .filter_map(|row| row.get(&column.key))
                .map(Rich::display_width)
                .fold(header.name(&column.key).display_width(), usize::max);
            Candidate {
                column,
                real,
                width: column.min_width,
            }
        })
        .collect();

    if options.no_truncate {
        for candidate in &mut candidates {
            candidate.width = candidate.real;
        }
    } else {
        fit(&mut candidates, options.line_width(), options.sep.chars().count());
    }

    Layout {
        slots: candidates
            .into_iter()
            .map(|candidate| Slot {
                key: candidate.column.key.clone(),
                width: candidate.width,
                align: candidate.column.align,
            })
            .collect(),
    }
}

// drop trailing columns that do not fit at their minimum width, then spend the
// remaining room on the survivors: priority columns first, then the others
fn fit(candidates: &mut Vec<Candidate>, line_width: usize, sep: usize) {
    let mut total = 0;
    let mut keep = 0;
    for (i, candidate) in candidates.iter().enumerate() {
        let footprint = if i == 0 {
            candidate.width
        } else {
            total + sep + candidate.width
        };
        if footprint > line_width {
            break;
        }
        total = footprint;
        keep = i + 1;
    }

    if keep == 0 && !candidates.is_empty() {
        debug!(line_width, "first column does not fit, squeezing it");
        candidates.truncate(1);
        candidates[0].width = candidates[0].width.min(line_width);
        total = candidates[0].width;
    } else if keep < candidates.len() {
        debug!(
            dropped = ?candidates[keep..].iter().map(|c| &c.column.key).collect::<Vec<_>>(),
            "columns do not fit"
        );
        candidates.truncate(keep);
    }

    let mut room = line_width.saturating_sub(total);
    debug!(room, "expanding columns");
    for priority in [true, false] {
        for candidate in candidates.iter_mut() {
            if candidate.column.priority != priority {
                continue;
            }
            if room == 0 {
                break;
            }
            let grow = candidate.real.saturating_sub(candidate.width).min(room);
            candidate.width += grow;
            room -= grow;
        }
    }
}

/// Separator, header, separator, then one line per row.
pub fn render_columns(
    rows: &[Row],
    columns: &[Column],
    header: &Header,
    options: &RenderOptions,
) -> String {
    let layout = layout(rows, columns, header, options);
    if layout.slots.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 3);
    if options.header {
        let names: Vec<Rich> = layout.slots.iter().map(|slot| header.name(&slot.key)).collect();
        let hline = layout
            .slots
            .iter()
            .zip(&names)
            .map(|(slot, name)| {
                Rich::string("=".repeat(slot.width))
                    .with_color(name.color.clone())
                    .format_with(Some(slot.width), name.align)
            })
            .join(&options.sep);
        let head = layout
            .slots
            .iter()
            .zip(&names)
            .map(|(slot, name)| name.format_with(Some(slot.width), name.align))
            .join(&options.sep);
        lines.push(hline.clone());
        lines.push(head);
        lines.push(hline);
    }
    for row in rows {
        lines.push(
            layout
                .slots
                .iter()
                .map(|slot| match row.get(&slot.key) {
                    Some(value) => value.format_with(Some(slot.width), slot.align),
                    None => " ".repeat(slot.width),
                })
                .join(&options.sep),
        );
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// The plain values of a single column on one line.
pub fn render_list(rows: &[Row], columns: &[Column], sep: &str) -> Result<String> {
    let column = match columns {
        [] => return Ok(String::new()),
        [column] => column,
        _ => return Err(Error::ListFieldCount(columns.len())),
    };

    let mut text = String::new();
    for value in rows.iter().filter_map(|row| row.get(&column.key)) {
        text.push_str(&value.to_string());
        text.push_str(sep);
    }
    text.push('\n');
    Ok(text)
}

/// Every field of every row as `key: value`, rows separated by a dashed line.
pub fn render_long(rows: &[Row]) -> String {
    let width = rows
        .iter()
        .flat_map(Row::keys)
        .map(|key| key.chars().count())
        .max()
        .unwrap_or(0)
        + 1;
    let divider = "-".repeat(width);

    let mut text = format!("{divider}\n");
    for row in rows {
        for (key, value) in row.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            text.push_str(&format!("{key:<width$}: {value}\n"));
        }
        text.push_str(&divider);
        text.push('\n');
    }
    text
}
