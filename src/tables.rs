//! Table assembly and cell text assignment.
//!
//! Connected cells become tables; each table derives row and column
//! views over its cells and can be populated with reconstructed word
//! text.

use crate::clustering::cluster_objects;
use crate::geometry::{bbox_union, BBox};
use crate::settings::WordsExtractSettings;
use crate::words::Word;

/// One table cell with its recovered text (empty when text extraction
/// was not requested).
#[derive(Clone, Debug)]
pub struct TableCell {
    pub bbox: BBox,
    pub text: String,
}

/// A row or column view over a table: one slot per position on the
/// crossing axis, `None` marking a gap.
#[derive(Debug)]
pub struct CellGroup<'a> {
    pub cells: Vec<Option<&'a TableCell>>,
    pub bbox: BBox,
}

impl<'a> CellGroup<'a> {
    fn new(cells: Vec<Option<&'a TableCell>>) -> Self {
        let bbox = bbox_union(cells.iter().flatten().map(|c| &c.bbox))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Self { cells, bbox }
    }
}

/// A detected table: a connected group of cells with derived structure.
#[derive(Debug)]
pub struct Table {
    pub bbox: BBox,
    pub cells: Vec<TableCell>,
    pub page_index: usize,
    pub text_extracted: bool,
}

/// True when the two cells share a full edge: their facing sides are
/// collinear within tolerance and the shared segment covers the whole
/// side of the smaller cell.
fn shares_full_edge(a: &BBox, b: &BBox, x_tolerance: f64, y_tolerance: f64) -> bool {
    let x_adjacent = (a.x1 - b.x0).abs() <= x_tolerance || (b.x1 - a.x0).abs() <= x_tolerance;
    if x_adjacent {
        let overlap = a.bottom.min(b.bottom) - a.top.max(b.top);
        if overlap > 0.0 && overlap + y_tolerance >= a.height().min(b.height()) {
            return true;
        }
    }

    let y_adjacent = (a.bottom - b.top).abs() <= y_tolerance || (b.bottom - a.top).abs() <= y_tolerance;
    if y_adjacent {
        let overlap = a.x1.min(b.x1) - a.x0.max(b.x0);
        if overlap > 0.0 && overlap + x_tolerance >= a.width().min(b.width()) {
            return true;
        }
    }

    false
}

/// Groups cells into connected components over full-edge adjacency.
/// Components come back ordered by their topmost-leftmost cell, each
/// with its cells in screen order.
pub(crate) fn cells_to_tables(cells: &[BBox], x_tolerance: f64, y_tolerance: f64) -> Vec<Vec<BBox>> {
    let mut visited = vec![false; cells.len()];
    let mut tables: Vec<Vec<BBox>> = Vec::new();

    for start in 0..cells.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = vec![start];
        let mut group = Vec::new();
        while let Some(idx) = queue.pop() {
            group.push(cells[idx]);
            for (other, seen) in visited.iter_mut().enumerate() {
                if !*seen && shares_full_edge(&cells[idx], &cells[other], x_tolerance, y_tolerance)
                {
                    *seen = true;
                    queue.push(other);
                }
            }
        }
        group.sort_by(|a, b| {
            (a.top, a.x0)
                .partial_cmp(&(b.top, b.x0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        tables.push(group);
    }

    tables.sort_by(|a, b| {
        let key = |cells: &[BBox]| {
            cells
                .iter()
                .map(|c| (c.top, c.x0))
                .fold((f64::INFINITY, f64::INFINITY), |acc, k| {
                    if k.partial_cmp(&acc) == Some(std::cmp::Ordering::Less) {
                        k
                    } else {
                        acc
                    }
                })
        };
        key(a)
            .partial_cmp(&key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    tables
}

impl Table {
    pub(crate) fn from_cell_bboxes(page_index: usize, cells: &[BBox]) -> Self {
        let bbox = bbox_union(cells.iter()).unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        let cells = cells
            .iter()
            .map(|bbox| TableCell {
                bbox: *bbox,
                text: String::new(),
            })
            .collect();
        Self {
            bbox,
            cells,
            page_index,
            text_extracted: false,
        }
    }

    /// Bands cells along one axis. Cells sorted by center share a band
    /// while their intervals overlap the band's reference interval by
    /// at least half of the shorter interval.
    fn bands(&self, rows: bool) -> Vec<Vec<usize>> {
        let interval = |idx: usize| {
            let b = &self.cells[idx].bbox;
            if rows {
                (b.top, b.bottom)
            } else {
                (b.x0, b.x1)
            }
        };
        let center = |idx: usize| {
            let b = &self.cells[idx].bbox;
            if rows {
                (b.y_center(), b.x_center())
            } else {
                (b.x_center(), b.y_center())
            }
        };

        let mut order: Vec<usize> = (0..self.cells.len()).collect();
        order.sort_by(|&a, &b| {
            center(a)
                .partial_cmp(&center(b))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut bands: Vec<Vec<usize>> = Vec::new();
        for idx in order {
            if let Some(band) = bands.last_mut() {
                let (r0, r1) = interval(band[0]);
                let (c0, c1) = interval(idx);
                let overlap = r1.min(c1) - r0.max(c0);
                let shorter = (r1 - r0).min(c1 - c0);
                if overlap >= 0.5 * shorter {
                    band.push(idx);
                    continue;
                }
            }
            bands.push(vec![idx]);
        }

        let along = |idx: usize| {
            let b = &self.cells[idx].bbox;
            if rows {
                b.x0
            } else {
                b.top
            }
        };
        for band in &mut bands {
            band.sort_by(|&a, &b| {
                along(a)
                    .partial_cmp(&along(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
        }
        bands
    }

    fn groups(&self, rows: bool) -> Vec<CellGroup<'_>> {
        let bands = self.bands(rows);
        let cross_bands = self.bands(!rows);

        let mut cross_of = vec![0usize; self.cells.len()];
        for (pos, band) in cross_bands.iter().enumerate() {
            for &idx in band {
                cross_of[idx] = pos;
            }
        }

        bands
            .iter()
            .map(|band| {
                let mut slots: Vec<Option<&TableCell>> = vec![None; cross_bands.len()];
                for &idx in band {
                    slots[cross_of[idx]] = Some(&self.cells[idx]);
                }
                CellGroup::new(slots)
            })
            .collect()
    }

    /// Row views, top to bottom, with gap markers at missing columns.
    pub fn rows(&self) -> Vec<CellGroup<'_>> {
        self.groups(true)
    }

    /// Column views, left to right, with gap markers at missing rows.
    pub fn columns(&self) -> Vec<CellGroup<'_>> {
        self.groups(false)
    }

    /// Assigns reconstructed words to cells by bbox center, inclusive
    /// on the min edges and exclusive on the max edges so a word on a
    /// shared border lands in exactly one cell.
    pub(crate) fn assign_text(&mut self, words: &[Word], settings: &WordsExtractSettings) {
        for cell in &mut self.cells {
            let b = &cell.bbox;
            let selected: Vec<&Word> = words
                .iter()
                .filter(|w| {
                    let x = w.bbox.x_center();
                    let y = w.bbox.y_center();
                    x >= b.x0 && x < b.x1 && y >= b.top && y < b.bottom
                })
                .collect();
            if selected.is_empty() {
                continue;
            }

            let mut parts: Vec<&str> = Vec::with_capacity(selected.len());
            for band in cluster_objects(&selected, |w| w.bbox.top, settings.y_tolerance) {
                let mut band = band;
                band.sort_by(|a, b| {
                    a.bbox
                        .x0
                        .partial_cmp(&b.bbox.x0)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                parts.extend(band.into_iter().map(|w| w.text.as_str()));
            }
            let mut text = parts.join(" ");
            if settings.need_strip {
                text = text.trim().to_string();
            }
            cell.text = text;
        }
        self.text_extracted = true;
    }
}
