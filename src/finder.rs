//! Pipeline orchestration and the public entry points.
//!
//! A `TableFinder` validates its settings once and then runs the
//! stages: edge derivation, normalization, intersection, cell
//! enumeration, table assembly, and optional text assignment. An
//! optional cancellation token is checked between stages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cells::{edges_to_intersections, intersections_to_cells};
use crate::edges::{
    edges_from_lines, edges_from_rects, filter_min_length, merge_axis, words_to_edges_h,
    words_to_edges_v, Edge,
};
use crate::error::{Result, TableError};
use crate::geometry::{BBox, Orientation};
use crate::page::Page;
use crate::settings::{Strategy, TfSettings};
use crate::tables::{cells_to_tables, Table};
use crate::words::WordExtractor;

/// The canonical edges of one page, split by orientation.
#[derive(Clone, Debug, Default)]
pub struct Edges {
    pub h: Vec<Edge>,
    pub v: Vec<Edge>,
}

/// Cooperative cancellation flag shared with a caller. Cheap to clone;
/// firing it aborts a running search at the next stage boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Runs the table-finding pipeline for one settings record.
pub struct TableFinder<'a> {
    settings: &'a TfSettings,
    cancel: Option<CancelToken>,
}

impl<'a> TableFinder<'a> {
    /// Validates the settings and builds a finder; invalid settings
    /// fail fast with `InvalidSettings`.
    pub fn new(settings: &'a TfSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            cancel: None,
        })
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    fn checkpoint(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(TableError::Cancelled),
            _ => Ok(()),
        }
    }

    fn derive_edges(&self, page: &Page, synthesize_text: bool) -> Result<Edges> {
        let settings = self.settings;
        let objects = page.objects()?;

        let uses_text = settings.vertical_strategy == Strategy::Text
            || settings.horizontal_strategy == Strategy::Text;
        let words = if synthesize_text && uses_text {
            WordExtractor::new(&settings.text).extract_words(&objects.chars)
        } else {
            Vec::new()
        };
        self.checkpoint()?;

        let (line_h, line_v) = edges_from_lines(&objects.lines);

        let h_raw = match settings.horizontal_strategy {
            Strategy::Text => {
                if synthesize_text {
                    words_to_edges_h(
                        &words,
                        settings.min_words_horizontal,
                        settings.snap_y_tolerance,
                    )
                } else {
                    Vec::new()
                }
            }
            strategy => {
                let mut out = line_h;
                out.extend(edges_from_rects(
                    &objects.rects,
                    Orientation::Horizontal,
                    strategy,
                ));
                out
            }
        };
        let v_raw = match settings.vertical_strategy {
            Strategy::Text => {
                if synthesize_text {
                    words_to_edges_v(
                        &words,
                        settings.min_words_vertical,
                        settings.snap_x_tolerance,
                    )
                } else {
                    Vec::new()
                }
            }
            strategy => {
                let mut out = line_v;
                out.extend(edges_from_rects(
                    &objects.rects,
                    Orientation::Vertical,
                    strategy,
                ));
                out
            }
        };
        self.checkpoint()?;

        let h = filter_min_length(h_raw, settings.edge_min_length_prefilter);
        let v = filter_min_length(v_raw, settings.edge_min_length_prefilter);

        let h = merge_axis(h, settings.snap_y_tolerance, settings.join_x_tolerance);
        let v = merge_axis(v, settings.snap_x_tolerance, settings.join_y_tolerance);

        Ok(Edges {
            h: filter_min_length(h, settings.edge_min_length),
            v: filter_min_length(v, settings.edge_min_length),
        })
    }

    /// Canonical edges from lines and rects, without text synthesis.
    pub fn get_edges(&self, page: &Page) -> Result<Edges> {
        self.derive_edges(page, false)
    }

    /// All cell bounding boxes of the page, in screen order.
    pub fn find_cells(&self, page: &Page) -> Result<Vec<BBox>> {
        let edges = self.derive_edges(page, true)?;
        self.checkpoint()?;
        let intersections = edges_to_intersections(
            &edges.h,
            &edges.v,
            self.settings.intersection_x_tolerance,
            self.settings.intersection_y_tolerance,
        );
        self.checkpoint()?;
        Ok(intersections_to_cells(&intersections))
    }

    /// Assembles tables from cell boxes, optionally populating cell
    /// text from the page's characters.
    pub fn tables_from_cells(
        &self,
        cells: &[BBox],
        extract_text: bool,
        page: Option<&Page>,
    ) -> Result<Vec<Table>> {
        let settings = self.settings;
        if extract_text && page.is_none() {
            return Err(TableError::MissingPage);
        }

        let groups = cells_to_tables(cells, settings.snap_x_tolerance, settings.snap_y_tolerance);
        self.checkpoint()?;

        let words = match (extract_text, page) {
            (true, Some(page)) => {
                let objects = page.objects()?;
                Some(WordExtractor::new(&settings.text).extract_words(&objects.chars))
            }
            _ => None,
        };
        self.checkpoint()?;

        let page_index = page.map(|p| p.index()).unwrap_or(0);
        let mut tables: Vec<Table> = groups
            .iter()
            .map(|group| {
                let mut table = Table::from_cell_bboxes(page_index, group);
                if let Some(words) = &words {
                    table.assign_text(words, &settings.text);
                }
                table
            })
            .collect();

        tables.retain(|t| settings.include_single_cell || t.cells.len() != 1);
        if let Some(min_rows) = settings.min_rows {
            tables.retain(|t| t.rows().len() >= min_rows);
        }
        if let Some(min_columns) = settings.min_columns {
            tables.retain(|t| t.columns().len() >= min_columns);
        }
        Ok(tables)
    }

    /// The full pipeline for one page.
    pub fn find_tables(&self, page: &Page, extract_text: bool) -> Result<Vec<Table>> {
        let cells = self.find_cells(page)?;
        self.tables_from_cells(&cells, extract_text, Some(page))
    }
}

/// Canonical edges of a page under the given settings, as `h`/`v`
/// sets. Text synthesis does not run here.
pub fn get_edges(page: &Page, settings: &TfSettings) -> Result<Edges> {
    TableFinder::new(settings)?.get_edges(page)
}

/// All cell bounding boxes detected on the page.
pub fn find_all_cells_bboxes(page: &Page, settings: &TfSettings) -> Result<Vec<BBox>> {
    TableFinder::new(settings)?.find_cells(page)
}

/// Tables assembled from externally supplied cell boxes. The page is
/// required only when `extract_text` is set.
pub fn find_tables_from_cells(
    cells: &[BBox],
    extract_text: bool,
    page: Option<&Page>,
    settings: &TfSettings,
) -> Result<Vec<Table>> {
    TableFinder::new(settings)?.tables_from_cells(cells, extract_text, page)
}

/// Finds all tables on the page.
pub fn find_tables(page: &Page, extract_text: bool, settings: &TfSettings) -> Result<Vec<Table>> {
    TableFinder::new(settings)?.find_tables(page, extract_text)
}
