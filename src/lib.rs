//! tessella - table structure detection for text-based PDF pages.
//!
//! The crate turns a page's drawn primitives (line segments, rectangle
//! outlines, positioned character glyphs) into tables partitioned into
//! cells, rows, and columns. Primitives arrive through the
//! [`PageSource`] abstraction so the pipeline stays independent of any
//! particular PDF runtime; rendering, document lifecycle, and export
//! formats live with the host.
//!
//! The pipeline: primitive ingestion, edge derivation (with an
//! alignment-based synthesis path for borderless tables), snap/join
//! normalization, intersection and cell enumeration, table assembly,
//! and optional text assignment. A `find_tables` call is pure CPU-bound
//! geometry over its inputs; callers parallelize across pages.

pub mod edges;
pub mod error;
pub mod finder;
pub mod geometry;
pub mod objects;
pub mod page;
pub mod settings;
pub mod tables;
pub mod words;

mod cells;
mod clustering;

pub use edges::{Edge, EdgeSource};
pub use error::{Result, TableError};
pub use finder::{
    find_all_cells_bboxes, find_tables, find_tables_from_cells, get_edges, CancelToken, Edges,
    TableFinder,
};
pub use geometry::{BBox, Orientation, Point};
pub use objects::{Char, Color, LinePath, PageObjects, PathKind, RectPrim};
pub use page::{AxisConvention, Page, PageSource};
pub use settings::{
    SplitPunctuation, Strategy, TfSettings, TfSettingsBuilder, WordsExtractSettings,
};
pub use tables::{CellGroup, Table, TableCell};
pub use words::Word;
