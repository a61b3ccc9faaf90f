//! Configuration records for the table-finding pipeline.
//!
//! Both records are plain structs with defaulted fields; validation is
//! fail-fast and happens either at `TfSettingsBuilder::build` or when a
//! `TableFinder` is constructed from a hand-built record.

use crate::error::{Result, TableError};

pub(crate) const DEFAULT_SNAP_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_JOIN_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_INTERSECTION_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_EDGE_MIN_LENGTH: f64 = 3.0;
pub(crate) const DEFAULT_EDGE_MIN_LENGTH_PREFILTER: f64 = 1.0;
pub(crate) const DEFAULT_MIN_WORDS_VERTICAL: usize = 3;
pub(crate) const DEFAULT_MIN_WORDS_HORIZONTAL: usize = 1;
pub(crate) const DEFAULT_X_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_Y_TOLERANCE: f64 = 3.0;

/// Edge-source strategy for one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Line objects plus rectangle borders, including fill-only rects.
    Lines,
    /// Line objects plus stroked rectangle borders only.
    #[default]
    LinesStrict,
    /// Pseudo-edges inferred from word alignment.
    Text,
}

/// Where word runs are forcibly broken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitPunctuation {
    /// Break at every ASCII punctuation character.
    All,
    /// Break at exactly the characters in the given string.
    Custom(String),
}

/// Settings for reconstructing words from characters.
#[derive(Clone, Debug, PartialEq)]
pub struct WordsExtractSettings {
    /// Max horizontal gap between characters of one word.
    pub x_tolerance: f64,
    /// Max baseline drift between characters of one line.
    pub y_tolerance: f64,
    /// Keep whitespace glyphs instead of breaking words on them.
    pub keep_blank_chars: bool,
    /// Preserve the source character order instead of spatial sorting.
    pub use_text_flow: bool,
    /// Normalize reading direction under rotation; true is the standard
    /// clockwise convention.
    pub text_read_in_clockwise: bool,
    pub split_at_punctuation: Option<SplitPunctuation>,
    /// Expand ligature glyphs into their decomposition.
    pub expand_ligatures: bool,
    /// Trim leading/trailing whitespace from word and cell text.
    pub need_strip: bool,
}

impl Default for WordsExtractSettings {
    fn default() -> Self {
        Self {
            x_tolerance: DEFAULT_X_TOLERANCE,
            y_tolerance: DEFAULT_Y_TOLERANCE,
            keep_blank_chars: false,
            use_text_flow: false,
            text_read_in_clockwise: true,
            split_at_punctuation: None,
            expand_ligatures: true,
            need_strip: true,
        }
    }
}

impl WordsExtractSettings {
    pub fn validate(&self) -> Result<()> {
        non_negative("x_tolerance", self.x_tolerance)?;
        non_negative("y_tolerance", self.y_tolerance)?;
        Ok(())
    }
}

/// Settings for the table-finding pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TfSettings {
    pub vertical_strategy: Strategy,
    pub horizontal_strategy: Strategy,
    pub snap_x_tolerance: f64,
    pub snap_y_tolerance: f64,
    pub join_x_tolerance: f64,
    pub join_y_tolerance: f64,
    /// Minimum length of a merged edge.
    pub edge_min_length: f64,
    /// Minimum length of a derived edge before merging; shorter edges
    /// are dropped outright.
    pub edge_min_length_prefilter: f64,
    pub min_words_vertical: usize,
    pub min_words_horizontal: usize,
    pub intersection_x_tolerance: f64,
    pub intersection_y_tolerance: f64,
    /// Keep tables consisting of a single cell.
    pub include_single_cell: bool,
    pub min_rows: Option<usize>,
    pub min_columns: Option<usize>,
    /// Word-reconstruction settings used by the text strategy and by
    /// cell text extraction.
    pub text: WordsExtractSettings,
}

impl Default for TfSettings {
    fn default() -> Self {
        Self {
            vertical_strategy: Strategy::LinesStrict,
            horizontal_strategy: Strategy::LinesStrict,
            snap_x_tolerance: DEFAULT_SNAP_TOLERANCE,
            snap_y_tolerance: DEFAULT_SNAP_TOLERANCE,
            join_x_tolerance: DEFAULT_JOIN_TOLERANCE,
            join_y_tolerance: DEFAULT_JOIN_TOLERANCE,
            edge_min_length: DEFAULT_EDGE_MIN_LENGTH,
            edge_min_length_prefilter: DEFAULT_EDGE_MIN_LENGTH_PREFILTER,
            min_words_vertical: DEFAULT_MIN_WORDS_VERTICAL,
            min_words_horizontal: DEFAULT_MIN_WORDS_HORIZONTAL,
            intersection_x_tolerance: DEFAULT_INTERSECTION_TOLERANCE,
            intersection_y_tolerance: DEFAULT_INTERSECTION_TOLERANCE,
            include_single_cell: false,
            min_rows: None,
            min_columns: None,
            text: WordsExtractSettings::default(),
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    // NaN also fails the comparison and is rejected here.
    if value >= 0.0 {
        Ok(())
    } else {
        Err(TableError::InvalidSettings { field, value })
    }
}

impl TfSettings {
    pub fn builder() -> TfSettingsBuilder {
        TfSettingsBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("snap_x_tolerance", self.snap_x_tolerance)?;
        non_negative("snap_y_tolerance", self.snap_y_tolerance)?;
        non_negative("join_x_tolerance", self.join_x_tolerance)?;
        non_negative("join_y_tolerance", self.join_y_tolerance)?;
        non_negative("edge_min_length", self.edge_min_length)?;
        non_negative("edge_min_length_prefilter", self.edge_min_length_prefilter)?;
        non_negative("intersection_x_tolerance", self.intersection_x_tolerance)?;
        non_negative("intersection_y_tolerance", self.intersection_y_tolerance)?;
        self.text.validate()
    }
}

/// Fluent builder over `TfSettings` with per-field overrides.
///
/// ```
/// use tessella::{Strategy, TfSettings};
///
/// let settings = TfSettings::builder()
///     .vertical_strategy(Strategy::Text)
///     .snap_x_tolerance(2.0)
///     .min_words_vertical(3)
///     .build()
///     .unwrap();
/// assert_eq!(settings.snap_x_tolerance, 2.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TfSettingsBuilder {
    settings: TfSettings,
}

impl TfSettingsBuilder {
    pub fn vertical_strategy(mut self, strategy: Strategy) -> Self {
        self.settings.vertical_strategy = strategy;
        self
    }

    pub fn horizontal_strategy(mut self, strategy: Strategy) -> Self {
        self.settings.horizontal_strategy = strategy;
        self
    }

    pub fn snap_x_tolerance(mut self, value: f64) -> Self {
        self.settings.snap_x_tolerance = value;
        self
    }

    pub fn snap_y_tolerance(mut self, value: f64) -> Self {
        self.settings.snap_y_tolerance = value;
        self
    }

    pub fn join_x_tolerance(mut self, value: f64) -> Self {
        self.settings.join_x_tolerance = value;
        self
    }

    pub fn join_y_tolerance(mut self, value: f64) -> Self {
        self.settings.join_y_tolerance = value;
        self
    }

    pub fn edge_min_length(mut self, value: f64) -> Self {
        self.settings.edge_min_length = value;
        self
    }

    pub fn edge_min_length_prefilter(mut self, value: f64) -> Self {
        self.settings.edge_min_length_prefilter = value;
        self
    }

    pub fn min_words_vertical(mut self, value: usize) -> Self {
        self.settings.min_words_vertical = value;
        self
    }

    pub fn min_words_horizontal(mut self, value: usize) -> Self {
        self.settings.min_words_horizontal = value;
        self
    }

    pub fn intersection_x_tolerance(mut self, value: f64) -> Self {
        self.settings.intersection_x_tolerance = value;
        self
    }

    pub fn intersection_y_tolerance(mut self, value: f64) -> Self {
        self.settings.intersection_y_tolerance = value;
        self
    }

    pub fn include_single_cell(mut self, value: bool) -> Self {
        self.settings.include_single_cell = value;
        self
    }

    pub fn min_rows(mut self, value: usize) -> Self {
        self.settings.min_rows = Some(value);
        self
    }

    pub fn min_columns(mut self, value: usize) -> Self {
        self.settings.min_columns = Some(value);
        self
    }

    pub fn text_x_tolerance(mut self, value: f64) -> Self {
        self.settings.text.x_tolerance = value;
        self
    }

    pub fn text_y_tolerance(mut self, value: f64) -> Self {
        self.settings.text.y_tolerance = value;
        self
    }

    pub fn text_keep_blank_chars(mut self, value: bool) -> Self {
        self.settings.text.keep_blank_chars = value;
        self
    }

    pub fn text_use_text_flow(mut self, value: bool) -> Self {
        self.settings.text.use_text_flow = value;
        self
    }

    pub fn text_read_in_clockwise(mut self, value: bool) -> Self {
        self.settings.text.text_read_in_clockwise = value;
        self
    }

    pub fn text_split_at_punctuation(mut self, value: Option<SplitPunctuation>) -> Self {
        self.settings.text.split_at_punctuation = value;
        self
    }

    pub fn text_expand_ligatures(mut self, value: bool) -> Self {
        self.settings.text.expand_ligatures = value;
        self
    }

    pub fn text_need_strip(mut self, value: bool) -> Self {
        self.settings.text.need_strip = value;
        self
    }

    /// Validates and returns the finished settings record.
    pub fn build(self) -> Result<TfSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
