//! Page state machine and primitive ingestion.
//!
//! A `Page` adapts a `PageSource` into the pipeline's internal
//! coordinate model. Its lifecycle is an explicit state machine,
//! `Unloaded -> Loaded -> Extracted -> Cleared`, with irreversible
//! transitions; the pipeline entry points demand `Extracted`.

use crate::error::{Result, TableError};
use crate::geometry::BBox;
use crate::objects::{Char, LinePath, PageObjects, RectPrim};

/// Abstract provider of one page's drawn primitives.
///
/// The sequences may be iterated at most once per call; the core treats
/// the source as borrowed for the duration of the call and never
/// mutates it beyond consuming the iterators.
pub trait PageSource {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn chars(&mut self) -> Box<dyn Iterator<Item = Char> + '_>;
    fn lines(&mut self) -> Box<dyn Iterator<Item = LinePath> + '_>;
    fn rects(&mut self) -> Box<dyn Iterator<Item = RectPrim> + '_>;
    /// False once the host has released the underlying page.
    fn is_valid(&self) -> bool;
}

/// Vertical axis convention of the source coordinates.
///
/// The pipeline works in a top-origin frame; bottom-origin sources are
/// flipped during ingestion and the convention is fixed for the
/// lifetime of the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AxisConvention {
    #[default]
    TopOrigin,
    /// y grows upward in the source; ingestion maps y to height - y.
    BottomOrigin,
}

#[derive(Debug)]
enum PageState {
    Unloaded,
    Loaded,
    Extracted(PageObjects),
    Cleared,
}

impl PageState {
    fn name(&self) -> &'static str {
        match self {
            PageState::Unloaded => "unloaded",
            PageState::Loaded => "loaded",
            PageState::Extracted(_) => "extracted",
            PageState::Cleared => "cleared",
        }
    }
}

/// One page of primitives, owned by the caller for the duration of a
/// table search.
#[derive(Debug)]
pub struct Page {
    index: usize,
    width: f64,
    height: f64,
    convention: AxisConvention,
    state: PageState,
}

impl Page {
    /// Creates an unloaded page record.
    pub fn new(index: usize, convention: AxisConvention) -> Self {
        Self {
            index,
            width: 0.0,
            height: 0.0,
            convention,
            state: PageState::Unloaded,
        }
    }

    /// Loads page metrics from the source. `Unloaded -> Loaded`.
    pub fn load(&mut self, source: &impl PageSource) -> Result<()> {
        if !matches!(self.state, PageState::Unloaded) {
            return Err(TableError::InvalidPageState {
                state: self.state.name(),
            });
        }
        if !source.is_valid() {
            return Err(TableError::InvalidPageState { state: "released" });
        }
        self.width = source.width();
        self.height = source.height();
        self.state = PageState::Loaded;
        Ok(())
    }

    /// Ingests primitives from the source. `Loaded -> Extracted`.
    ///
    /// Malformed primitives (non-finite coordinates, zero-area boxes)
    /// are dropped silently; bottom-origin coordinates are flipped into
    /// the top-origin frame.
    pub fn extract_objects(&mut self, source: &mut impl PageSource) -> Result<()> {
        if !matches!(self.state, PageState::Loaded) {
            return Err(TableError::InvalidPageState {
                state: self.state.name(),
            });
        }
        if !source.is_valid() {
            return Err(TableError::InvalidPageState { state: "released" });
        }
        let objects = ingest(source, self.height, self.convention);
        self.state = PageState::Extracted(objects);
        Ok(())
    }

    /// Loads and extracts in one step.
    pub fn from_source(
        index: usize,
        convention: AxisConvention,
        source: &mut impl PageSource,
    ) -> Result<Self> {
        let mut page = Self::new(index, convention);
        page.load(source)?;
        page.extract_objects(source)?;
        Ok(page)
    }

    /// Releases the cached primitives. Any state `-> Cleared`.
    pub fn clear(&mut self) {
        self.state = PageState::Cleared;
    }

    /// The extracted primitives; `InvalidPageState` unless extraction
    /// has run and the page has not been cleared.
    pub fn objects(&self) -> Result<&PageObjects> {
        match &self.state {
            PageState::Extracted(objects) => Ok(objects),
            other => Err(TableError::InvalidPageState { state: other.name() }),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

fn flip_bbox(bbox: &BBox, height: f64, convention: AxisConvention) -> BBox {
    match convention {
        AxisConvention::TopOrigin => *bbox,
        // BBox::new re-normalizes the swapped corners.
        AxisConvention::BottomOrigin => {
            BBox::new(bbox.x0, height - bbox.bottom, bbox.x1, height - bbox.top)
        }
    }
}

fn ingest(source: &mut impl PageSource, height: f64, convention: AxisConvention) -> PageObjects {
    let chars = source
        .chars()
        .filter(|c| c.bbox.is_finite() && c.bbox.has_area() && c.rotation.is_finite())
        .map(|mut c| {
            c.bbox = flip_bbox(&c.bbox, height, convention);
            c.rotation = c.rotation.rem_euclid(360.0);
            c
        })
        .collect();

    let lines = source
        .lines()
        .filter(|l| {
            l.points.len() >= 2 && l.points.iter().all(|p| p.0.is_finite() && p.1.is_finite())
        })
        .map(|mut l| {
            if convention == AxisConvention::BottomOrigin {
                for p in &mut l.points {
                    p.1 = height - p.1;
                }
            }
            l
        })
        .collect();

    let rects = source
        .rects()
        .filter(|r| r.bbox.is_finite() && r.bbox.has_area())
        .map(|mut r| {
            r.bbox = flip_bbox(&r.bbox, height, convention);
            r
        })
        .collect();

    PageObjects {
        chars,
        lines,
        rects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Color, PathKind};

    struct VecSource {
        width: f64,
        height: f64,
        chars: Vec<Char>,
        lines: Vec<LinePath>,
        rects: Vec<RectPrim>,
        valid: bool,
    }

    impl PageSource for VecSource {
        fn width(&self) -> f64 {
            self.width
        }
        fn height(&self) -> f64 {
            self.height
        }
        fn chars(&mut self) -> Box<dyn Iterator<Item = Char> + '_> {
            Box::new(std::mem::take(&mut self.chars).into_iter())
        }
        fn lines(&mut self) -> Box<dyn Iterator<Item = LinePath> + '_> {
            Box::new(std::mem::take(&mut self.lines).into_iter())
        }
        fn rects(&mut self) -> Box<dyn Iterator<Item = RectPrim> + '_> {
            Box::new(std::mem::take(&mut self.rects).into_iter())
        }
        fn is_valid(&self) -> bool {
            self.valid
        }
    }

    fn empty_source() -> VecSource {
        VecSource {
            width: 100.0,
            height: 200.0,
            chars: Vec::new(),
            lines: Vec::new(),
            rects: Vec::new(),
            valid: true,
        }
    }

    #[test]
    fn state_machine_happy_path() {
        let mut source = empty_source();
        let mut page = Page::new(0, AxisConvention::TopOrigin);
        assert!(page.objects().is_err());

        page.load(&source).unwrap();
        assert_eq!(page.width(), 100.0);
        assert_eq!(page.height(), 200.0);
        assert!(page.objects().is_err());

        page.extract_objects(&mut source).unwrap();
        assert!(page.objects().is_ok());

        page.clear();
        assert_eq!(
            page.objects().unwrap_err(),
            TableError::InvalidPageState { state: "cleared" }
        );
    }

    #[test]
    fn transitions_are_irreversible() {
        let mut source = empty_source();
        let mut page = Page::from_source(0, AxisConvention::TopOrigin, &mut source).unwrap();
        assert!(page.load(&source).is_err());
        assert!(page.extract_objects(&mut source).is_err());
    }

    #[test]
    fn released_source_is_rejected() {
        let mut source = empty_source();
        source.valid = false;
        let err = Page::from_source(0, AxisConvention::TopOrigin, &mut source);
        assert_eq!(
            err.unwrap_err(),
            TableError::InvalidPageState { state: "released" }
        );
    }

    #[test]
    fn ingestion_drops_malformed_primitives() {
        let mut source = empty_source();
        source.chars = vec![
            Char {
                glyph: Some('a'),
                bbox: BBox::new(0.0, 0.0, 5.0, 5.0),
                rotation: 0.0,
                upright: true,
            },
            Char {
                glyph: Some('b'),
                bbox: BBox::new(0.0, 0.0, 0.0, 5.0), // zero area
                rotation: 0.0,
                upright: true,
            },
            Char {
                glyph: Some('c'),
                bbox: BBox::new(f64::NAN, 0.0, 5.0, 5.0),
                rotation: 0.0,
                upright: true,
            },
        ];
        source.lines = vec![
            LinePath {
                kind: PathKind::Straight,
                points: vec![(0.0, 0.0), (10.0, 0.0)],
                color: Color::BLACK,
                width: 1.0,
            },
            LinePath {
                kind: PathKind::Straight,
                points: vec![(0.0, f64::NAN), (10.0, 0.0)],
                color: Color::BLACK,
                width: 1.0,
            },
            LinePath {
                kind: PathKind::Straight,
                points: vec![(0.0, 0.0)], // degenerate
                color: Color::BLACK,
                width: 1.0,
            },
        ];
        source.rects = vec![RectPrim {
            bbox: BBox::new(0.0, 0.0, 10.0, 0.0), // zero area
            fill: Color::TRANSPARENT,
            stroke: Color::BLACK,
            stroke_width: 1.0,
        }];

        let page = Page::from_source(0, AxisConvention::TopOrigin, &mut source).unwrap();
        let objects = page.objects().unwrap();
        assert_eq!(objects.chars.len(), 1);
        assert_eq!(objects.lines.len(), 1);
        assert!(objects.rects.is_empty());
    }

    #[test]
    fn bottom_origin_flip_renormalizes() {
        let mut source = empty_source();
        source.chars = vec![Char {
            glyph: Some('a'),
            // bottom-origin: y from 10 (baseline) to 20 (cap height)
            bbox: BBox::new(0.0, 10.0, 5.0, 20.0),
            rotation: 0.0,
            upright: true,
        }];
        source.lines = vec![LinePath {
            kind: PathKind::Straight,
            points: vec![(0.0, 50.0), (10.0, 50.0)],
            color: Color::BLACK,
            width: 1.0,
        }];

        let page = Page::from_source(0, AxisConvention::BottomOrigin, &mut source).unwrap();
        let objects = page.objects().unwrap();
        assert_eq!(objects.chars[0].bbox, BBox::new(0.0, 180.0, 5.0, 190.0));
        assert_eq!(objects.lines[0].points[0], (0.0, 150.0));
    }

    #[test]
    fn rotation_is_normalized_into_one_turn() {
        let mut source = empty_source();
        source.chars = vec![Char {
            glyph: Some('a'),
            bbox: BBox::new(0.0, 0.0, 5.0, 5.0),
            rotation: -90.0,
            upright: false,
        }];
        let page = Page::from_source(0, AxisConvention::TopOrigin, &mut source).unwrap();
        assert_eq!(page.objects().unwrap().chars[0].rotation, 270.0);
    }
}
