//! Geometric primitives shared across the pipeline.
//!
//! All coordinates are floating-point page points in a top-origin frame
//! (y grows downward) once ingestion has run. Ordered-float key aliases
//! give total orderings wherever geometry is used as a map key.

use ordered_float::OrderedFloat;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// Key types for ordered-float maps and composite sort keys.
pub(crate) type KeyF64 = OrderedFloat<f64>;
pub(crate) type KeyPoint = (KeyF64, KeyF64);

pub(crate) fn key_f64(v: f64) -> KeyF64 {
    OrderedFloat(v)
}

pub(crate) fn key_point(x: f64, y: f64) -> KeyPoint {
    (OrderedFloat(x), OrderedFloat(y))
}

/// Axis orientation of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned bounding box with `x0 <= x1` and `top <= bottom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    /// Builds a bbox from two opposite corners, normalizing the order.
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0: x0.min(x1),
            top: top.min(bottom),
            x1: x0.max(x1),
            bottom: top.max(bottom),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.top.is_finite() && self.x1.is_finite() && self.bottom.is_finite()
    }

    pub(crate) fn has_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    pub(crate) fn x_center(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub(crate) fn y_center(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Union of a sequence of bboxes; None for an empty sequence.
pub(crate) fn bbox_union<'a, I: IntoIterator<Item = &'a BBox>>(boxes: I) -> Option<BBox> {
    let mut out: Option<BBox> = None;
    for b in boxes {
        out = Some(match out {
            None => *b,
            Some(u) => BBox {
                x0: u.x0.min(b.x0),
                top: u.top.min(b.top),
                x1: u.x1.max(b.x1),
                bottom: u.bottom.max(b.bottom),
            },
        });
    }
    out
}

/// True if the two bboxes overlap with positive area.
pub(crate) fn bbox_overlaps(a: &BBox, b: &BBox) -> bool {
    a.x0.max(b.x0) < a.x1.min(b.x1) && a.top.max(b.top) < a.bottom.min(b.bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_normalizes_corner_order() {
        let b = BBox::new(10.0, 20.0, 2.0, 4.0);
        assert_eq!(b, BBox::new(2.0, 4.0, 10.0, 20.0));
        assert!(b.x0 <= b.x1 && b.top <= b.bottom);
        assert_eq!(b.width(), 8.0);
        assert_eq!(b.height(), 16.0);
    }

    #[test]
    fn bbox_union_covers_all() {
        let a = BBox::new(0.0, 0.0, 5.0, 5.0);
        let b = BBox::new(3.0, -2.0, 9.0, 4.0);
        let u = bbox_union([&a, &b]).unwrap();
        assert_eq!(u, BBox::new(0.0, -2.0, 9.0, 5.0));
        assert!(bbox_union(std::iter::empty()).is_none());
    }

    #[test]
    fn bbox_overlap_requires_positive_area() {
        let a = BBox::new(0.0, 0.0, 5.0, 5.0);
        let touching = BBox::new(5.0, 0.0, 10.0, 5.0);
        let crossing = BBox::new(4.0, 4.0, 6.0, 6.0);
        assert!(!bbox_overlaps(&a, &touching));
        assert!(bbox_overlaps(&a, &crossing));
    }
}
