//! Edge derivation and normalization.
//!
//! Raw line and rectangle primitives become axis-aligned edges; word
//! alignment synthesizes pseudo-edges for borderless tables. Snap pulls
//! near-coincident edges onto shared rulings, join merges collinear
//! near-contiguous pieces, and length filters discard fragments.

use itertools::Itertools;

use crate::clustering::cluster_objects;
use crate::geometry::{bbox_overlaps, bbox_union, Orientation};
use crate::objects::{Color, LinePath, PathKind, RectPrim};
use crate::settings::Strategy;
use crate::words::Word;

/// Off-axis tolerance for classifying a segment as horizontal or
/// vertical. Sub-point; segments beyond it are diagonals and do not
/// contribute.
pub(crate) const AXIS_EPSILON: f64 = 0.5;

/// Which primitive an edge was derived from. Pseudo-edges from word
/// alignment are tagged for debugging; downstream stages do not
/// distinguish sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSource {
    Line,
    Rect,
    Text,
}

/// An axis-aligned table-border candidate.
///
/// A horizontal edge has `top == bottom` exactly; a vertical edge has
/// `x0 == x1` exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub orientation: Orientation,
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub stroke_width: f64,
    pub color: Color,
    pub source: EdgeSource,
}

impl Edge {
    pub(crate) fn horizontal(
        y: f64,
        xa: f64,
        xb: f64,
        stroke_width: f64,
        color: Color,
        source: EdgeSource,
    ) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            x0: xa.min(xb),
            top: y,
            x1: xa.max(xb),
            bottom: y,
            stroke_width,
            color,
            source,
        }
    }

    pub(crate) fn vertical(
        x: f64,
        ya: f64,
        yb: f64,
        stroke_width: f64,
        color: Color,
        source: EdgeSource,
    ) -> Self {
        Self {
            orientation: Orientation::Vertical,
            x0: x,
            top: ya.min(yb),
            x1: x,
            bottom: ya.max(yb),
            stroke_width,
            color,
            source,
        }
    }

    pub fn length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }

    /// The constant off-axis coordinate.
    pub(crate) fn constant(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.top,
            Orientation::Vertical => self.x0,
        }
    }

    /// Start and end along the running axis.
    pub(crate) fn span(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Horizontal => (self.x0, self.x1),
            Orientation::Vertical => (self.top, self.bottom),
        }
    }

    fn with_constant(&self, value: f64) -> Self {
        match self.orientation {
            Orientation::Horizontal => Self {
                top: value,
                bottom: value,
                ..self.clone()
            },
            Orientation::Vertical => Self {
                x0: value,
                x1: value,
                ..self.clone()
            },
        }
    }

    fn with_span_end(&self, end: f64) -> Self {
        match self.orientation {
            Orientation::Horizontal => Self {
                x1: end,
                ..self.clone()
            },
            Orientation::Vertical => Self {
                bottom: end,
                ..self.clone()
            },
        }
    }
}

/// Derives (horizontal, vertical) edges from straight line segments.
///
/// A segment whose off-axis delta stays within the axis epsilon snaps
/// to the mean coordinate; anything else is a diagonal and is dropped.
pub(crate) fn edges_from_lines(lines: &[LinePath]) -> (Vec<Edge>, Vec<Edge>) {
    let mut h = Vec::new();
    let mut v = Vec::new();

    for line in lines {
        if line.kind != PathKind::Straight {
            continue;
        }
        for pair in line.points.windows(2) {
            let (p, q) = (pair[0], pair[1]);
            if (p.1 - q.1).abs() <= AXIS_EPSILON {
                let y = (p.1 + q.1) / 2.0;
                h.push(Edge::horizontal(
                    y,
                    p.0,
                    q.0,
                    line.width,
                    line.color,
                    EdgeSource::Line,
                ));
            } else if (p.0 - q.0).abs() <= AXIS_EPSILON {
                let x = (p.0 + q.0) / 2.0;
                v.push(Edge::vertical(
                    x,
                    p.1,
                    q.1,
                    line.width,
                    line.color,
                    EdgeSource::Line,
                ));
            }
        }
    }

    (h, v)
}

fn rect_is_stroked(rect: &RectPrim) -> bool {
    rect.stroke_width > 0.0 && !rect.stroke.is_transparent()
}

/// Derives one axis of edges from rectangle outlines.
///
/// Stroked rects contribute their sides under both line strategies;
/// fill-only rects contribute under `lines` only. A contributing rect
/// thinner than the axis epsilon is a hairline drawn as a rectangle
/// and is promoted to a single edge at its centerline instead of four
/// sides.
pub(crate) fn edges_from_rects(
    rects: &[RectPrim],
    orientation: Orientation,
    strategy: Strategy,
) -> Vec<Edge> {
    let mut edges = Vec::new();

    for rect in rects {
        let b = &rect.bbox;
        let color = if rect_is_stroked(rect) {
            rect.stroke
        } else {
            rect.fill
        };

        let contributes = if rect_is_stroked(rect) {
            true
        } else {
            strategy == Strategy::Lines && !rect.fill.is_transparent()
        };
        if !contributes {
            continue;
        }

        if b.width() <= AXIS_EPSILON {
            if orientation == Orientation::Vertical {
                edges.push(Edge::vertical(
                    b.x_center(),
                    b.top,
                    b.bottom,
                    b.width(),
                    color,
                    EdgeSource::Rect,
                ));
            }
            continue;
        }
        if b.height() <= AXIS_EPSILON {
            if orientation == Orientation::Horizontal {
                edges.push(Edge::horizontal(
                    b.y_center(),
                    b.x0,
                    b.x1,
                    b.height(),
                    color,
                    EdgeSource::Rect,
                ));
            }
            continue;
        }

        match orientation {
            Orientation::Horizontal => {
                edges.push(Edge::horizontal(
                    b.top,
                    b.x0,
                    b.x1,
                    rect.stroke_width,
                    color,
                    EdgeSource::Rect,
                ));
                edges.push(Edge::horizontal(
                    b.bottom,
                    b.x0,
                    b.x1,
                    rect.stroke_width,
                    color,
                    EdgeSource::Rect,
                ));
            }
            Orientation::Vertical => {
                edges.push(Edge::vertical(
                    b.x0,
                    b.top,
                    b.bottom,
                    rect.stroke_width,
                    color,
                    EdgeSource::Rect,
                ));
                edges.push(Edge::vertical(
                    b.x1,
                    b.top,
                    b.bottom,
                    rect.stroke_width,
                    color,
                    EdgeSource::Rect,
                ));
            }
        }
    }

    edges
}

/// Synthesizes vertical pseudo-edges from word alignment.
///
/// Words are clustered by their left, right, and center x positions;
/// clusters below the word threshold are discarded, the rest are ranked
/// by size and condensed so overlapping alignments keep only the
/// strongest. Each kept alignment emits one edge at its left x, plus
/// one closing edge at the rightmost extent.
pub(crate) fn words_to_edges_v(words: &[Word], word_threshold: usize, tolerance: f64) -> Vec<Edge> {
    let by_x0 = cluster_objects(words, |w| w.bbox.x0, tolerance);
    let by_x1 = cluster_objects(words, |w| w.bbox.x1, tolerance);
    let by_center = cluster_objects(words, |w| w.bbox.x_center(), tolerance);

    let mut clusters = by_x0;
    clusters.extend(by_x1);
    clusters.extend(by_center);
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));

    let bboxes = clusters
        .into_iter()
        .filter(|c| c.len() >= word_threshold)
        .filter_map(|c| bbox_union(c.iter().map(|w| &w.bbox)));

    let mut condensed = Vec::new();
    for bbox in bboxes {
        if !condensed.iter().any(|kept| bbox_overlaps(&bbox, kept)) {
            condensed.push(bbox);
        }
    }
    if condensed.is_empty() {
        return Vec::new();
    }
    condensed.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal));

    let max_x1 = condensed.iter().map(|r| r.x1).fold(f64::NEG_INFINITY, f64::max);
    let min_top = condensed.iter().map(|r| r.top).fold(f64::INFINITY, f64::min);
    let max_bottom = condensed
        .iter()
        .map(|r| r.bottom)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut edges: Vec<Edge> = condensed
        .iter()
        .map(|r| Edge::vertical(r.x0, min_top, max_bottom, 1.0, Color::BLACK, EdgeSource::Text))
        .collect();
    edges.push(Edge::vertical(
        max_x1,
        min_top,
        max_bottom,
        1.0,
        Color::BLACK,
        EdgeSource::Text,
    ));
    edges
}

/// Synthesizes horizontal pseudo-edges from word alignment: one line
/// band per cluster of word tops, emitting the band's top and bottom
/// rulings across the full text extent.
pub(crate) fn words_to_edges_h(words: &[Word], word_threshold: usize, tolerance: f64) -> Vec<Edge> {
    let rects: Vec<_> = cluster_objects(words, |w| w.bbox.top, tolerance)
        .into_iter()
        .filter(|c| c.len() >= word_threshold)
        .filter_map(|c| bbox_union(c.iter().map(|w| &w.bbox)))
        .collect();
    if rects.is_empty() {
        return Vec::new();
    }

    let min_x0 = rects.iter().map(|r| r.x0).fold(f64::INFINITY, f64::min);
    let max_x1 = rects.iter().map(|r| r.x1).fold(f64::NEG_INFINITY, f64::max);

    let mut edges = Vec::with_capacity(rects.len() * 2);
    for r in &rects {
        edges.push(Edge::horizontal(
            r.top,
            min_x0,
            max_x1,
            1.0,
            Color::BLACK,
            EdgeSource::Text,
        ));
        edges.push(Edge::horizontal(
            r.bottom,
            min_x0,
            max_x1,
            1.0,
            Color::BLACK,
            EdgeSource::Text,
        ));
    }
    edges
}

/// Snaps edges of one axis onto their cluster mean coordinate.
fn snap_axis(edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    if tolerance <= 0.0 {
        return edges;
    }
    let mut snapped = Vec::with_capacity(edges.len());
    for cluster in cluster_objects(&edges, Edge::constant, tolerance) {
        let avg = cluster.iter().map(Edge::constant).sum::<f64>() / cluster.len() as f64;
        snapped.extend(cluster.iter().map(|e| e.with_constant(avg)));
    }
    snapped
}

/// Joins collinear edges whose gap is within tolerance. The joined edge
/// takes the widest contributor's stroke and keeps the first
/// contributor's color.
fn join_edge_group(group: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    let mut sorted = group;
    sorted.sort_by(|a, b| {
        a.span()
            .partial_cmp(&b.span())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut joined: Vec<Edge> = Vec::new();
    for edge in sorted {
        match joined.last_mut() {
            Some(last) if edge.span().0 <= last.span().1 + tolerance => {
                if edge.span().1 > last.span().1 {
                    *last = last.with_span_end(edge.span().1);
                }
                last.stroke_width = last.stroke_width.max(edge.stroke_width);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

/// Snap-then-join normalization for one axis of edges.
pub(crate) fn merge_axis(edges: Vec<Edge>, snap_tolerance: f64, join_tolerance: f64) -> Vec<Edge> {
    let mut snapped = snap_axis(edges, snap_tolerance);
    snapped.sort_by(|a, b| {
        (a.constant(), a.span())
            .partial_cmp(&(b.constant(), b.span()))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    snapped
        .into_iter()
        .chunk_by(|e| e.constant().to_bits())
        .into_iter()
        .flat_map(|(_, group)| join_edge_group(group.collect(), join_tolerance))
        .collect()
}

/// Drops edges strictly shorter than `min_length`.
pub(crate) fn filter_min_length(edges: Vec<Edge>, min_length: f64) -> Vec<Edge> {
    edges
        .into_iter()
        .filter(|e| e.length() >= min_length)
        .collect()
}
