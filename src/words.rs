//! Word reconstruction from positioned characters.
//!
//! Characters are grouped by rotation class, banded into lines, sorted
//! into reading order, and segmented into words by gap and baseline
//! tolerances. The reading direction under rotation follows the
//! clockwise convention unless configured otherwise.

use std::collections::HashSet;

use itertools::Itertools;

use crate::clustering::cluster_objects;
use crate::geometry::{bbox_union, BBox};
use crate::objects::Char;
use crate::settings::{SplitPunctuation, WordsExtractSettings};

/// ASCII punctuation used by `SplitPunctuation::All`.
const SPLIT_ALL_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Rotation classes clump at 0.001 degrees.
const ROTATION_EPSILON: f64 = 0.001;

/// A run of contiguous text on one baseline.
#[derive(Clone, Debug)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
    /// Rotation in degrees, shared by every contributing character.
    pub rotation: f64,
}

/// Rotation quadrant; arbitrary angles fall into the nearest band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quadrant {
    R0,
    R90,
    R180,
    R270,
}

fn quadrant(rotation: f64) -> Quadrant {
    if !(45.0..315.0).contains(&rotation) {
        Quadrant::R0
    } else if rotation < 135.0 {
        Quadrant::R90
    } else if rotation < 225.0 {
        Quadrant::R180
    } else {
        Quadrant::R270
    }
}

fn expand_ligature(c: char) -> Option<&'static str> {
    match c {
        '\u{fb00}' => Some("ff"),
        '\u{fb03}' => Some("ffi"),
        '\u{fb04}' => Some("ffl"),
        '\u{fb01}' => Some("fi"),
        '\u{fb02}' => Some("fl"),
        '\u{fb06}' => Some("st"),
        '\u{fb05}' => Some("st"),
        _ => None,
    }
}

/// Groups characters into words under a fixed settings record.
pub(crate) struct WordExtractor {
    x_tolerance: f64,
    y_tolerance: f64,
    keep_blank_chars: bool,
    use_text_flow: bool,
    text_read_in_clockwise: bool,
    split_chars: HashSet<char>,
    expand_ligatures: bool,
    need_strip: bool,
}

impl WordExtractor {
    pub fn new(settings: &WordsExtractSettings) -> Self {
        let split_chars = match &settings.split_at_punctuation {
            Some(SplitPunctuation::All) => SPLIT_ALL_PUNCTUATION.chars().collect(),
            Some(SplitPunctuation::Custom(chars)) => chars.chars().collect(),
            None => HashSet::new(),
        };
        Self {
            x_tolerance: settings.x_tolerance,
            y_tolerance: settings.y_tolerance,
            keep_blank_chars: settings.keep_blank_chars,
            use_text_flow: settings.use_text_flow,
            text_read_in_clockwise: settings.text_read_in_clockwise,
            split_chars,
            expand_ligatures: settings.expand_ligatures,
            need_strip: settings.need_strip,
        }
    }

    /// Whether `curr` starts a new word after `prev`.
    ///
    /// The character boxes are projected onto the reading axis of the
    /// current rotation quadrant; a word breaks when the projection
    /// runs backwards, jumps past the gap tolerance, or drifts forward
    /// off the baseline.
    fn begins_new_word(&self, prev: &Char, curr: &Char) -> bool {
        let cw = self.text_read_in_clockwise;
        let (x, y, ay, cy, ax, bx, cx) = match quadrant(curr.rotation) {
            Quadrant::R0 => {
                let (ax, bx, cx) = if cw {
                    (prev.bbox.x0, prev.bbox.x1, curr.bbox.x0)
                } else {
                    (-prev.bbox.x1, -prev.bbox.x0, -curr.bbox.x1)
                };
                (
                    self.x_tolerance,
                    self.y_tolerance,
                    prev.bbox.top,
                    curr.bbox.top,
                    ax,
                    bx,
                    cx,
                )
            }
            Quadrant::R90 => {
                let (ax, bx, cx) = if cw {
                    (prev.bbox.top, prev.bbox.bottom, curr.bbox.top)
                } else {
                    (-prev.bbox.bottom, -prev.bbox.top, -curr.bbox.bottom)
                };
                (
                    self.y_tolerance,
                    self.x_tolerance,
                    prev.bbox.x0,
                    curr.bbox.x0,
                    ax,
                    bx,
                    cx,
                )
            }
            Quadrant::R180 => {
                let (ax, bx, cx) = if cw {
                    (-prev.bbox.x1, -prev.bbox.x0, -curr.bbox.x1)
                } else {
                    (prev.bbox.x0, prev.bbox.x1, curr.bbox.x0)
                };
                (
                    self.x_tolerance,
                    self.y_tolerance,
                    prev.bbox.bottom,
                    curr.bbox.bottom,
                    ax,
                    bx,
                    cx,
                )
            }
            Quadrant::R270 => {
                let (ax, bx, cx) = if cw {
                    (-prev.bbox.bottom, -prev.bbox.top, -curr.bbox.bottom)
                } else {
                    (prev.bbox.top, prev.bbox.bottom, curr.bbox.top)
                };
                (
                    self.y_tolerance,
                    self.x_tolerance,
                    prev.bbox.x0,
                    curr.bbox.x0,
                    ax,
                    bx,
                    cx,
                )
            }
        };

        (cx < ax) || (cx > bx + x) || (cy > ay + y)
    }

    /// Sorts characters into reading order: rotation classes, then line
    /// bands within a class, then the quadrant's reading direction
    /// within a band.
    fn sort_chars<'c>(&self, chars: &'c [Char]) -> Vec<&'c Char> {
        let refs: Vec<&Char> = chars.iter().collect();
        let mut ordered = Vec::with_capacity(refs.len());

        for rotation_cluster in cluster_objects(&refs, |c| c.rotation, ROTATION_EPSILON) {
            let Some(first) = rotation_cluster.first() else {
                continue;
            };
            let quad = quadrant(first.rotation);
            let band_key: fn(&&Char) -> f64 = if first.upright {
                |c| c.bbox.top
            } else {
                |c| c.bbox.x0
            };

            for mut band in cluster_objects(&rotation_cluster, band_key, self.y_tolerance) {
                let ascending = match quad {
                    Quadrant::R0 | Quadrant::R90 => self.text_read_in_clockwise,
                    Quadrant::R180 | Quadrant::R270 => !self.text_read_in_clockwise,
                };
                let along: fn(&&Char) -> f64 = match quad {
                    Quadrant::R0 | Quadrant::R180 => |c| c.bbox.x0,
                    Quadrant::R90 | Quadrant::R270 => |c| c.bbox.top,
                };
                band.sort_by(|a, b| {
                    let ord = along(a)
                        .partial_cmp(&along(b))
                        .unwrap_or(std::cmp::Ordering::Equal);
                    if ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                });
                ordered.extend(band);
            }
        }

        ordered
    }

    /// Segments an ordered run into word groups.
    fn chars_to_words<'c>(&self, ordered: Vec<&'c Char>) -> Vec<Vec<&'c Char>> {
        let mut words: Vec<Vec<&Char>> = Vec::new();
        let mut current: Vec<&Char> = Vec::new();

        for c in ordered {
            let is_blank = c.glyph.is_some_and(char::is_whitespace);
            let is_split = c.glyph.is_some_and(|g| self.split_chars.contains(&g));

            if !self.keep_blank_chars && is_blank {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else if is_split {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(vec![c]);
            } else if !current.is_empty() && self.begins_new_word(current.last().unwrap(), c) {
                words.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current.push(c);
            }
        }

        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    /// Merges a non-empty word group into a `Word`.
    fn merge_chars(&self, group: &[&Char]) -> Word {
        let bbox = bbox_union(group.iter().map(|c| &c.bbox)).expect("non-empty word group");
        let rotation = group[0].rotation;

        // Glyphs of a 270-degree run arrive in reverse reading order.
        let glyphs: Box<dyn Iterator<Item = &&Char>> =
            if (rotation - 270.0).abs() < ROTATION_EPSILON {
                Box::new(group.iter().rev())
            } else {
                Box::new(group.iter())
            };

        let mut text = String::with_capacity(group.len());
        for c in glyphs {
            let Some(glyph) = c.glyph else {
                continue;
            };
            match expand_ligature(glyph) {
                Some(expansion) if self.expand_ligatures => text.push_str(expansion),
                _ => text.push(glyph),
            }
        }
        if self.need_strip {
            text = text.trim().to_string();
        }

        Word {
            text,
            bbox,
            rotation,
        }
    }

    /// Reconstructs words from a page's characters.
    pub fn extract_words(&self, chars: &[Char]) -> Vec<Word> {
        let ordered: Vec<&Char> = if self.use_text_flow {
            chars.iter().collect()
        } else {
            self.sort_chars(chars)
        };

        let mut words = Vec::new();
        for (_, run) in &ordered.into_iter().chunk_by(|c| c.rotation.to_bits()) {
            for group in self.chars_to_words(run.collect()) {
                let word = self.merge_chars(&group);
                if !word.text.is_empty() {
                    words.push(word);
                }
            }
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(glyph: char, x0: f64, top: f64, x1: f64, bottom: f64) -> Char {
        Char {
            glyph: Some(glyph),
            bbox: BBox::new(x0, top, x1, bottom),
            rotation: 0.0,
            upright: true,
        }
    }

    fn ch_rotated(glyph: char, x0: f64, top: f64, x1: f64, bottom: f64, rotation: f64) -> Char {
        Char {
            glyph: Some(glyph),
            bbox: BBox::new(x0, top, x1, bottom),
            rotation,
            upright: false,
        }
    }

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn adjacent_chars_form_one_word() {
        let chars = vec![
            ch('H', 0.0, 0.0, 5.0, 10.0),
            ch('i', 6.0, 0.0, 8.0, 10.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["Hi"]);
        assert_eq!(words[0].bbox, BBox::new(0.0, 0.0, 8.0, 10.0));
    }

    #[test]
    fn wide_gap_splits_words() {
        let chars = vec![
            ch('a', 0.0, 0.0, 5.0, 10.0),
            ch('b', 20.0, 0.0, 25.0, 10.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["a", "b"]);
    }

    #[test]
    fn whitespace_breaks_unless_kept() {
        let chars = vec![
            ch('a', 0.0, 0.0, 5.0, 10.0),
            ch(' ', 5.0, 0.0, 7.0, 10.0),
            ch('b', 7.0, 0.0, 12.0, 10.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["a", "b"]);

        let settings = WordsExtractSettings {
            keep_blank_chars: true,
            need_strip: false,
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        assert_eq!(texts(&words), ["a b"]);
    }

    #[test]
    fn need_strip_trims_kept_blanks() {
        let chars = vec![
            ch(' ', 0.0, 0.0, 2.0, 10.0),
            ch('a', 2.0, 0.0, 7.0, 10.0),
        ];
        let settings = WordsExtractSettings {
            keep_blank_chars: true,
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        assert_eq!(texts(&words), ["a"]);
    }

    #[test]
    fn split_at_punctuation_forces_breaks() {
        let chars = vec![
            ch('a', 0.0, 0.0, 5.0, 10.0),
            ch(':', 5.0, 0.0, 7.0, 10.0),
            ch('b', 7.0, 0.0, 12.0, 10.0),
        ];
        let settings = WordsExtractSettings {
            split_at_punctuation: Some(SplitPunctuation::All),
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        assert_eq!(texts(&words), ["a", ":", "b"]);

        let settings = WordsExtractSettings {
            split_at_punctuation: Some(SplitPunctuation::Custom(";".into())),
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        assert_eq!(texts(&words), ["a:b"]);
    }

    #[test]
    fn ligatures_expand_by_default() {
        let chars = vec![
            ch('\u{fb01}', 0.0, 0.0, 5.0, 10.0),
            ch('n', 5.0, 0.0, 10.0, 10.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["fin"]);

        let settings = WordsExtractSettings {
            expand_ligatures: false,
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        assert_eq!(texts(&words), ["\u{fb01}n"]);
    }

    #[test]
    fn lines_band_by_y_tolerance() {
        let chars = vec![
            ch('b', 0.0, 20.0, 5.0, 30.0),
            ch('a', 0.0, 0.0, 5.0, 10.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["a", "b"]);
    }

    #[test]
    fn rotated_run_reads_top_to_bottom() {
        let chars = vec![
            ch_rotated('w', 0.0, 10.0, 10.0, 15.0, 90.0),
            ch_rotated('o', 0.0, 16.0, 10.0, 21.0, 90.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["wo"]);
        assert_eq!(words[0].rotation, 90.0);
    }

    #[test]
    fn rotated_270_merges_in_reverse() {
        let chars = vec![
            ch_rotated('k', 0.0, 10.0, 10.0, 15.0, 270.0),
            ch_rotated('o', 0.0, 4.0, 10.0, 9.0, 270.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["ok"]);
    }

    #[test]
    fn counter_clockwise_reverses_reading_order() {
        let chars = vec![
            ch('a', 0.0, 0.0, 5.0, 10.0),
            ch('b', 5.0, 0.0, 10.0, 10.0),
        ];
        let settings = WordsExtractSettings {
            text_read_in_clockwise: false,
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        assert_eq!(texts(&words), ["ba"]);
    }

    #[test]
    fn text_flow_preserves_source_order() {
        let chars = vec![
            ch('b', 10.0, 0.0, 15.0, 10.0),
            ch('a', 0.0, 0.0, 5.0, 10.0),
        ];
        let settings = WordsExtractSettings {
            use_text_flow: true,
            ..Default::default()
        };
        let words = WordExtractor::new(&settings).extract_words(&chars);
        // source order kept: "b" first, and the backwards jump splits
        assert_eq!(texts(&words), ["b", "a"]);
    }

    #[test]
    fn unmapped_glyphs_contribute_geometry_only() {
        let chars = vec![
            ch('a', 0.0, 0.0, 5.0, 10.0),
            Char {
                glyph: None,
                bbox: BBox::new(5.0, 0.0, 8.0, 10.0),
                rotation: 0.0,
                upright: true,
            },
            ch('b', 8.0, 0.0, 13.0, 10.0),
        ];
        let words = WordExtractor::new(&WordsExtractSettings::default()).extract_words(&chars);
        assert_eq!(texts(&words), ["ab"]);
        assert_eq!(words[0].bbox.x1, 13.0);
    }
}
