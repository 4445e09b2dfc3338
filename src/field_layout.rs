//! Layout rules shared by the single-line and multi-line placeholder fields.
//!
//! A field shapes its text exactly once. Placeholders are styled runs inside that one
//! layout, so chips wrap, scroll and clip together with the literal text around them.

use gpui::{Hsla, TextRun};
use std::ops::Range;

use crate::placeholder::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// One line, scrolls horizontally instead of wrapping.
    SingleLine,
    /// Wraps and scrolls vertically, showing `rows` lines.
    MultiLine { rows: usize },
}

impl Default for FieldLayout {
    fn default() -> Self {
        FieldLayout::SingleLine
    }
}

impl FieldLayout {
    pub fn multi_line(rows: usize) -> Self {
        FieldLayout::MultiLine { rows: rows.max(1) }
    }

    pub fn is_multi_line(&self) -> bool {
        matches!(self, FieldLayout::MultiLine { .. })
    }

    pub fn wraps(&self) -> bool {
        self.is_multi_line()
    }

    pub fn rows(&self) -> usize {
        match self {
            FieldLayout::SingleLine => 1,
            FieldLayout::MultiLine { rows } => *rows,
        }
    }
}

/// A byte range of the text and whether it is drawn as a chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub range: Range<usize>,
    pub chip: bool,
}

/// Collapse rendered segments into style spans, merging neighbours with the same style.
///
/// Adjacent placeholders stay separate spans so each chip keeps its own edges.
pub fn styled_spans(segments: &[Segment<'_>]) -> Vec<StyledSpan> {
    let mut spans: Vec<StyledSpan> = Vec::with_capacity(segments.len());
    for segment in segments {
        let chip = segment.is_token();
        match spans.last_mut() {
            Some(last) if !chip && !last.chip && last.range.end == segment.range.start => {
                last.range.end = segment.range.end;
            }
            _ => spans.push(StyledSpan {
                range: segment.range.clone(),
                chip,
            }),
        }
    }
    spans.retain(|span| !span.range.is_empty());
    spans
}

/// Text runs for one shaping pass: `literal` for plain text and `chip` for placeholders.
pub fn text_runs(spans: &[StyledSpan], literal: &TextRun, chip: &TextRun) -> Vec<TextRun> {
    spans
        .iter()
        .map(|span| {
            let style = if span.chip { chip } else { literal };
            TextRun {
                len: span.range.len(),
                ..style.clone()
            }
        })
        .collect()
}

/// Underline the IME composition range, splitting runs where needed.
pub fn underline_marked(runs: Vec<TextRun>, marked: &Range<usize>, color: Hsla) -> Vec<TextRun> {
    if marked.is_empty() {
        return runs;
    }

    let mut result = Vec::with_capacity(runs.len() + 2);
    let mut start = 0;
    for run in runs {
        let end = start + run.len;
        let cuts = [start, marked.start.clamp(start, end), marked.end.clamp(start, end), end];
        for pair in cuts.windows(2) {
            let len = pair[1] - pair[0];
            if len == 0 {
                continue;
            }
            let in_marked = pair[0] >= marked.start && pair[1] <= marked.end;
            result.push(TextRun {
                len,
                underline: in_marked.then(|| gpui::UnderlineStyle {
                    color: Some(color),
                    thickness: gpui::px(1.),
                    wavy: false,
                }),
                ..run.clone()
            });
        }
        start = end;
    }
    result
}

/// Byte offset where each hard line of `text` starts.
pub fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(ix, _)| ix + 1))
        .collect()
}

/// Index of the hard line holding `offset`.
pub fn line_for_offset(starts: &[usize], offset: usize) -> usize {
    starts
        .partition_point(|start| *start <= offset)
        .saturating_sub(1)
}

/// Index of the line whose top edge is the last one at or above `y`.
pub fn line_for_y(tops: &[f32], y: f32) -> usize {
    tops.partition_point(|top| *top <= y).saturating_sub(1)
}

/// Scroll offset that keeps `start..end` inside a viewport of `viewport` length.
///
/// The offset only moves when the range is out of view, and then by as little as needed.
pub fn reveal_offset(scroll: f32, start: f32, end: f32, viewport: f32) -> f32 {
    if start < scroll {
        start
    } else if end > scroll + viewport {
        (end - viewport).min(start)
    } else {
        scroll
    }
}

/// Keep a scroll offset between zero and the overflow of `content` past `viewport`.
pub fn clamp_scroll(scroll: f32, content: f32, viewport: f32) -> f32 {
    scroll.clamp(0., (content - viewport).max(0.))
}

/// Rectangles `(left, top, right, bottom)` covering a selection between two caret
/// positions given as `(x, y)` of their line's top edge.
pub fn selection_rects(
    start: (f32, f32),
    end: (f32, f32),
    line_height: f32,
    width: f32,
) -> Vec<(f32, f32, f32, f32)> {
    let (start, end) = if (end.1, end.0) < (start.1, start.0) {
        (end, start)
    } else {
        (start, end)
    };

    if (end.1 - start.1).abs() < line_height / 2. {
        return vec![(start.0, start.1, end.0, start.1 + line_height)];
    }

    let mut rects = vec![(start.0, start.1, width, start.1 + line_height)];
    let middle_top = start.1 + line_height;
    if end.1 - middle_top >= line_height / 2. {
        rects.push((0., middle_top, width, end.1));
    }
    rects.push((0., end.1, end.0, end.1 + line_height));
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::{render, scan};
    use gpui::{font, hsla, FontWeight};

    fn spans_for(text: &str) -> Vec<StyledSpan> {
        let matches = scan(text);
        styled_spans(&render(text, &matches))
    }

    fn runs() -> (TextRun, TextRun) {
        let literal = TextRun {
            len: 0,
            font: font("Helvetica"),
            color: hsla(0., 0., 0., 1.),
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        let chip = TextRun {
            font: gpui::Font {
                weight: FontWeight::MEDIUM,
                ..literal.font.clone()
            },
            background_color: Some(hsla(0.6, 0.5, 0.9, 1.)),
            ..literal.clone()
        };
        (literal, chip)
    }

    // ============ span tests ============

    #[test]
    fn test_spans_cover_text_once() {
        let text = "Bearer {{token}} and {{x}}";
        let spans = spans_for(text);
        assert_eq!(
            spans,
            vec![
                StyledSpan { range: 0..7, chip: false },
                StyledSpan { range: 7..16, chip: true },
                StyledSpan { range: 16..21, chip: false },
                StyledSpan { range: 21..26, chip: true },
            ]
        );
        assert_eq!(spans.iter().map(|s| s.range.len()).sum::<usize>(), text.len());
    }

    #[test]
    fn test_adjacent_chips_stay_separate() {
        let spans = spans_for("{{a}}{{b}}");
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|span| span.chip));
    }

    #[test]
    fn test_plain_text_is_one_span() {
        assert_eq!(
            spans_for("no tokens here"),
            vec![StyledSpan { range: 0..14, chip: false }]
        );
        assert!(spans_for("").is_empty());
    }

    // ============ run tests ============

    #[test]
    fn test_chip_runs_share_the_only_layout() {
        let text = "Bearer {{token}}";
        let (literal, chip) = runs();
        let runs = text_runs(&spans_for(text), &literal, &chip);

        // Every byte is shaped exactly once, so no second copy of the text can be drawn.
        assert_eq!(runs.iter().map(|r| r.len).sum::<usize>(), text.len());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len, 7);
        assert_eq!(runs[0].background_color, None);
        assert_eq!(runs[1].len, 9);
        assert_eq!(runs[1].background_color, chip.background_color);
        assert_eq!(runs[1].font.weight, FontWeight::MEDIUM);
        assert_eq!(runs[1].color, literal.color);
    }

    #[test]
    fn test_multi_line_runs_include_newlines() {
        let text = "{\n  \"id\": {{id}}\n}";
        let (literal, chip) = runs();
        let runs = text_runs(&spans_for(text), &literal, &chip);
        assert_eq!(runs.iter().map(|r| r.len).sum::<usize>(), text.len());
        assert_eq!(runs.iter().filter(|r| r.background_color.is_some()).count(), 1);
    }

    #[test]
    fn test_underline_marked_splits_runs() {
        let (literal, chip) = runs();
        let runs = text_runs(&spans_for("ab{{c}}"), &literal, &chip);
        let color = hsla(0., 0., 0., 1.);
        let marked = underline_marked(runs, &(1..4), color);

        assert_eq!(
            marked.iter().map(|r| (r.len, r.underline.is_some())).collect::<Vec<_>>(),
            vec![(1, false), (1, true), (2, true), (3, false)]
        );
        assert_eq!(marked[2].background_color, chip.background_color);
    }

    #[test]
    fn test_underline_empty_range_is_noop() {
        let (literal, chip) = runs();
        let runs = text_runs(&spans_for("abc"), &literal, &chip);
        assert_eq!(underline_marked(runs.clone(), &(2..2), literal.color), runs);
    }

    // ============ line tests ============

    #[test]
    fn test_line_starts() {
        assert_eq!(line_starts("one"), vec![0]);
        assert_eq!(line_starts("a\nbc\n"), vec![0, 2, 5]);
        assert_eq!(line_starts(""), vec![0]);
    }

    #[test]
    fn test_line_for_offset() {
        let starts = line_starts("a\nbc\n");
        assert_eq!(line_for_offset(&starts, 0), 0);
        assert_eq!(line_for_offset(&starts, 1), 0);
        assert_eq!(line_for_offset(&starts, 2), 1);
        assert_eq!(line_for_offset(&starts, 4), 1);
        assert_eq!(line_for_offset(&starts, 5), 2);
    }

    #[test]
    fn test_line_for_y() {
        let tops = [0., 20., 60.];
        assert_eq!(line_for_y(&tops, -5.), 0);
        assert_eq!(line_for_y(&tops, 19.), 0);
        assert_eq!(line_for_y(&tops, 20.), 1);
        assert_eq!(line_for_y(&tops, 59.), 1);
        assert_eq!(line_for_y(&tops, 200.), 2);
    }

    // ============ scroll tests ============

    #[test]
    fn test_reveal_offset() {
        // Already visible: no movement.
        assert_eq!(reveal_offset(0., 10., 12., 100.), 0.);
        // Past the right edge: scroll just far enough.
        assert_eq!(reveal_offset(0., 150., 152., 100.), 52.);
        // Before the left edge: scroll back to it.
        assert_eq!(reveal_offset(80., 20., 22., 100.), 20.);
        // Taller than the viewport: show its start.
        assert_eq!(reveal_offset(0., 40., 200., 100.), 40.);
    }

    #[test]
    fn test_clamp_scroll() {
        assert_eq!(clamp_scroll(-10., 300., 100.), 0.);
        assert_eq!(clamp_scroll(250., 300., 100.), 200.);
        assert_eq!(clamp_scroll(50., 80., 100.), 0.);
    }

    // ============ selection tests ============

    #[test]
    fn test_selection_on_one_row() {
        assert_eq!(
            selection_rects((30., 0.), (10., 0.), 20., 200.),
            vec![(10., 0., 30., 20.)]
        );
    }

    #[test]
    fn test_selection_across_rows() {
        assert_eq!(
            selection_rects((30., 0.), (50., 60.), 20., 200.),
            vec![
                (30., 0., 200., 20.),
                (0., 20., 200., 60.),
                (0., 60., 50., 80.),
            ]
        );
        assert_eq!(selection_rects((30., 20.), (50., 40.), 20., 200.).len(), 2);
    }

    #[test]
    fn test_layout_rows() {
        assert_eq!(FieldLayout::SingleLine.rows(), 1);
        assert_eq!(FieldLayout::multi_line(8).rows(), 8);
        assert_eq!(FieldLayout::multi_line(0).rows(), 1);
        assert!(!FieldLayout::default().wraps());
    }
}
