use gpui::{point, px, Pixels, Point, WrappedLine};

use crate::field_layout;

/// The shaped text of a field: one wrapped line per hard line, stacked top to bottom.
///
/// Positions are relative to the top-left of the text before scrolling.
#[derive(Default)]
pub struct TextLayout {
    lines: Vec<WrappedLine>,
    /// Byte offset of each hard line in the full text.
    starts: Vec<usize>,
    /// Top edge of each hard line.
    tops: Vec<f32>,
    height: f32,
    len: usize,
    line_height: Pixels,
}

impl TextLayout {
    pub fn new(lines: Vec<WrappedLine>, line_height: Pixels) -> Self {
        let mut starts = Vec::with_capacity(lines.len());
        let mut tops = Vec::with_capacity(lines.len());
        let mut start = 0;
        let mut top = 0.;
        for line in &lines {
            starts.push(start);
            tops.push(top);
            start += line.len() + 1;
            top += f32::from(line.size(line_height).height);
        }

        Self {
            lines,
            starts,
            tops,
            height: top,
            len: start.saturating_sub(1),
            line_height,
        }
    }

    pub fn line_height(&self) -> Pixels {
        self.line_height
    }

    pub fn height(&self) -> Pixels {
        px(self.height)
    }

    pub fn width(&self) -> Pixels {
        self.lines
            .iter()
            .map(|line| line.width())
            .fold(px(0.), |widest, width| widest.max(width))
    }

    /// Each hard line with the y offset of its top edge.
    pub fn lines(&self) -> impl Iterator<Item = (&WrappedLine, Pixels)> {
        self.lines.iter().zip(self.tops.iter().map(|top| px(*top)))
    }

    /// Top-left of the caret slot before the byte at `index`.
    pub fn position_for_index(&self, index: usize) -> Point<Pixels> {
        let ix = field_layout::line_for_offset(&self.starts, index);
        let Some(line) = self.lines.get(ix) else {
            return point(px(0.), px(0.));
        };

        let local = index.saturating_sub(self.starts[ix]).min(line.len());
        let position = line
            .position_for_index(local, self.line_height)
            .unwrap_or(point(px(0.), px(0.)));
        point(position.x, position.y + px(self.tops[ix]))
    }

    /// Byte index under `position`.
    ///
    /// `Ok` when the position is over a glyph, `Err` with the nearest caret slot when it
    /// is past the end of a row or outside the text. With `closest` the result snaps to
    /// the nearer side of the glyph, which is what caret placement wants.
    pub fn index_for_position(&self, position: Point<Pixels>, closest: bool) -> Result<usize, usize> {
        let y = f32::from(position.y);
        if self.lines.is_empty() || y < 0. {
            return Err(0);
        }
        if y >= self.height {
            return Err(self.len);
        }

        let ix = field_layout::line_for_y(&self.tops, y);
        let line = &self.lines[ix];
        let start = self.starts[ix];
        let local = point(position.x, position.y - px(self.tops[ix]));
        let result = if closest {
            line.closest_index_for_position(local, self.line_height)
        } else {
            line.index_for_position(local, self.line_height)
        };
        result.map(|index| start + index).map_err(|index| start + index)
    }

    /// Caret slot nearest to `position`.
    pub fn caret_for_position(&self, position: Point<Pixels>) -> usize {
        match self.index_for_position(position, true) {
            Ok(index) | Err(index) => index,
        }
    }
}
