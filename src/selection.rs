//! Caret and selection bookkeeping for the placeholder field's text surface.
//!
//! Offsets are UTF-8 byte offsets into the field text, always on a char boundary. The
//! platform input handler speaks UTF-16, so conversions live here as well.

use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub range: Range<usize>,
    /// The caret sits at `range.start` instead of `range.end`.
    pub reversed: bool,
}

impl Selection {
    pub fn caret(offset: usize) -> Self {
        Self {
            range: offset..offset,
            reversed: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Where the caret is drawn.
    pub fn head(&self) -> usize {
        if self.reversed {
            self.range.start
        } else {
            self.range.end
        }
    }

    pub fn move_to(&mut self, offset: usize) {
        *self = Self::caret(offset);
    }

    /// Move the head to `offset`, keeping the other end anchored.
    pub fn select_to(&mut self, offset: usize) {
        if self.reversed {
            self.range.start = offset;
        } else {
            self.range.end = offset;
        }
        if self.range.end < self.range.start {
            self.reversed = !self.reversed;
            self.range = self.range.end..self.range.start;
        }
    }

    pub fn select_all(&mut self, text: &str) {
        self.range = 0..text.len();
        self.reversed = false;
    }

    /// Pull both ends back inside `text` after it was replaced from outside.
    pub fn clamp_to(&mut self, text: &str) {
        let start = floor_boundary(text, self.range.start);
        let end = floor_boundary(text, self.range.end);
        self.range = start..end;
    }
}

/// Apply `new_text` over `range`, returning the new text and the caret after the insert.
pub fn replace_range(text: &str, range: &Range<usize>, new_text: &str) -> (String, usize) {
    let mut result = String::with_capacity(text.len() - range.len() + new_text.len());
    result.push_str(&text[..range.start]);
    result.push_str(new_text);
    result.push_str(&text[range.end..]);
    (result, range.start + new_text.len())
}

pub fn previous_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .char_indices()
        .next_back()
        .map(|(ix, _)| ix)
        .unwrap_or(0)
}

pub fn next_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map(|c| offset + c.len_utf8())
        .unwrap_or(text.len())
}

/// Largest char boundary at or before `offset`, clamped to the text length.
pub fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

pub fn offset_to_utf16(text: &str, offset: usize) -> usize {
    text[..floor_boundary(text, offset)]
        .chars()
        .map(char::len_utf16)
        .sum()
}

pub fn offset_from_utf16(text: &str, offset: usize) -> usize {
    let mut utf8_offset = 0;
    let mut utf16_count = 0;
    for c in text.chars() {
        if utf16_count >= offset {
            break;
        }
        utf16_count += c.len_utf16();
        utf8_offset += c.len_utf8();
    }
    utf8_offset
}

pub fn range_to_utf16(text: &str, range: &Range<usize>) -> Range<usize> {
    offset_to_utf16(text, range.start)..offset_to_utf16(text, range.end)
}

pub fn range_from_utf16(text: &str, range: &Range<usize>) -> Range<usize> {
    offset_from_utf16(text, range.start)..offset_from_utf16(text, range.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_to_flips_direction() {
        let mut selection = Selection::caret(5);
        selection.select_to(8);
        assert_eq!(selection.range, 5..8);
        assert_eq!(selection.head(), 8);

        selection.select_to(2);
        assert_eq!(selection.range, 2..5);
        assert!(selection.reversed);
        assert_eq!(selection.head(), 2);
    }

    #[test]
    fn test_select_all_and_clamp() {
        let mut selection = Selection::default();
        selection.select_all("Bearer {{token}}");
        assert_eq!(selection.range, 0..16);

        selection.clamp_to("Bearer x");
        assert_eq!(selection.range, 0..8);
    }

    #[test]
    fn test_clamp_lands_on_char_boundary() {
        let mut selection = Selection::caret(3);
        selection.clamp_to("aé");
        assert_eq!(selection.range, 3..3);

        let mut selection = Selection::caret(2);
        selection.clamp_to("aé");
        assert_eq!(selection.range, 1..1);
    }

    #[test]
    fn test_replace_range() {
        assert_eq!(
            replace_range("Bearer {{token}}", &(7..16), "abc"),
            ("Bearer abc".to_string(), 10)
        );
        assert_eq!(replace_range("ab", &(1..1), "\n"), ("a\nb".to_string(), 2));
    }

    #[test]
    fn test_boundaries_skip_whole_chars() {
        let text = "aé{";
        assert_eq!(next_boundary(text, 1), 3);
        assert_eq!(previous_boundary(text, 3), 1);
        assert_eq!(previous_boundary(text, 0), 0);
        assert_eq!(next_boundary(text, text.len()), text.len());
    }

    #[test]
    fn test_utf16_conversion() {
        let text = "a😀{{x}}";
        assert_eq!(offset_to_utf16(text, 5), 3);
        assert_eq!(offset_from_utf16(text, 3), 5);
        assert_eq!(range_to_utf16(text, &(5..10)), 3..8);
        assert_eq!(range_from_utf16(text, &(3..8)), 5..10);
    }
}
