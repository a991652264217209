//! Source spans and line lookup.
//!
//! Tokens carry a byte offset; every span in the compiler is derived from
//! token offsets and text lengths, so spans are half-open byte ranges.

use std::fmt;

/// A byte offset into source text.
pub type TextPos = u32;

/// A half-open byte range `[start, start + length)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// Create a span from start and (exclusive) end positions.
    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// An empty span at a position. Used for tokens the parser synthesizes.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { start: pos, length: 0 }
    }

    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The smallest span covering both spans.
    pub fn union(&self, other: &TextSpan) -> TextSpan {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        TextSpan::from_bounds(start, end)
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// 0-based line and byte column.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    pub line: u32,
    pub column: u32,
}

/// Maps byte offsets to lines for diagnostic display.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(newline_offsets(text));
        Self { line_starts }
    }

    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => (line - 1) as u32,
        }
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        LineAndColumn {
            line,
            column: pos - self.line_starts[line as usize],
        }
    }
}

fn newline_offsets(text: &str) -> impl Iterator<Item = TextPos> + '_ {
    text.bytes()
        .enumerate()
        .filter(|(_, b)| *b == b'\n')
        .map(|(i, _)| (i + 1) as TextPos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span_bounds() {
        let span = TextSpan::from_bounds(5, 15);
        assert_eq!(span.start, 5);
        assert_eq!(span.length, 10);
        assert_eq!(span.end(), 15);
        assert_eq!(span.to_string(), "[5, 15)");
    }

    #[test]
    fn test_text_span_union() {
        let a = TextSpan::from_bounds(2, 4);
        let b = TextSpan::from_bounds(8, 9);
        assert_eq!(a.union(&b), TextSpan::from_bounds(2, 9));
        assert_eq!(b.union(&a), TextSpan::from_bounds(2, 9));
    }

    #[test]
    fn test_line_map() {
        let map = LineMap::new("<?php\necho 1;\necho 2;");
        assert_eq!(map.line_of(0), 0);
        assert_eq!(map.line_of(5), 0);
        assert_eq!(map.line_of(6), 1);
        let lc = map.line_and_column_of(11);
        assert_eq!(lc, LineAndColumn { line: 1, column: 5 });
    }
}
