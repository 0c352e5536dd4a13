//! Source location tracking

use std::fmt;

/// Source position. Lines are 1-indexed, columns are 0-indexed character
/// offsets into the line, matching the token position model used by the
/// rewrite passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub col: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Create a dummy position
    #[inline]
    pub fn dummy() -> Self {
        Self { line: 0, col: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Source span (start position to end position, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a dummy span
    #[inline]
    pub fn dummy() -> Self {
        Self {
            start: Position::dummy(),
            end: Position::dummy(),
        }
    }

    /// Check if this is a dummy span
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0
    }

    /// Smallest span covering both `self` and `other`.
    /// Dummy spans are ignored.
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 5) < Position::new(2, 0));
        assert!(Position::new(3, 1) < Position::new(3, 2));
    }

    #[test]
    fn test_merge_ignores_dummy() {
        let a = Span::new(Position::new(1, 2), Position::new(1, 4));
        assert_eq!(Span::dummy().merge(a), a);
        assert_eq!(a.merge(Span::dummy()), a);
    }

    #[test]
    fn test_merge_covers_both() {
        let a = Span::new(Position::new(1, 2), Position::new(1, 4));
        let b = Span::new(Position::new(1, 6), Position::new(2, 1));
        let merged = a.merge(b);
        assert_eq!(merged.start, Position::new(1, 2));
        assert_eq!(merged.end, Position::new(2, 1));
    }
}
