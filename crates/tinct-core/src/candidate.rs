use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::catalog::FormatRule;
use crate::color::ColorValue;
use crate::shape::Shape;

/// Byte range of a literal in the scanned document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// `start <= offset < end`.
    #[inline]
    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    #[inline]
    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Index of a candidate within the scan that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(pub usize);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One detected color literal.
///
/// Immutable once created: an edit produces replacement text, never a
/// modified candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: CandidateId,
    pub span: Span,
    /// The literal exactly as written.
    pub text: String,
    pub shape: Shape,
    pub value: ColorValue,
    /// At least one written channel was outside `[0, 255]`.
    pub clamped: bool,
    pub(crate) rule: Arc<dyn FormatRule>,
}

impl Candidate {
    /// Human-readable name of the notation, for pickers.
    pub fn label(&self) -> &str {
        self.rule.label()
    }

    pub fn rule(&self) -> &Arc<dyn FormatRule> {
        &self.rule
    }
}
