//! Scanner: finds color literals in arbitrary text.
//!
//! One left-to-right pass. At each character boundary every rule is tried in
//! catalog order; the first match becomes a [`Candidate`] and the scan
//! resumes after it, otherwise the scan moves one character on. Nothing in
//! the input is an error: text no rule matches is skipped.

use std::ops::Range;
use std::sync::Arc;

use crate::candidate::{Candidate, CandidateId};
use crate::catalog::{Catalog, FormatRule, MatchContext, RawMatch};
use crate::cursor::composite_type_before;

/// A type token a syntax-aware host knows for the literal starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHint {
    pub offset: usize,
    pub token: String,
}

impl TypeHint {
    pub fn new(offset: usize, token: impl Into<String>) -> Self {
        Self { offset, token: token.into() }
    }
}

/// Cutoffs for scanning large documents. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanLimits {
    /// Stop after this many candidates.
    pub max_candidates: Option<usize>,
    /// Only literals lying entirely within the first `max_bytes` bytes are
    /// found. Rounded down to a character boundary.
    pub max_bytes: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Scanner<'c> {
    catalog: &'c Catalog,
    limits: ScanLimits,
    /// Sorted by offset.
    hints: Vec<TypeHint>,
}

impl<'c> Scanner<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog, limits: ScanLimits::default(), hints: Vec::new() }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_hints(mut self, mut hints: Vec<TypeHint>) -> Self {
        hints.sort_by_key(|h| h.offset);
        self.hints = hints;
        self
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Starts a new pass over `text` from offset 0.
    pub fn scan<'a>(&'a self, text: &'a str) -> Scan<'a> {
        let mut cut = self.limits.max_bytes.map_or(text.len(), |max| max.min(text.len()));
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        Scan {
            rules: self.catalog.rules(),
            hints: &self.hints,
            src: text,
            limit: cut,
            pos: 0,
            braces: Vec::new(),
            emitted: 0,
            max_candidates: self.limits.max_candidates,
            truncated: false,
        }
    }
}

/// A lazy scan pass. Yields candidates in document order.
#[derive(Debug)]
pub struct Scan<'a> {
    rules: &'a [Arc<dyn FormatRule>],
    hints: &'a [TypeHint],
    src: &'a str,
    limit: usize,
    pos: usize,
    /// Composite-literal type opened by each open `{`, innermost last.
    /// `None` for blocks and untyped braces.
    braces: Vec<Option<Range<usize>>>,
    emitted: usize,
    max_candidates: Option<usize>,
    truncated: bool,
}

impl<'a> Scan<'a> {
    /// Whether a limit stopped the scan while literals or unscanned text
    /// remained: another match past the candidate limit, or any text past
    /// the byte limit.
    ///
    /// Only meaningful once the iterator has returned `None`.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Byte offset the scan has reached.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn context(&self) -> MatchContext<'a> {
        let src = self.src;
        let hints = self.hints;
        let host_hint = hints
            .binary_search_by_key(&self.pos, |h| h.offset)
            .ok()
            .map(|i| hints[i].token.as_str());
        let enclosing_type = self.braces.last().cloned().flatten().map(|r| &src[r]);
        MatchContext { host_hint, enclosing_type }
    }

    fn step(&mut self) {
        let Some(ch) = self.src[self.pos..].chars().next() else {
            return;
        };
        match ch {
            '{' => self.braces.push(composite_type_before(self.src, self.pos)),
            '}' => {
                self.braces.pop();
            }
            _ => {}
        }
        self.pos += ch.len_utf8();
    }

    fn candidate(&mut self, rule: Arc<dyn FormatRule>, raw: RawMatch) -> Candidate {
        let normalized = rule.normalize(&raw);
        if normalized.clamped {
            log::debug!(
                "clamped out-of-range channel in {:?} at {}",
                &self.src[raw.span.clone()],
                raw.span.start
            );
        }
        let id = CandidateId(self.emitted);
        self.emitted += 1;
        Candidate {
            id,
            span: raw.span.clone().into(),
            text: self.src[raw.span].to_string(),
            shape: raw.shape,
            value: normalized.value,
            clamped: normalized.clamped,
            rule,
        }
    }

    fn stop_early(&mut self, why: &str) {
        if !self.truncated {
            self.truncated = true;
            log::debug!("scan stopped at byte {} of {}: {why}", self.pos, self.src.len());
        }
    }

    /// Moves to the start of the next match inside the byte limit, without
    /// consuming it.
    fn seek(&mut self) -> Option<(Arc<dyn FormatRule>, RawMatch)> {
        while self.pos < self.limit {
            let cx = self.context();
            let found = self.rules.iter().find_map(|rule| {
                rule.matches(self.src, self.pos, &cx).map(|raw| (rule.clone(), raw))
            });
            match found {
                Some((rule, raw)) if raw.span.end > self.pos && raw.span.end <= self.limit => {
                    debug_assert_eq!(
                        raw.span.start,
                        self.pos,
                        "{} matched off-position",
                        rule.label()
                    );
                    return Some((rule, raw));
                }
                _ => self.step(),
            }
        }
        if self.limit < self.src.len() {
            self.stop_early("byte limit reached");
        }
        None
    }
}

impl Iterator for Scan<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let (rule, raw) = self.seek()?;
        if self.max_candidates.is_some_and(|max| self.emitted >= max) {
            self.stop_early("candidate limit reached");
            return None;
        }
        self.pos = raw.span.end;
        Some(self.candidate(rule, raw))
    }
}
