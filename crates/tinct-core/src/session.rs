//! Edit session: one scan of one document plus the edits made against it.
//!
//! ```text
//!   Empty ──load──▶ Scanned ──apply──▶ Scanned (later candidates stale)
//!                      │
//!                      └──invalidate──▶ Invalidated ──load──▶ Scanned
//! ```
//!
//! The session never touches the document. [`Session::apply`] hands back a
//! [`TextPatch`] for the host to splice in; once it has, every candidate at
//! or after the patch may have moved, so those are refused until the host
//! loads the new text.

use crate::candidate::{Candidate, CandidateId, Span};
use crate::color::ColorValue;
use crate::error::SessionError;
use crate::rewrite;
use crate::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Scanned,
    Invalidated,
}

/// Replace `start..end` of the scanned document with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// The replacement added an alpha component the literal did not have.
    pub widened: bool,
}

impl TextPatch {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// `doc` with the patch spliced in.
    pub fn apply_to(&self, doc: &str) -> String {
        let mut out = String::with_capacity(doc.len() - (self.end - self.start) + self.text.len());
        out.push_str(&doc[..self.start]);
        out.push_str(&self.text);
        out.push_str(&doc[self.end..]);
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    candidates: Vec<Candidate>,
    truncated: bool,
    /// Candidates starting at or after this offset are stale.
    stale_from: Option<usize>,
}

impl Session {
    /// Scans `text` and holds the result.
    pub fn load(scanner: &Scanner<'_>, text: &str) -> Self {
        let mut scan = scanner.scan(text);
        let candidates: Vec<Candidate> = scan.by_ref().collect();
        let truncated = scan.is_truncated();
        log::debug!(
            "loaded {} bytes: {} candidate(s){}",
            text.len(),
            candidates.len(),
            if truncated { ", truncated" } else { "" }
        );
        Self { state: SessionState::Scanned, candidates, truncated, stale_from: None }
    }

    /// Replaces the held scan with a scan of `text`.
    pub fn reload(&mut self, scanner: &Scanner<'_>, text: &str) {
        *self = Self::load(scanner, text);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every candidate of the current scan, in document order, stale ones
    /// included.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidates that can still be edited.
    pub fn live_candidates(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.candidates.iter().filter(|c| !self.is_stale_span(c.span))
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id.0)
    }

    /// The candidate whose span contains `offset`.
    pub fn candidate_at(&self, offset: usize) -> Option<&Candidate> {
        let i = self.candidates.partition_point(|c| c.span.end <= offset);
        self.candidates.get(i).filter(|c| c.span.contains(offset))
    }

    pub fn is_stale(&self, id: CandidateId) -> bool {
        self.candidate(id).is_some_and(|c| self.is_stale_span(c.span))
    }

    /// A scan limit cut the document short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Renders `value` for candidate `id` without recording an edit.
    pub fn preview(&self, id: CandidateId, value: ColorValue) -> Result<TextPatch, SessionError> {
        match self.state {
            SessionState::Empty => return Err(SessionError::NotLoaded),
            SessionState::Invalidated => return Err(SessionError::Invalidated),
            SessionState::Scanned => {}
        }
        let candidate = self.candidate(id).ok_or(SessionError::UnknownCandidate(id))?;
        if self.is_stale_span(candidate.span) {
            return Err(SessionError::StaleCandidate(id));
        }
        let rendered = rewrite::render(candidate, value)?;
        Ok(TextPatch {
            start: candidate.span.start,
            end: candidate.span.end,
            text: rendered.text,
            widened: rendered.widened,
        })
    }

    /// Renders `value` for candidate `id` and records the edit.
    ///
    /// On success, `id` and every candidate after it become stale. On
    /// error nothing changes.
    pub fn apply(&mut self, id: CandidateId, value: ColorValue) -> Result<TextPatch, SessionError> {
        let patch = self.preview(id, value)?;
        let from = self.stale_from.map_or(patch.start, |s| s.min(patch.start));
        self.stale_from = Some(from);
        log::debug!(
            "edit {id} at {}..{}: {:?}{}",
            patch.start,
            patch.end,
            patch.text,
            if patch.widened { " (widened)" } else { "" }
        );
        Ok(patch)
    }

    /// Drops the held scan. Every later request fails until the next load.
    pub fn invalidate(&mut self) {
        self.state = SessionState::Invalidated;
        self.candidates.clear();
        self.truncated = false;
        self.stale_from = None;
    }

    fn is_stale_span(&self, span: Span) -> bool {
        self.stale_from.is_some_and(|from| span.start >= from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::shape::{Channel, Notation};

    const PALETTE: &str = "\
var (
\tRed   = color.RGBA{255, 0, 0, 255}
\tFaded = color.NRGBA{R: 0, G: 0, B: 255, A: 128}
\tHex   = 0xFF5722
)
";

    fn session() -> Session {
        let catalog = Catalog::default();
        Session::load(&Scanner::new(&catalog), PALETTE)
    }

    #[test]
    fn empty_session_refuses_edits() {
        let s = Session::default();
        assert_eq!(s.state(), SessionState::Empty);
        assert_eq!(s.preview(CandidateId(0), ColorValue::default()), Err(SessionError::NotLoaded));
    }

    #[test]
    fn load_finds_palette() {
        let s = session();
        assert_eq!(s.state(), SessionState::Scanned);
        let notations: Vec<Notation> = s.candidates().iter().map(|c| c.shape.notation()).collect();
        assert_eq!(
            notations,
            [Notation::PositionalStruct, Notation::NamedFieldStruct, Notation::HexPacked]
        );
        assert!(!s.is_truncated());
    }

    #[test]
    fn candidate_at_offset() {
        let s = session();
        let red = &s.candidates()[0];
        assert_eq!(s.candidate_at(red.span.start).map(|c| c.id), Some(red.id));
        assert_eq!(s.candidate_at(red.span.end - 1).map(|c| c.id), Some(red.id));
        assert!(s.candidate_at(red.span.end).is_none());
        assert!(s.candidate_at(0).is_none());
    }

    #[test]
    fn apply_produces_patch_and_marks_later_stale() {
        let mut s = session();
        let faded = s.candidates()[1].clone();
        let patch = s.apply(faded.id, faded.value.with_channel(Channel::A, 64)).unwrap();
        assert_eq!(patch.text, "color.NRGBA{R: 0, G: 0, B: 255, A: 64}");
        assert_eq!(patch.span(), faded.span);
        assert!(!patch.widened);

        assert!(!s.is_stale(CandidateId(0)));
        assert!(s.is_stale(CandidateId(1)));
        assert!(s.is_stale(CandidateId(2)));
        assert_eq!(s.live_candidates().count(), 1);
        assert_eq!(
            s.apply(CandidateId(2), ColorValue::default()),
            Err(SessionError::StaleCandidate(CandidateId(2)))
        );
        // Earlier candidates are unaffected.
        assert!(s.apply(CandidateId(0), ColorValue::opaque(0, 0, 0)).is_ok());
        assert!(s.is_stale(CandidateId(0)));
    }

    #[test]
    fn failed_apply_changes_nothing() {
        let mut s = session();
        let err = s.apply(CandidateId(2), ColorValue::new(255, 87, 34, 128)).unwrap_err();
        assert!(matches!(err, SessionError::Unrepresentable(_)));
        assert!(!s.is_stale(CandidateId(2)));
        assert_eq!(
            s.apply(CandidateId(9), ColorValue::default()),
            Err(SessionError::UnknownCandidate(CandidateId(9)))
        );
    }

    #[test]
    fn preview_does_not_mark_stale() {
        let s = session();
        let patch = s.preview(CandidateId(0), ColorValue::opaque(0, 0, 255)).unwrap();
        assert_eq!(patch.text, "color.RGBA{0, 0, 255, 255}");
        assert!(!s.is_stale(CandidateId(0)));
    }

    #[test]
    fn invalidate_then_reload() {
        let catalog = Catalog::default();
        let scanner = Scanner::new(&catalog);
        let mut s = Session::load(&scanner, PALETTE);
        s.invalidate();
        assert_eq!(s.state(), SessionState::Invalidated);
        assert!(s.candidates().is_empty());
        assert_eq!(
            s.preview(CandidateId(0), ColorValue::default()),
            Err(SessionError::Invalidated)
        );

        s.reload(&scanner, "x := 0x000000");
        assert_eq!(s.state(), SessionState::Scanned);
        assert_eq!(s.candidates().len(), 1);
    }

    #[test]
    fn patched_document_rescans_to_the_new_value() {
        let catalog = Catalog::default();
        let scanner = Scanner::new(&catalog);
        let mut s = Session::load(&scanner, PALETTE);
        let target = ColorValue::new(10, 20, 30, 255);
        let patch = s.apply(CandidateId(0), target).unwrap();
        let doc = patch.apply_to(PALETTE);
        let again = Session::load(&scanner, &doc);
        assert_eq!(again.candidates()[0].value, target);
        assert_eq!(again.candidates()[1].text, s.candidates()[1].text);
    }
}
