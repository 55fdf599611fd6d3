use std::fmt;

use crate::candidate::CandidateId;
use crate::color::ColorValue;
use crate::shape::Notation;

/// The requested value cannot be written in the literal's notation without
/// losing data (e.g. a translucent color into `0xRRGGBB`).
///
/// The caller decides whether to widen the notation or reject the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrepresentableEdit {
    pub notation: Notation,
    /// Label of the rule that produced the literal.
    pub label: String,
    pub requested: ColorValue,
    pub reason: &'static str,
}

impl fmt::Display for UnrepresentableEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot write {} as {}: {}",
            self.requested, self.label, self.reason
        )
    }
}

impl std::error::Error for UnrepresentableEdit {}

/// Errors from [`Session`](crate::session::Session) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session was never loaded.
    NotLoaded,
    /// The session was invalidated; load a new one.
    Invalidated,
    UnknownCandidate(CandidateId),
    /// The candidate's offsets are no longer reliable after an earlier edit.
    StaleCandidate(CandidateId),
    Unrepresentable(UnrepresentableEdit),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotLoaded => f.write_str("session has not been loaded"),
            SessionError::Invalidated => f.write_str("session was invalidated"),
            SessionError::UnknownCandidate(id) => write!(f, "no candidate {id}"),
            SessionError::StaleCandidate(id) => {
                write!(f, "candidate {id} is stale after an earlier edit; rescan")
            }
            SessionError::Unrepresentable(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Unrepresentable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnrepresentableEdit> for SessionError {
    fn from(e: UnrepresentableEdit) -> Self {
        SessionError::Unrepresentable(e)
    }
}
