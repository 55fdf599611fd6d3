//! Detection and round-trip rewriting of color literals in source text.
//!
//! The scanner walks arbitrary text and reports every color literal it
//! recognizes as a [`Candidate`]: its byte span, its canonical
//! (non-premultiplied) [`ColorValue`] and a [`Shape`] recording exactly how it
//! was written. Given a new value, the rewriter produces replacement text in
//! the same notation, keeping field order, numeric base, digit case, spacing
//! and separators. Nothing here touches the document; edits come back as
//! [`TextPatch`]es for the host to apply.
//!
//! The crate depends only on the `log` facade so editor tooling can embed it
//! without pulling in a runtime.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`color`] | `ColorValue`, premultiplied and packed conversions |
//! | [`shape`] | `Shape`, `Notation`, `AlphaConvention`, slot formats |
//! | [`catalog`] | `FormatRule`, `Catalog`, the built-in notations |
//! | [`scanner`] | `Scanner`, `Scan`, `ScanLimits`, `TypeHint` |
//! | [`rewrite`] | `render` |
//! | [`session`] | `Session`, `TextPatch` |
//! | [`error`] | `UnrepresentableEdit`, `SessionError` |
//!
//! # Quick start
//!
//! ```rust
//! use tinct_core::{Catalog, ColorValue, Scanner, Session};
//!
//! let src = "var Red = color.RGBA{255, 0, 0, 255}";
//! let catalog = Catalog::default();
//! let mut session = Session::load(&Scanner::new(&catalog), src);
//!
//! let red = &session.candidates()[0];
//! assert_eq!(red.value, ColorValue::opaque(255, 0, 0));
//! let id = red.id;
//!
//! let patch = session.apply(id, ColorValue::opaque(0, 0, 255)).unwrap();
//! assert_eq!(patch.apply_to(src), "var Red = color.RGBA{0, 0, 255, 255}");
//! ```

pub mod candidate;
pub mod catalog;
pub mod color;
mod cursor;
pub mod error;
pub mod rewrite;
pub mod scanner;
pub mod session;
pub mod shape;

pub use candidate::{Candidate, CandidateId, Span};
pub use catalog::{Catalog, CatalogConfig, ConventionTable, FormatRule, MatchContext};
pub use color::ColorValue;
pub use error::{SessionError, UnrepresentableEdit};
pub use rewrite::{render, Rendered};
pub use scanner::{Scan, ScanLimits, Scanner, TypeHint};
pub use session::{Session, SessionState, TextPatch};
pub use shape::{AlphaConvention, Channel, Notation, Shape};

#[cfg(test)]
mod scenario_tests {
    use super::*;

    fn scan(src: &str) -> Vec<Candidate> {
        let catalog = Catalog::default();
        Scanner::new(&catalog).scan(src).collect()
    }

    #[test]
    fn positional_red_edit() {
        let found = scan("color.RGBA{255, 0, 0, 255}");
        assert_eq!(found.len(), 1);
        let red = &found[0];
        assert_eq!(red.shape.notation(), Notation::PositionalStruct);
        assert_eq!(red.value, ColorValue::new(255, 0, 0, 255));
        let out = render(red, red.value.with_channel(Channel::R, 0)).unwrap();
        assert_eq!(out.text, "color.RGBA{0, 0, 0, 255}");
    }

    #[test]
    fn packed_hex_constant() {
        let found = scan("0xFF5722");
        let hex = &found[0];
        assert_eq!(hex.value, ColorValue::new(255, 87, 34, 255));
        assert!(!hex.shape.has_explicit_alpha());
        assert_eq!(render(hex, hex.value).unwrap().text, "0xFF5722");
    }

    #[test]
    fn named_fields_beat_positional() {
        let found = scan("{R: 1, G: 2, B: 3, A: 4}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shape.notation(), Notation::NamedFieldStruct);
        assert_eq!(found[0].label(), "named-field struct");
    }

    #[test]
    fn alpha_edit_of_packed_hex_is_refused() {
        let hex = &scan("0xFF5722")[0];
        let err = render(hex, hex.value.with_channel(Channel::A, 200)).unwrap_err();
        assert_eq!(err.notation, Notation::HexPacked);
    }

    #[test]
    fn rgb_only_edit_keeps_alpha_omitted() {
        let c = &scan("color.RGBA{R: 10, G: 20, B: 30}")[0];
        let out = render(c, c.value.with_channel(Channel::B, 40)).unwrap();
        assert_eq!(out.text, "color.RGBA{R: 10, G: 20, B: 40}");
        assert!(!out.widened);
    }

    #[test]
    fn types_are_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<Catalog>();
        check::<Candidate>();
        check::<Session>();
        check::<Scanner<'static>>();
    }
}
