//! Rewriter: renders a new value in a candidate's original notation.

use crate::candidate::Candidate;
use crate::color::ColorValue;
use crate::error::UnrepresentableEdit;
use crate::shape::{AlphaConvention, Channel, Piece, Shape};

/// Replacement text for a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// An alpha component was added to a literal written without one, so the
    /// literal's arity changed.
    pub widened: bool,
}

/// Renders `value` in the notation `candidate` was written in.
pub fn render(candidate: &Candidate, value: ColorValue) -> Result<Rendered, UnrepresentableEdit> {
    candidate.rule.render(&candidate.shape, candidate.value, value)
}

/// Template renderer shared by every built-in rule.
///
/// A slot keeps its original text when the canonical channels it depends on
/// are unchanged: the channel itself, plus alpha for premultiplied color
/// slots. Everything else is formatted in the slot's own format.
pub fn render_shape(
    shape: &Shape,
    original: ColorValue,
    value: ColorValue,
    label: &str,
) -> Result<Rendered, UnrepresentableEdit> {
    let needs_alpha = !shape.has_explicit_alpha() && value.a != 255;

    let mut widened_pieces = Vec::new();
    let (pieces, convention) = if needs_alpha {
        let upgrade = shape.alpha_upgrade().ok_or_else(|| UnrepresentableEdit {
            notation: shape.notation(),
            label: label.to_string(),
            requested: value,
            reason: "the literal has no room for an alpha component",
        })?;
        widened_pieces.extend_from_slice(&shape.pieces()[..upgrade.at]);
        widened_pieces.extend_from_slice(&upgrade.pieces);
        widened_pieces.extend_from_slice(&shape.pieces()[upgrade.at..]);
        (widened_pieces.as_slice(), upgrade.convention)
    } else {
        (shape.pieces(), shape.alpha_convention())
    };

    let mut text = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(t) => text.push_str(t),
            Piece::Slot(slot) => match &slot.raw {
                Some(raw) if unchanged(slot.channel, convention, original, value) => {
                    text.push_str(raw)
                }
                _ => text.push_str(&slot.format.format(stored(slot.channel, convention, value))),
            },
        }
    }

    Ok(Rendered { text, widened: needs_alpha })
}

/// The value a slot holds for `value` under `convention`.
fn stored(ch: Channel, convention: AlphaConvention, value: ColorValue) -> u8 {
    match convention {
        AlphaConvention::Premultiplied => value.premultiplied(ch),
        _ => value.channel(ch),
    }
}

fn unchanged(
    ch: Channel,
    convention: AlphaConvention,
    original: ColorValue,
    value: ColorValue,
) -> bool {
    let same = original.channel(ch) == value.channel(ch);
    match (ch, convention) {
        (Channel::A, _) => same,
        (_, AlphaConvention::Premultiplied) => same && original.a == value.a,
        _ => same,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FormatRule, MatchContext};

    fn first_match(src: &str) -> (std::sync::Arc<dyn FormatRule>, crate::catalog::RawMatch) {
        let catalog = Catalog::default();
        for at in 0..src.len() {
            for rule in catalog.rules() {
                if let Some(raw) = rule.matches(src, at, &MatchContext::default()) {
                    return (rule.clone(), raw);
                }
            }
        }
        panic!("no match in {src:?}");
    }

    fn edit(
        src: &str,
        f: impl FnOnce(ColorValue) -> ColorValue,
    ) -> Result<Rendered, UnrepresentableEdit> {
        let (rule, raw) = first_match(src);
        let original = rule.normalize(&raw).value;
        rule.render(&raw.shape, original, f(original))
    }

    #[test]
    fn unchanged_value_is_byte_identical() {
        for src in [
            "color.RGBA{255, 0, 0, 255}",
            "color.RGBA{98, 0, 238, 64}",
            "color.RGBA{300, -4, 0x0a, 255}",
            "color.NRGBA{ A: 170, R: 170, G: 175, B: 191 }",
            "{R: 007, G: 2, B: 3}",
            "QColor(98,  0, 238)",
            "Color(0xCC1E1E1E)",
            "#3498db",
            "0xFF5722",
        ] {
            assert_eq!(edit(src, |v| v).unwrap().text, src);
        }
    }

    #[test]
    fn edits_only_touch_changed_slots() {
        let out = edit("color.RGBA{255, 0, 0, 255}", |v| v.with_channel(Channel::R, 0)).unwrap();
        assert_eq!(out, Rendered { text: "color.RGBA{0, 0, 0, 255}".into(), widened: false });

        let out = edit("{R: 007, G: 2, B: 3}", |v| v.with_channel(Channel::G, 9)).unwrap();
        assert_eq!(out.text, "{R: 007, G: 9, B: 3}");

        let out = edit("0xff5722", |v| v.with_channel(Channel::B, 0xAB)).unwrap();
        assert_eq!(out.text, "0xff57ab");
    }

    #[test]
    fn premultiplied_alpha_edit_rewrites_color_slots() {
        let half = |v: ColorValue| v.with_channel(Channel::A, 128);
        let out = edit("color.RGBA{255, 255, 255, 255}", half).unwrap();
        assert_eq!(out.text, "color.RGBA{128, 128, 128, 128}");
        let out = edit("color.NRGBA{255, 255, 255, 255}", half).unwrap();
        assert_eq!(out.text, "color.NRGBA{255, 255, 255, 128}");
    }

    #[test]
    fn omitted_alpha_stays_omitted_when_opaque() {
        let out = edit("QColor(98, 0, 238)", |v| v.with_channel(Channel::R, 1)).unwrap();
        assert_eq!(out, Rendered { text: "QColor(1, 0, 238)".into(), widened: false });
    }

    #[test]
    fn translucent_edit_widens_when_possible() {
        let out = edit("QColor(98, 0, 238)", |v| v.with_channel(Channel::A, 64)).unwrap();
        assert_eq!(out, Rendered { text: "QColor(98, 0, 238, 64)".into(), widened: true });

        let out = edit("#3498DB", |v| v.with_channel(Channel::A, 0x80)).unwrap();
        assert_eq!(out.text, "#3498DB80");

        let out = edit("color.RGBA{R: 255, G: 255, B: 255}", |v| v.with_channel(Channel::A, 128))
            .unwrap();
        assert_eq!(out.text, "color.RGBA{R: 128, G: 128, B: 128, A: 128}");
        assert!(out.widened);
    }

    #[test]
    fn packed_hex_refuses_alpha() {
        let err = edit("0xFF5722", |v| v.with_channel(Channel::A, 128)).unwrap_err();
        assert_eq!(err.notation, crate::shape::Notation::HexPacked);
        assert_eq!(err.requested, ColorValue::new(255, 87, 34, 128));
        let err = edit("FromHex(0xFF5722)", |v| v.with_channel(Channel::A, 0)).unwrap_err();
        assert_eq!(err.label, "function call");
    }
}
