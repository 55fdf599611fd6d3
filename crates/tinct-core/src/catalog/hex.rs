use std::ops::Range;

use super::{FormatRule, MatchContext, RawMatch};
use crate::cursor::{at_word_end, at_word_start, Cursor};
use crate::shape::{
    AlphaConvention, AlphaUpgrade, Channel, Notation, Piece, ShapeBuilder, Slot, SlotFormat,
};

/// Cuts the packed hex `digits` of a literal spanning `span` into two-digit
/// slots. Six digits are `RRGGBB`; eight are `AARRGGBB` or `RRGGBBAA`
/// depending on `alpha_first`. Other lengths do not match.
///
/// With `widen`, a six-digit literal may gain an alpha pair at the position
/// `alpha_first` implies.
pub(super) fn packed(
    src: &str,
    span: Range<usize>,
    digits: Range<usize>,
    notation: Notation,
    alpha_first: bool,
    widen: bool,
) -> Option<RawMatch> {
    let order: &[Channel] = match (digits.len(), alpha_first) {
        (6, _) => &[Channel::R, Channel::G, Channel::B],
        (8, true) => &[Channel::A, Channel::R, Channel::G, Channel::B],
        (8, false) => &Channel::ALL,
        _ => return None,
    };
    let upper = !src[digits.clone()].chars().any(|c| c.is_ascii_lowercase());

    let mut shape = ShapeBuilder::new(src, span.start, notation);
    let mut written = [None; 4];
    let mut first_slot = 0;
    for (i, &ch) in order.iter().enumerate() {
        let start = digits.start + i * 2;
        shape.slot(start..start + 2, ch, SlotFormat::packed_hex(upper));
        if i == 0 {
            first_slot = shape.next_index() - 1;
        }
        written[ch.index()] = i64::from_str_radix(&src[start..start + 2], 16).ok();
    }

    let (alpha, upgrade) = if order.len() == 4 {
        (AlphaConvention::NonPremultiplied, None)
    } else {
        let upgrade = widen.then(|| AlphaUpgrade {
            at: if alpha_first { first_slot } else { shape.next_index() },
            pieces: vec![Piece::Slot(Slot {
                channel: Channel::A,
                format: SlotFormat::packed_hex(upper),
                raw: None,
            })],
            convention: AlphaConvention::NonPremultiplied,
        });
        (AlphaConvention::ImplicitOpaque, upgrade)
    };
    Some(RawMatch { shape: shape.finish(span.end, alpha, upgrade), span, written })
}

/// `0xRRGGBB` and `0xAARRGGBB` integer constants.
///
/// Six digits are implicitly opaque with no digit position to put alpha in,
/// so translucent edits are unrepresentable. Eight digits carry straight
/// alpha, first by default (Android, Compose, ARGB `uint32_t`).
#[derive(Debug, Clone, Copy)]
pub struct HexPacked {
    prefixed: bool,
    alpha_first: bool,
}

impl HexPacked {
    /// `0x` / `0X` followed by six or eight digits.
    pub fn prefixed() -> Self {
        Self { prefixed: true, alpha_first: true }
    }

    /// Bare `RRGGBB`. Not registered by default: six hex digits on their own
    /// are too common to treat as colors without opting in.
    pub fn unprefixed() -> Self {
        Self { prefixed: false, alpha_first: true }
    }

    /// Reads eight digits as `0xRRGGBBAA` instead of `0xAARRGGBB`.
    pub fn with_alpha_first(mut self, alpha_first: bool) -> Self {
        self.alpha_first = alpha_first;
        self
    }
}

impl FormatRule for HexPacked {
    fn notation(&self) -> Notation {
        Notation::HexPacked
    }

    fn label(&self) -> &str {
        if self.prefixed { "packed hex" } else { "unprefixed hex" }
    }

    fn matches(&self, src: &str, at: usize, _cx: &MatchContext<'_>) -> Option<RawMatch> {
        if !at_word_start(src, at) {
            return None;
        }
        let mut c = Cursor::new(src, at);
        if self.prefixed && !(c.eat_str("0x") || c.eat_str("0X")) {
            return None;
        }
        let digits = c.pos();
        let count = c.hex_digits();
        if !at_word_end(src, c.pos()) || c.peek() == Some('.') {
            return None;
        }
        if !self.prefixed && count != 6 {
            return None;
        }
        let end = c.pos();
        packed(src, at..end, digits..end, Notation::HexPacked, self.alpha_first, false)
    }
}

/// `#RRGGBB` and `#RRGGBBAA` (straight alpha).
///
/// Eight digits are CSS order by default; `alpha_first` reads them as
/// `#AARRGGBB` (Android `parseColor`, Bevy `hex`). The six-digit form gains
/// two alpha digits when an edit needs them, on the same side.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashHex {
    alpha_first: bool,
}

impl HashHex {
    pub fn new(alpha_first: bool) -> Self {
        Self { alpha_first }
    }
}

impl FormatRule for HashHex {
    fn notation(&self) -> Notation {
        Notation::HexPacked
    }

    fn label(&self) -> &str {
        "hash hex"
    }

    fn matches(&self, src: &str, at: usize, _cx: &MatchContext<'_>) -> Option<RawMatch> {
        let mut c = Cursor::new(src, at);
        if !c.eat('#') {
            return None;
        }
        let digits = c.pos();
        c.hex_digits();
        if !at_word_end(src, c.pos()) {
            return None;
        }
        let end = c.pos();
        packed(src, at..end, digits..end, Notation::HexPacked, self.alpha_first, true)
    }
}
