//! Shape descriptors: how a color literal was written.
//!
//! A [`Shape`] carries the classification a picker shows to the user
//! (notation, alpha convention, field order, base) and the text template the
//! rewriter renders from. The template is the matched text cut into verbatim
//! pieces and channel slots, so concatenating it reproduces the original
//! bytes.

use std::fmt;
use std::ops::Range;

// ── Classification ────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    /// Parses a single-letter field name (`R`, `g`, ...).
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "R" | "r" => Some(Channel::R),
            "G" | "g" => Some(Channel::G),
            "B" | "b" => Some(Channel::B),
            "A" | "a" => Some(Channel::A),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
            Channel::A => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Notation {
    /// `T{r, g, b, a}`
    PositionalStruct,
    /// `T{R: r, G: g, B: b, A: a}` in any field order.
    NamedFieldStruct,
    /// `0xRRGGBB`, `#RRGGBB`, `#RRGGBBAA`.
    HexPacked,
    /// `ctor(r, g, b[, a])` or `ctor(0xRRGGBB)`.
    FunctionCall,
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Notation::PositionalStruct => "positional struct",
            Notation::NamedFieldStruct => "named-field struct",
            Notation::HexPacked => "packed hex",
            Notation::FunctionCall => "function call",
        })
    }
}

/// How the written channel values relate to alpha.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AlphaConvention {
    Premultiplied,
    NonPremultiplied,
    /// The literal has no alpha component; it is read as fully opaque.
    ImplicitOpaque,
}

impl fmt::Display for AlphaConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlphaConvention::Premultiplied => "premultiplied",
            AlphaConvention::NonPremultiplied => "non-premultiplied",
            AlphaConvention::ImplicitOpaque => "implicit opaque",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NumericBase {
    Decimal,
    Hex,
}

// ── Template ──────────────────────────────────────────────────────────────

/// Textual format of a single channel slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotFormat {
    /// Decimal, zero-padded to `width` digits (`0` = no padding).
    Decimal { width: usize },
    /// Hex digits, optionally behind a `0x`/`0X` prefix owned by the slot.
    Hex {
        prefix: Option<String>,
        width: usize,
        upper: bool,
    },
    /// Fraction of the unit interval (`0.384`, `1.0f`): the channel divided
    /// by 255, written with at least `decimals` digits after the point.
    Unit { decimals: usize, suffix: String },
}

impl SlotFormat {
    /// Two uppercase hex digits with no prefix, used inside packed literals.
    pub fn packed_hex(upper: bool) -> Self {
        SlotFormat::Hex { prefix: None, width: 2, upper }
    }

    /// Infers the format from a written integer literal (`007`, `0xFF`, `12`).
    pub fn infer(raw: &str) -> Self {
        let digits = raw.trim_start_matches('-');
        if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            let prefix = digits[..2].to_string();
            let upper = !hex.chars().any(|c| c.is_ascii_lowercase());
            SlotFormat::Hex { prefix: Some(prefix), width: hex.len(), upper }
        } else if digits.len() > 1 && digits.starts_with('0') {
            SlotFormat::Decimal { width: digits.len() }
        } else {
            SlotFormat::Decimal { width: 0 }
        }
    }

    /// Infers the format of a written unit-interval literal (`0.50`, `1f`).
    pub fn infer_unit(raw: &str) -> Self {
        let digits = raw.trim_end_matches(['f', 'F']);
        let suffix = raw[digits.len()..].to_string();
        let decimals = digits.split_once('.').map_or(0, |(_, frac)| frac.len());
        SlotFormat::Unit { decimals, suffix }
    }

    pub fn base(&self) -> NumericBase {
        match self {
            SlotFormat::Decimal { .. } | SlotFormat::Unit { .. } => NumericBase::Decimal,
            SlotFormat::Hex { .. } => NumericBase::Hex,
        }
    }

    pub fn format(&self, value: u8) -> String {
        match self {
            SlotFormat::Decimal { width } => format!("{:0width$}", value, width = *width),
            SlotFormat::Hex { prefix, width, upper } => {
                let digits = if *upper {
                    format!("{:0width$X}", value, width = *width)
                } else {
                    format!("{:0width$x}", value, width = *width)
                };
                match prefix {
                    Some(p) => format!("{p}{digits}"),
                    None => digits,
                }
            }
            SlotFormat::Unit { decimals, suffix } => format!("{}{suffix}", unit(value, *decimals)),
        }
    }
}

/// `value / 255` with the fewest decimals (at least `decimals`, at least one)
/// that read back as `value`. Three always do.
fn unit(value: u8, decimals: usize) -> String {
    let value = u128::from(value);
    let first = decimals.max(1);
    let mut digits = first;
    let mut scaled = 0;
    for d in first..=first.max(3) {
        let scale = 10u128.pow(d as u32);
        digits = d;
        scaled = (value * scale * 2 + 255) / 510;
        if (scaled * 510 + scale) / (2 * scale) == value {
            break;
        }
    }
    let scale = 10u128.pow(digits as u32);
    format!("{}.{:0digits$}", scaled / scale, scaled % scale)
}

/// A channel position inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub channel: Channel,
    pub format: SlotFormat,
    /// The text originally written in this slot. `None` for slots added by
    /// an alpha upgrade.
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Slot(Slot),
}

/// Pieces that give an alpha component to a literal written without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaUpgrade {
    /// Template index the pieces are inserted at.
    pub at: usize,
    pub pieces: Vec<Piece>,
    /// Convention the widened literal is written in.
    pub convention: AlphaConvention,
}

// ── Shape ─────────────────────────────────────────────────────────────────

/// Immutable description of one literal's written form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    notation: Notation,
    alpha: AlphaConvention,
    fields: Vec<Channel>,
    base: NumericBase,
    explicit_alpha: bool,
    pieces: Vec<Piece>,
    upgrade: Option<AlphaUpgrade>,
}

impl Shape {
    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn alpha_convention(&self) -> AlphaConvention {
        self.alpha
    }

    /// Channel tags in the order they were written.
    pub fn fields(&self) -> &[Channel] {
        &self.fields
    }

    pub fn numeric_base(&self) -> NumericBase {
        self.base
    }

    pub fn has_explicit_alpha(&self) -> bool {
        self.explicit_alpha
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn alpha_upgrade(&self) -> Option<&AlphaUpgrade> {
        self.upgrade.as_ref()
    }

    /// Whether a non-opaque alpha can be written in this shape.
    pub fn can_carry_alpha(&self) -> bool {
        self.explicit_alpha || self.upgrade.is_some()
    }

    /// The text this shape was cut from.
    pub fn source_text(&self) -> String {
        self.pieces
            .iter()
            .map(|p| match p {
                Piece::Text(t) => t.as_str(),
                Piece::Slot(s) => s.raw.as_deref().unwrap_or(""),
            })
            .collect()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

/// Cuts a matched span of `src` into a [`Shape`] template.
///
/// Slots must be added in source order and lie inside the span; the text
/// between them becomes verbatim pieces.
pub struct ShapeBuilder<'s> {
    src: &'s str,
    cursor: usize,
    notation: Notation,
    pieces: Vec<Piece>,
    fields: Vec<Channel>,
}

impl<'s> ShapeBuilder<'s> {
    pub fn new(src: &'s str, start: usize, notation: Notation) -> Self {
        Self { src, cursor: start, notation, pieces: Vec::new(), fields: Vec::new() }
    }

    pub fn slot(&mut self, range: Range<usize>, channel: Channel, format: SlotFormat) -> &mut Self {
        debug_assert!(range.start >= self.cursor, "slots must be added in source order");
        if range.start > self.cursor {
            self.pieces.push(Piece::Text(self.src[self.cursor..range.start].to_string()));
        }
        self.pieces.push(Piece::Slot(Slot {
            channel,
            format,
            raw: Some(self.src[range.clone()].to_string()),
        }));
        self.fields.push(channel);
        self.cursor = range.end;
        self
    }

    /// Index the next piece will be pushed at.
    pub fn next_index(&self) -> usize {
        self.pieces.len()
    }

    pub fn finish(
        mut self,
        end: usize,
        alpha: AlphaConvention,
        upgrade: Option<AlphaUpgrade>,
    ) -> Shape {
        if end > self.cursor {
            self.pieces.push(Piece::Text(self.src[self.cursor..end].to_string()));
        }
        let base = self
            .pieces
            .iter()
            .find_map(|p| match p {
                Piece::Slot(s) => Some(s.format.base()),
                Piece::Text(_) => None,
            })
            .unwrap_or(NumericBase::Decimal);
        let explicit_alpha = self.fields.contains(&Channel::A);
        Shape {
            notation: self.notation,
            alpha,
            fields: self.fields,
            base,
            explicit_alpha,
            pieces: self.pieces,
            upgrade,
        }
    }
}
