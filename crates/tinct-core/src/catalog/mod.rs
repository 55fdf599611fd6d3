//! Format catalog: the registry of color notations the scanner recognizes.
//!
//! Each notation is an independent [`FormatRule`]. The scanner only sees the
//! trait, so a new notation is a new `register` call, never a scanner change.
//!
//! Registration order is match priority. More specific grammars must come
//! first: a named-field literal is token-for-token a plausible positional
//! literal prefix, so [`NamedFields`] is registered before [`Positional`].

mod call;
mod hex;
mod named;
mod positional;

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::color::ColorValue;
use crate::cursor::{at_word_start, last_segment, prev_non_ws, Cursor};
use crate::error::UnrepresentableEdit;
use crate::rewrite::{render_shape, Rendered};
use crate::shape::{AlphaConvention, Notation, Shape};

pub use call::CallRule;
pub use hex::{HashHex, HexPacked};
pub use named::NamedFields;
pub use positional::Positional;

// ── Match context ─────────────────────────────────────────────────────────

/// Type information available where a literal starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchContext<'a> {
    /// Type token supplied by a syntax-aware host for this offset.
    pub host_hint: Option<&'a str>,
    /// Type of the innermost composite literal the candidate sits in.
    pub enclosing_type: Option<&'a str>,
}

/// Outcome of looking a literal's type up in a [`ConventionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeResolution {
    Color(AlphaConvention),
    /// A type is known and it is not a color type.
    NotColor,
    /// No type information at all.
    Unknown,
}

impl MatchContext<'_> {
    /// Host hint, then the literal's own type, then the enclosing type.
    pub fn resolve(&self, table: &ConventionTable, own_type: Option<&str>) -> TypeResolution {
        match self.host_hint.or(own_type).or(self.enclosing_type) {
            None => TypeResolution::Unknown,
            Some(token) => match table.lookup(token) {
                Some(conv) => TypeResolution::Color(conv),
                None => TypeResolution::NotColor,
            },
        }
    }
}

// ── Raw match / normalization ─────────────────────────────────────────────

/// A rule's match before normalization.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub span: Range<usize>,
    pub shape: Shape,
    /// Channel values as written, indexed by [`Channel::index`](crate::shape::Channel::index).
    /// `None` where the literal has no such component.
    pub written: [Option<i64>; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized {
    pub value: ColorValue,
    pub clamped: bool,
}

// ── FormatRule ────────────────────────────────────────────────────────────

/// One color notation: how to find it and how to write it back.
///
/// Implementations are pure. `matches` must return `None` (never panic) on
/// text outside its grammar.
pub trait FormatRule: fmt::Debug + Send + Sync {
    fn notation(&self) -> Notation;

    /// Short human-readable name, e.g. `"positional struct (premultiplied)"`.
    fn label(&self) -> &str;

    /// Tries to match a literal starting exactly at byte `at` of `src`.
    fn matches(&self, src: &str, at: usize, cx: &MatchContext<'_>) -> Option<RawMatch>;

    /// Canonical value of a match: channels clamped to `[0, 255]`, omitted
    /// alpha read as opaque, premultiplied literals un-premultiplied.
    fn normalize(&self, raw: &RawMatch) -> Normalized {
        let mut clamped = false;
        let mut ch = [0u8, 0, 0, 255];
        for (slot, written) in ch.iter_mut().zip(raw.written) {
            if let Some(v) = written {
                let c = v.clamp(0, 255);
                clamped |= c != v;
                *slot = c as u8;
            }
        }
        let value = match raw.shape.alpha_convention() {
            AlphaConvention::Premultiplied => ColorValue::from_premultiplied(ch),
            _ => ColorValue::new(ch[0], ch[1], ch[2], ch[3]),
        };
        Normalized { value, clamped }
    }

    /// Writes `value` in `shape`. `original` is the value the shape was
    /// parsed as; slots whose inputs did not change keep their original text.
    fn render(
        &self,
        shape: &Shape,
        original: ColorValue,
        value: ColorValue,
    ) -> Result<Rendered, UnrepresentableEdit> {
        render_shape(shape, original, value, self.label())
    }
}

// ── Convention table ──────────────────────────────────────────────────────

/// Known color type names and the alpha convention each stores.
///
/// Lookups use the last path segment, so `color.NRGBA` and `NRGBA` agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionTable {
    pub premultiplied: Vec<String>,
    pub straight: Vec<String>,
    /// Convention for literals with no type information.
    pub default: AlphaConvention,
}

impl ConventionTable {
    pub fn lookup(&self, type_token: &str) -> Option<AlphaConvention> {
        let name = last_segment(type_token.trim());
        if self.straight.iter().any(|t| t == name) {
            Some(AlphaConvention::NonPremultiplied)
        } else if self.premultiplied.iter().any(|t| t == name) {
            Some(AlphaConvention::Premultiplied)
        } else {
            None
        }
    }
}

impl Default for ConventionTable {
    fn default() -> Self {
        CatalogConfig::default().convention_table()
    }
}

/// Where a struct literal's fields begin, and how its alpha is stored.
pub(crate) struct StructOpen {
    /// Offset just past `{`.
    pub body: usize,
    pub convention: AlphaConvention,
}

/// Parses `Type {` or a bare `{` at `at` and resolves its alpha convention.
///
/// Bare braces only count as a literal in expression position (after
/// `{ , ( = : [` or at the start of input); `if x {` or `Point{` are not.
pub(crate) fn struct_open(
    src: &str,
    at: usize,
    cx: &MatchContext<'_>,
    table: &ConventionTable,
) -> Option<StructOpen> {
    let mut c = Cursor::new(src, at);
    let own_type = if c.peek() == Some('{') {
        match prev_non_ws(src, at) {
            None | Some('{' | ',' | '(' | '=' | ':' | '[') => {}
            _ => return None,
        }
        None
    } else {
        if !at_word_start(src, at) {
            return None;
        }
        let path = c.type_path()?;
        Some(&src[path])
    };
    if !c.skip_ws().eat('{') {
        return None;
    }
    let convention = match cx.resolve(table, own_type) {
        TypeResolution::Color(conv) => conv,
        TypeResolution::NotColor => return None,
        TypeResolution::Unknown => {
            log::trace!("no type hint for literal at {at}; assuming {}", table.default);
            table.default
        }
    };
    Some(StructOpen { body: c.pos(), convention })
}

// ── Catalog ───────────────────────────────────────────────────────────────

/// Options for [`Catalog::builtin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Struct types whose channels are premultiplied (`color.RGBA`).
    pub premultiplied_types: Vec<String>,
    /// Struct types whose channels are straight (`color.NRGBA`).
    pub straight_types: Vec<String>,
    /// Function names recognized as color constructors.
    pub callees: Vec<String>,
    /// Constructors taking `(a, r, g, b)`, such as .NET `Color.FromArgb`.
    pub argb_callees: Vec<String>,
    /// `0xAARRGGBB` (Android, Compose, ARGB `uint32_t`) rather than
    /// `0xRRGGBBAA` for 8-digit constants and constructor arguments.
    pub packed_alpha_first: bool,
    /// Recognize `#RRGGBB` / `#RRGGBBAA`.
    pub hash_hex: bool,
    /// `#AARRGGBB` (Android `parseColor`) rather than CSS `#RRGGBBAA`.
    pub hash_alpha_first: bool,
    pub default_convention: AlphaConvention,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        fn strings(xs: &[&str]) -> Vec<String> {
            xs.iter().map(|s| s.to_string()).collect()
        }
        Self {
            premultiplied_types: strings(&["RGBA"]),
            straight_types: strings(&["NRGBA"]),
            callees: strings(&[
                "FromHex", "from_hex", "Color", "QColor", "Color32", "rgb", "rgba", "Rgb", "Rgba",
                "from_rgb", "from_rgba", "rgb_u8", "rgba_u8", "from_rgba8", "from_rgb_u8",
                "from_srgb_u8", "FromRgb", "fromRgb", "fromRgbF", "srgb", "srgba", "UIColor",
                "NSColor",
            ]),
            argb_callees: strings(&["FromArgb", "fromArgb", "argb"]),
            packed_alpha_first: true,
            hash_hex: true,
            hash_alpha_first: false,
            default_convention: AlphaConvention::Premultiplied,
        }
    }
}

impl CatalogConfig {
    pub fn convention_table(&self) -> ConventionTable {
        ConventionTable {
            premultiplied: self.premultiplied_types.clone(),
            straight: self.straight_types.clone(),
            default: self.default_convention,
        }
    }
}

/// Ordered set of format rules.
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<Arc<dyn FormatRule>>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in notations, most specific first.
    pub fn builtin(config: &CatalogConfig) -> Self {
        let table = Arc::new(config.convention_table());
        let mut catalog = Self::new();
        catalog
            .register(NamedFields::new(table.clone()))
            .register(Positional::new(table.clone(), AlphaConvention::NonPremultiplied))
            .register(Positional::new(table, AlphaConvention::Premultiplied))
            .register(
                CallRule::new(config.callees.clone(), config.packed_alpha_first)
                    .with_argb_callees(config.argb_callees.clone()),
            );
        if config.hash_hex {
            catalog.register(HashHex::new(config.hash_alpha_first));
        }
        catalog.register(HexPacked::prefixed().with_alpha_first(config.packed_alpha_first));
        catalog
    }

    /// Appends a rule at the lowest priority.
    pub fn register(&mut self, rule: impl FormatRule + 'static) -> &mut Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn rules(&self) -> &[Arc<dyn FormatRule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for Catalog {
    /// [`Catalog::builtin`] with the default configuration.
    fn default() -> Self {
        Self::builtin(&CatalogConfig::default())
    }
}
