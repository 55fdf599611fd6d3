//! Byte-offset cursor with the small lexical primitives the format rules share.
//!
//! Unlike a full lexer this never fails: every primitive either consumes
//! input and returns `Some`, or leaves the cursor untouched and returns `None`.

use std::ops::Range;

#[inline]
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `true` if the character before `pos` cannot continue an identifier or a
/// path (`foo.` / `foo::`).
pub fn at_word_start(src: &str, pos: usize) -> bool {
    match src[..pos].chars().next_back() {
        None => true,
        Some(c) => !is_ident_char(c) && c != '.',
    }
}

/// `true` if the character at `pos` cannot continue the token that ends there.
pub fn at_word_end(src: &str, pos: usize) -> bool {
    match src[pos..].chars().next() {
        None => true,
        Some(c) => !is_ident_char(c),
    }
}

/// Last non-whitespace character before `pos`.
pub fn prev_non_ws(src: &str, pos: usize) -> Option<char> {
    src[..pos].chars().rev().find(|c| !c.is_whitespace())
}

/// The `Foo` of `pkg.Foo` or `crate::Foo`.
pub fn last_segment(path: &str) -> &str {
    let dot = path.rfind('.').map(|i| i + 1).unwrap_or(0);
    let colons = path.rfind("::").map(|i| i + 2).unwrap_or(0);
    &path[dot.max(colons)..]
}

/// Type path ending right before `pos`, skipping whitespace (`[]color.RGBA {`).
pub fn type_path_before(src: &str, pos: usize) -> Option<Range<usize>> {
    let end = src[..pos].trim_end().len();
    let start = src[..end]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident_char(c) || c == '.' || c == ':')
        .last()
        .map(|(i, _)| i)?;
    let path = &src[start..end];
    if path.ends_with(['.', ':']) {
        return None;
    }
    let path_start = start + (path.len() - path.trim_start_matches(['.', ':']).len());
    if path_start < end && !src[path_start..].starts_with(|c: char| c.is_ascii_digit()) {
        Some(path_start..end)
    } else {
        None
    }
}

/// Type of the composite literal a `{` at `pos` opens, if it opens one.
///
/// The type path must itself sit in expression position, optionally behind
/// `[]`, `[N]`, `map[K]` or `&` prefixes: `= []color.NRGBA {` and
/// `return Palette{` qualify, `namespace Colors {`, `impl Theme {` and
/// `func f() []color.RGBA {` do not.
pub fn composite_type_before(src: &str, pos: usize) -> Option<Range<usize>> {
    let path = type_path_before(src, pos)?;
    let mut head = src[..path.start].trim_end();
    loop {
        if let Some(rest) = head.strip_suffix(']') {
            let open = rest.rfind('[')?;
            head = rest[..open].trim_end();
            if let Some(rest) = head.strip_suffix("map") {
                if rest.chars().next_back().is_none_or(|c| !is_ident_char(c)) {
                    head = rest.trim_end();
                }
            }
        } else if let Some(rest) = head.strip_suffix('&') {
            head = rest.trim_end();
        } else {
            break;
        }
    }

    let expression = match head.chars().next_back() {
        None => true,
        Some('(' | ',' | '[' | ':' | '{') => true,
        // `=`, `:=`, `=>`; not `==`, `!=`, `<=`, `>=`.
        Some('=') => !head[..head.len() - 1].ends_with(['=', '!', '<', '>']),
        Some('>') => head.ends_with("=>"),
        Some(_) => {
            head.strip_suffix("return")
                .is_some_and(|rest| rest.chars().next_back().is_none_or(|c| !is_ident_char(c)))
        }
    };
    expression.then_some(path)
}

#[derive(Debug, Clone)]
pub struct Cursor<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(src: &'s str, pos: usize) -> Self {
        Self { src, pos }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    pub fn skip_ws(&mut self) -> &mut Self {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
        self
    }

    /// Consumes `ch` if it is next.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn ident(&mut self) -> Option<Range<usize>> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return None,
        }
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.advance();
        }
        Some(start..self.pos)
    }

    /// `ident (("." | "::") ident)*`
    pub fn type_path(&mut self) -> Option<Range<usize>> {
        let start = self.pos;
        self.ident()?;
        loop {
            let save = self.pos;
            if !(self.eat('.') || self.eat_str("::")) {
                break;
            }
            if self.ident().is_none() {
                self.pos = save;
                break;
            }
        }
        Some(start..self.pos)
    }

    /// Runs of hex digits, returning how many were consumed.
    pub fn hex_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.advance();
        }
        self.pos - start
    }

    /// Integer literal: optional `-`, then decimal digits or `0x`/`0X` hex.
    ///
    /// Rejects floats and suffixed literals (`1.5`, `255u8`). Values too large
    /// for `i64` saturate, which is harmless since channels clamp to 255.
    pub fn int_literal(&mut self) -> Option<(Range<usize>, i64)> {
        let start = self.pos;
        let negative = self.eat('-');
        let body = self.pos;
        let value = if self.eat_str("0x") || self.eat_str("0X") {
            let digits = self.pos;
            if self.hex_digits() == 0 {
                self.pos = start;
                return None;
            }
            i64::from_str_radix(&self.src[digits..self.pos], 16).unwrap_or(i64::MAX)
        } else {
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
            if self.pos == body {
                self.pos = start;
                return None;
            }
            self.src[body..self.pos].parse::<i64>().unwrap_or(i64::MAX)
        };
        if !at_word_end(self.src, self.pos) || self.peek() == Some('.') {
            self.pos = start;
            return None;
        }
        Some((start..self.pos, if negative { -value } else { value }))
    }

    /// Unit-interval number (`0.384`, `.5`, `1.0f`, `0f`), scaled to `0..=255`
    /// with round-half-up integer arithmetic.
    ///
    /// Requires a decimal point or an `f`/`F` suffix, so plain integers are
    /// left to [`int_literal`](Self::int_literal). Values outside `[0, 1]`
    /// scale past the channel range and are clamped by the caller.
    pub fn unit_literal(&mut self) -> Option<(Range<usize>, i64)> {
        let start = self.pos;
        let negative = self.eat('-');
        let int_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let int_digits = &self.src[int_start..self.pos];
        let mut frac_digits = "";
        if self.eat('.') {
            let frac_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
            frac_digits = &self.src[frac_start..self.pos];
        }
        let dotted = int_digits.len() + frac_digits.len() < self.pos - int_start;
        let suffixed = self.eat('f') || self.eat('F');
        let valid = !(int_digits.is_empty() && frac_digits.is_empty())
            && (dotted || suffixed)
            && frac_digits.len() <= MAX_UNIT_DECIMALS
            && int_digits.len() <= 9
            && at_word_end(self.src, self.pos)
            && self.peek() != Some('.');
        if !valid {
            self.pos = start;
            return None;
        }

        let scale = 10u128.pow(frac_digits.len() as u32);
        let whole: u128 = int_digits.parse().unwrap_or(0);
        let frac: u128 = frac_digits.parse().unwrap_or(0);
        let scaled = ((whole * scale + frac) * 255 * 2 + scale) / (2 * scale);
        let value = i64::try_from(scaled).unwrap_or(i64::MAX);
        Some((start..self.pos, if negative { -value } else { value }))
    }
}

/// Longest fraction a unit literal may carry.
pub const MAX_UNIT_DECIMALS: usize = 9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_literals() {
        let src = "255, 0xFF, -3, 1.5, 255u8, 0x";
        let mut c = Cursor::new(src, 0);
        assert_eq!(c.int_literal(), Some((0..3, 255)));
        let mut c = Cursor::new(src, 5);
        assert_eq!(c.int_literal(), Some((5..9, 255)));
        let mut c = Cursor::new(src, 11);
        assert_eq!(c.int_literal(), Some((11..13, -3)));
        for at in [15, 20, 27] {
            let mut c = Cursor::new(src, at);
            assert_eq!(c.int_literal(), None, "at {at}");
            assert_eq!(c.pos(), at);
        }
    }

    #[test]
    fn unit_literals() {
        let cases = [
            ("0.384", Some(98)),
            ("1.000", Some(255)),
            (".5", Some(128)),
            ("0.1f", Some(26)),
            ("0f", Some(0)),
            ("2.0", Some(510)),
            ("-0.5", Some(-128)),
            ("255", None),
            ("1.5.2", None),
            ("0.5x", None),
            (".", None),
            ("0.1234567891", None),
        ];
        for (src, want) in cases {
            let mut c = Cursor::new(src, 0);
            assert_eq!(c.unit_literal().map(|(_, v)| v), want, "{src}");
            if want.is_none() {
                assert_eq!(c.pos(), 0);
            }
        }
        let mut c = Cursor::new("0.5)", 0);
        assert_eq!(c.unit_literal(), Some((0..3, 128)));
    }

    #[test]
    fn type_paths() {
        let src = "color.RGBA{ bevy::Color::srgb( x. ";
        let mut c = Cursor::new(src, 0);
        assert_eq!(c.type_path(), Some(0..10));
        let mut c = Cursor::new(src, 12);
        assert_eq!(c.type_path(), Some(12..29));
        let mut c = Cursor::new(src, 31);
        assert_eq!(c.type_path(), Some(31..32));
        assert_eq!(c.pos(), 32);
    }

    #[test]
    fn path_before_brace() {
        let src = "[]color.RGBA {";
        assert_eq!(type_path_before(src, 13), Some(2..12));
        assert_eq!(type_path_before("= {", 2), None);
        assert_eq!(type_path_before("x[3] {", 5), None);
        assert_eq!(type_path_before("Red: {", 5), None);
    }

    #[test]
    fn composite_literal_braces() {
        fn at(src: &str) -> Option<&str> {
            composite_type_before(src, src.rfind('{').unwrap()).map(|r| &src[r])
        }
        assert_eq!(at("return []color.NRGBA{"), Some("color.NRGBA"));
        assert_eq!(at("xs := []Vec4{"), Some("Vec4"));
        assert_eq!(at("p = map[string]color.RGBA {"), Some("color.RGBA"));
        assert_eq!(at("Gradient: [2]color.RGBA{"), Some("color.RGBA"));
        assert_eq!(at("f(&Palette{"), Some("Palette"));
        assert_eq!(at("Palette{"), Some("Palette"));
        assert_eq!(at("namespace StructColors {"), None);
        assert_eq!(at("class Palette {"), None);
        assert_eq!(at("impl Theme {"), None);
        assert_eq!(at("func Sunset() []color.RGBA {"), None);
        assert_eq!(at("if a == b {"), None);
        assert_eq!(at("returned Palette {"), None);
        assert_eq!(at("= {"), None);
    }

    #[test]
    fn segments() {
        assert_eq!(last_segment("color.NRGBA"), "NRGBA");
        assert_eq!(last_segment("bevy::Color::rgb"), "rgb");
        assert_eq!(last_segment("QColor"), "QColor");
    }

    #[test]
    fn word_boundaries() {
        let src = "x0xFF a.b";
        assert!(!at_word_start(src, 1));
        assert!(at_word_start(src, 0));
        assert!(!at_word_start(src, 8));
        assert!(at_word_end(src, 5));
    }
}
