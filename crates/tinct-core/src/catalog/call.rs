use std::ops::Range;

use super::hex::packed;
use super::{FormatRule, MatchContext, RawMatch};
use crate::cursor::{at_word_start, last_segment, Cursor};
use crate::shape::{
    AlphaConvention, AlphaUpgrade, Channel, Notation, Piece, ShapeBuilder, Slot, SlotFormat,
};

/// Constructor calls: `QColor(98, 0, 238)`, `new Color32(0, 0, 0, 128)`,
/// `FromHex(0xFF5722)`, `Color(0xFF6200EE)`, `Color.FromArgb(128, 0, 0, 0)`,
/// `Color::srgba(0.384, 0.0, 0.933, 0.5)`, `rgba(0, 0, 0, 0.5)`,
/// `UIColor(red: 0.2, green: 0.4, blue: 0.6, alpha: 1.0)`.
///
/// Channels are straight alpha, in `R G B [A]` order or `A R G B` for ARGB
/// callees, or in label order when every argument is labelled. If any color
/// argument is a unit-interval number (`0.5`, `1.0f`) all channels are read
/// as fractions of 255; otherwise they are 0–255 integers, except that a
/// fractional alpha is always a fraction. A single packed argument is
/// `0xRRGGBB` (opaque, no room for alpha) or an 8-digit value whose alpha
/// position depends on `alpha_first`.
#[derive(Debug, Clone)]
pub struct CallRule {
    callees: Vec<String>,
    argb_callees: Vec<String>,
    alpha_first: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Number {
    Int(i64),
    /// Already scaled to `0..=255`.
    Unit(i64),
}

#[derive(Debug, Clone)]
struct Arg {
    label: Option<Range<usize>>,
    value: Range<usize>,
    number: Number,
}

fn label_channel(label: &str) -> Option<Channel> {
    match label {
        "red" | "r" => Some(Channel::R),
        "green" | "g" => Some(Channel::G),
        "blue" | "b" => Some(Channel::B),
        "alpha" | "a" | "opacity" => Some(Channel::A),
        _ => None,
    }
}

impl CallRule {
    pub fn new(callees: Vec<String>, alpha_first: bool) -> Self {
        Self { callees, argb_callees: Vec::new(), alpha_first }
    }

    /// Callees whose four channel arguments are `(a, r, g, b)`.
    pub fn with_argb_callees(mut self, names: Vec<String>) -> Self {
        self.argb_callees = names;
        self
    }

    fn args(c: &mut Cursor<'_>) -> Option<Vec<Arg>> {
        let mut args = Vec::with_capacity(4);
        loop {
            if args.len() == 4 {
                return None;
            }
            let mut ahead = c.skip_ws().clone();
            let label = match ahead.ident() {
                Some(name) if ahead.skip_ws().eat(':') && ahead.peek() != Some(':') => {
                    *c = ahead;
                    Some(name)
                }
                _ => None,
            };
            c.skip_ws();
            let (value, number) = match c.int_literal() {
                Some((range, v)) => (range, Number::Int(v)),
                None => {
                    let (range, v) = c.unit_literal()?;
                    (range, Number::Unit(v))
                }
            };
            args.push(Arg { label, value, number });
            if !c.skip_ws().eat(',') {
                break;
            }
            if c.skip_ws().peek() == Some(')') {
                break;
            }
        }
        c.skip_ws().eat(')').then_some(args)
    }

    /// Channel each argument holds, in source order.
    fn channels(&self, src: &str, callee: &str, args: &[Arg]) -> Option<Vec<Channel>> {
        let labelled = args.iter().filter(|a| a.label.is_some()).count();
        let channels: Vec<Channel> = if labelled == 0 {
            match args.len() {
                3 => vec![Channel::R, Channel::G, Channel::B],
                4 if self.is_argb(callee) => vec![Channel::A, Channel::R, Channel::G, Channel::B],
                4 => Channel::ALL.to_vec(),
                _ => return None,
            }
        } else if labelled == args.len() {
            args.iter()
                .map(|a| a.label.clone().and_then(|l| label_channel(&src[l])))
                .collect::<Option<_>>()?
        } else {
            return None;
        };
        let has = |ch| channels.iter().filter(|&&c| c == ch).count() == 1;
        let complete = has(Channel::R) && has(Channel::G) && has(Channel::B);
        let alpha = channels.iter().filter(|&&c| c == Channel::A).count() <= 1;
        (complete && alpha).then_some(channels)
    }

    fn is_argb(&self, callee: &str) -> bool {
        self.argb_callees.iter().any(|name| name == callee)
    }

    /// Pieces that add an alpha argument to a three-channel call.
    fn upgrade(
        &self,
        src: &str,
        callee: &str,
        args: &[Arg],
        format: SlotFormat,
        first_slot: usize,
        end_slot: usize,
    ) -> AlphaUpgrade {
        let slot = Piece::Slot(Slot { channel: Channel::A, format, raw: None });
        let (at, pieces) = match (&args[1].label, &args[2].label) {
            (Some(second), Some(last)) => {
                let sep = &src[args[0].value.end..second.start];
                let gap = &src[last.end..args[2].value.start];
                let name = if callee == "Color" { "opacity" } else { "alpha" };
                (end_slot, vec![Piece::Text(format!("{sep}{name}{gap}")), slot])
            }
            _ => {
                let sep = src[args[0].value.end..args[1].value.start].to_string();
                if self.is_argb(callee) {
                    (first_slot, vec![slot, Piece::Text(sep)])
                } else {
                    (end_slot, vec![Piece::Text(sep), slot])
                }
            }
        };
        AlphaUpgrade { at, pieces, convention: AlphaConvention::NonPremultiplied }
    }
}

impl FormatRule for CallRule {
    fn notation(&self) -> Notation {
        Notation::FunctionCall
    }

    fn label(&self) -> &str {
        "function call"
    }

    fn matches(&self, src: &str, at: usize, _cx: &MatchContext<'_>) -> Option<RawMatch> {
        if !at_word_start(src, at) {
            return None;
        }
        let mut c = Cursor::new(src, at);
        let path = c.type_path()?;
        let callee = last_segment(&src[path]);
        if !self.callees.iter().chain(&self.argb_callees).any(|name| name == callee) {
            return None;
        }
        if !c.skip_ws().eat('(') {
            return None;
        }
        let args = Self::args(&mut c)?;
        let close = c.pos();

        if let [arg] = args.as_slice() {
            let text = &src[arg.value.clone()];
            let hex_label = arg.label.as_ref().is_none_or(|l| &src[l.clone()] == "hex");
            if !hex_label || !(text.starts_with("0x") || text.starts_with("0X")) {
                return None;
            }
            let digits = arg.value.start + 2..arg.value.end;
            return packed(src, at..close, digits, Notation::FunctionCall, self.alpha_first, false);
        }

        let channels = self.channels(src, callee, &args)?;
        let unit = args
            .iter()
            .zip(&channels)
            .any(|(a, &ch)| ch != Channel::A && matches!(a.number, Number::Unit(_)));

        let mut shape = ShapeBuilder::new(src, at, Notation::FunctionCall);
        let mut written = [None; 4];
        let mut first_slot = 0;
        let mut last_format = SlotFormat::Decimal { width: 0 };
        for (i, (arg, &ch)) in args.iter().zip(&channels).enumerate() {
            let raw = &src[arg.value.clone()];
            let (format, value) = match arg.number {
                Number::Unit(v) => (SlotFormat::infer_unit(raw), v),
                Number::Int(v) if unit => (SlotFormat::infer_unit(raw), v.saturating_mul(255)),
                Number::Int(v) => (SlotFormat::infer(raw), v),
            };
            shape.slot(arg.value.clone(), ch, format.clone());
            if i == 0 {
                first_slot = shape.next_index() - 1;
            }
            if ch != Channel::A {
                last_format = format;
            }
            written[ch.index()] = Some(value);
        }

        let (alpha, upgrade) = if channels.contains(&Channel::A) {
            (AlphaConvention::NonPremultiplied, None)
        } else {
            let end_slot = shape.next_index();
            let upgrade = self.upgrade(src, callee, &args, last_format, first_slot, end_slot);
            (AlphaConvention::ImplicitOpaque, Some(upgrade))
        };

        Some(RawMatch { span: at..close, shape: shape.finish(close, alpha, upgrade), written })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use crate::color::ColorValue;
    use crate::rewrite::render_shape;

    fn rule() -> CallRule {
        let config = CatalogConfig::default();
        CallRule::new(config.callees, true).with_argb_callees(config.argb_callees)
    }

    fn value(src: &str) -> Option<ColorValue> {
        let rule = rule();
        rule.matches(src, 0, &MatchContext::default()).map(|raw| rule.normalize(&raw).value)
    }

    fn edit(src: &str, to: ColorValue) -> String {
        let rule = rule();
        let raw = rule.matches(src, 0, &MatchContext::default()).unwrap();
        let original = rule.normalize(&raw).value;
        render_shape(&raw.shape, original, to, rule.label()).unwrap().text
    }

    #[test]
    fn channel_arguments() {
        assert_eq!(value("QColor(98, 0, 238)"), Some(ColorValue::opaque(98, 0, 238)));
        assert_eq!(value("Color32(0, 0, 0, 128)"), Some(ColorValue::new(0, 0, 0, 128)));
        assert_eq!(value("rgb(52, 152, 219,)"), Some(ColorValue::opaque(52, 152, 219)));
        assert_eq!(value("Color::from_rgba8(1, 2, 3, 4)"), Some(ColorValue::new(1, 2, 3, 4)));
        assert_eq!(value("Color.FromRgb(244, 67, 54)"), Some(ColorValue::opaque(244, 67, 54)));
    }

    #[test]
    fn argb_arguments() {
        let src = "Color.FromArgb(128, 98, 0, 238)";
        assert_eq!(value(src), Some(ColorValue::new(98, 0, 238, 128)));
        assert_eq!(edit(src, ColorValue::new(98, 0, 238, 64)), "Color.FromArgb(64, 98, 0, 238)");
        // Three-argument form gains alpha in front.
        assert_eq!(
            edit("Color.argb(1, 2, 3)", ColorValue::new(1, 2, 3, 9)),
            "Color.argb(9, 1, 2, 3)"
        );
    }

    #[test]
    fn unit_arguments() {
        assert_eq!(value("Color::srgb(0.384, 0.000, 0.933)"), Some(ColorValue::opaque(98, 0, 238)));
        assert_eq!(
            value("Color(0.1f, 0.2f, 0.3f, 0.5f)"),
            Some(ColorValue::new(26, 51, 77, 128))
        );
        assert_eq!(value("Color::srgb(1, 0.5, 0)"), Some(ColorValue::opaque(255, 128, 0)));
        assert_eq!(
            edit("Color::srgb(0.384, 0.000, 0.933)", ColorValue::opaque(255, 0, 238)),
            "Color::srgb(1.000, 0.000, 0.933)"
        );
        assert_eq!(
            edit("Color::srgb(1, 0.5, 0)", ColorValue::new(255, 128, 0, 128)),
            "Color::srgb(1, 0.5, 0, 0.5)"
        );
    }

    #[test]
    fn fractional_alpha() {
        assert_eq!(value("rgba(0, 0, 0, 0.5)"), Some(ColorValue::new(0, 0, 0, 128)));
        assert_eq!(value("rgba(102, 126, 234, .4)"), Some(ColorValue::new(102, 126, 234, 102)));
        let red = ColorValue::new(255, 0, 0, 26);
        assert_eq!(edit("rgba(0, 0, 0, 0.1)", red), "rgba(255, 0, 0, 0.1)");
        assert_eq!(edit("rgba(0, 0, 0, 0.1)", ColorValue::new(0, 0, 0, 128)), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn labelled_arguments() {
        let src = "UIColor(red: 0.384, green: 0.000, blue: 0.933, alpha: 0.50)";
        assert_eq!(value(src), Some(ColorValue::new(98, 0, 238, 128)));
        let swift = "Color(red: 1.000, green: 0.341, blue: 0.133)";
        assert_eq!(value(swift), Some(ColorValue::opaque(255, 87, 34)));
        assert_eq!(
            edit(swift, ColorValue::new(255, 87, 34, 128)),
            "Color(red: 1.000, green: 0.341, blue: 0.133, opacity: 0.502)"
        );
        assert_eq!(value("Color(hex: 0x6200EE)"), Some(ColorValue::opaque(0x62, 0, 0xEE)));
        assert_eq!(value("Color(blue: 3, red: 1, green: 2)"), Some(ColorValue::opaque(1, 2, 3)));
    }

    #[test]
    fn packed_arguments() {
        assert_eq!(value("FromHex(0xFF5722)"), Some(ColorValue::opaque(255, 87, 34)));
        assert_eq!(value("Color(0x80000000)"), Some(ColorValue::new(0, 0, 0, 128)));
        let rgba_order = CallRule::new(vec!["Color".into()], false);
        let raw = rgba_order.matches("Color(0x11223344)", 0, &MatchContext::default()).unwrap();
        assert_eq!(rgba_order.normalize(&raw).value, ColorValue::new(0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn three_args_can_gain_alpha() {
        let raw = rule().matches("QColor(98,0,238)", 0, &MatchContext::default()).unwrap();
        let upgrade = raw.shape.alpha_upgrade().unwrap();
        assert_eq!(upgrade.pieces[0], Piece::Text(",".to_string()));
        assert!(!raw.shape.has_explicit_alpha());
    }

    #[test]
    fn packed_rgb_cannot_gain_alpha() {
        let raw = rule().matches("FromHex(0xff5722)", 0, &MatchContext::default()).unwrap();
        assert!(!raw.shape.can_carry_alpha());
        assert_eq!(raw.shape.fields(), &[Channel::R, Channel::G, Channel::B]);
    }

    #[test]
    fn rejects() {
        for src in [
            "max(1, 2, 3)",
            "Color(5)",
            "Color(0xFFF)",
            "Color(size: 0x6200EE)",
            "QColor(1, 2)",
            "QColor(1, 2, 3, 4, 5)",
            "QColor(1, 2, 3",
            "NotQColor(1, 2, 3)",
            "Color(red: 1, green: 2, 3)",
            "Color(red: 1, green: 2, hue: 3)",
            "Color(red: 1, red: 2, blue: 3)",
            "Color(x, 0, 0)",
        ] {
            assert_eq!(value(src), None, "{src}");
        }
    }
}
