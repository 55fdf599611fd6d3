use std::sync::Arc;

use super::{struct_open, ConventionTable, FormatRule, MatchContext, RawMatch};
use crate::cursor::Cursor;
use crate::shape::{
    AlphaConvention, AlphaUpgrade, Channel, Notation, Piece, ShapeBuilder, Slot, SlotFormat,
};

/// `[Type]{R: r, G: g, B: b[, A: a]}` with fields in any order.
///
/// Field names are single letters in either case. `A` may be omitted, in
/// which case the literal is opaque and gains `A` after its last field when
/// an edit needs one.
#[derive(Debug, Clone)]
pub struct NamedFields {
    table: Arc<ConventionTable>,
}

impl NamedFields {
    pub fn new(table: Arc<ConventionTable>) -> Self {
        Self { table }
    }
}

impl FormatRule for NamedFields {
    fn notation(&self) -> Notation {
        Notation::NamedFieldStruct
    }

    fn label(&self) -> &str {
        "named-field struct"
    }

    fn matches(&self, src: &str, at: usize, cx: &MatchContext<'_>) -> Option<RawMatch> {
        let open = struct_open(src, at, cx, &self.table)?;

        let mut c = Cursor::new(src, open.body);
        let mut shape = ShapeBuilder::new(src, at, Notation::NamedFieldStruct);
        let mut written = [None; 4];
        // Separators reused when an alpha field has to be appended.
        let mut first_name: Option<&str> = None;
        let mut colon = "";
        let mut sep: Option<&str> = None;
        let mut last_value_end = open.body;
        let mut last_format = SlotFormat::Decimal { width: 0 };

        loop {
            c.skip_ws();
            if c.eat('}') {
                break;
            }
            let name_range = c.ident()?;
            let name = &src[name_range.clone()];
            let ch = Channel::from_field_name(name)?;
            if written[ch.index()].is_some() {
                return None;
            }
            let colon_start = c.pos();
            if !c.skip_ws().eat(':') {
                return None;
            }
            let (range, value) = c.skip_ws().int_literal()?;

            match first_name {
                None => {
                    first_name = Some(name);
                    colon = &src[colon_start..range.start];
                }
                Some(_) if sep.is_none() => sep = Some(&src[last_value_end..name_range.start]),
                Some(_) => {}
            }

            last_format = SlotFormat::infer(&src[range.clone()]);
            shape.slot(range.clone(), ch, last_format.clone());
            written[ch.index()] = Some(value);
            last_value_end = range.end;

            if !c.skip_ws().eat(',') {
                if !c.skip_ws().eat('}') {
                    return None;
                }
                break;
            }
        }

        if written[..3].iter().any(Option::is_none) {
            return None;
        }

        let end = c.pos();
        let (alpha, upgrade) = if written[Channel::A.index()].is_some() {
            (open.convention, None)
        } else {
            let upper = first_name.is_some_and(|n| n.chars().all(|ch| ch.is_ascii_uppercase()));
            let sep = sep.unwrap_or(", ");
            let field = if upper { "A" } else { "a" };
            let upgrade = AlphaUpgrade {
                at: shape.next_index(),
                pieces: vec![
                    Piece::Text(format!("{sep}{field}{colon}")),
                    Piece::Slot(Slot { channel: Channel::A, format: last_format, raw: None }),
                ],
                convention: open.convention,
            };
            (AlphaConvention::ImplicitOpaque, Some(upgrade))
        };

        Some(RawMatch {
            span: at..end,
            shape: shape.finish(end, alpha, upgrade),
            written,
        })
    }
}
