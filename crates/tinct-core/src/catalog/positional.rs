use std::sync::Arc;

use super::{struct_open, ConventionTable, FormatRule, MatchContext, RawMatch};
use crate::cursor::Cursor;
use crate::shape::{AlphaConvention, Channel, Notation, ShapeBuilder, SlotFormat};

/// `[Type]{r, g, b, a}`: four integer fields in RGBA order.
///
/// The digits alone cannot say whether the channels are premultiplied, so
/// one instance is registered per convention and each only accepts literals
/// whose resolved type agrees with it.
#[derive(Debug, Clone)]
pub struct Positional {
    table: Arc<ConventionTable>,
    convention: AlphaConvention,
    label: String,
}

impl Positional {
    pub fn new(table: Arc<ConventionTable>, convention: AlphaConvention) -> Self {
        let label = format!("positional struct ({convention})");
        Self { table, convention, label }
    }
}

impl FormatRule for Positional {
    fn notation(&self) -> Notation {
        Notation::PositionalStruct
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn matches(&self, src: &str, at: usize, cx: &MatchContext<'_>) -> Option<RawMatch> {
        let open = struct_open(src, at, cx, &self.table)?;
        if open.convention != self.convention {
            return None;
        }

        let mut c = Cursor::new(src, open.body);
        let mut shape = ShapeBuilder::new(src, at, Notation::PositionalStruct);
        let mut written = [None; 4];
        for ch in Channel::ALL {
            if ch != Channel::R && !c.skip_ws().eat(',') {
                return None;
            }
            let (range, value) = c.skip_ws().int_literal()?;
            shape.slot(range.clone(), ch, SlotFormat::infer(&src[range]));
            written[ch.index()] = Some(value);
        }
        c.skip_ws().eat(',');
        if !c.skip_ws().eat('}') {
            return None;
        }

        let end = c.pos();
        Some(RawMatch {
            span: at..end,
            shape: shape.finish(end, self.convention, None),
            written,
        })
    }
}
