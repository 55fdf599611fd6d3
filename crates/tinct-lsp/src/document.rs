//! One open document: its text, its scan, and the LSP views of both.

use tinct_core::{Candidate, Catalog, ColorValue, Scanner, ScanLimits, Session, SessionError};
use tower_lsp::lsp_types::{
    Color, ColorInformation, ColorPresentation, Hover, HoverContents, MarkupContent, MarkupKind,
    Position, Range, TextEdit,
};

use crate::position::LineIndex;

pub struct Document {
    text: String,
    index: LineIndex,
    session: Session,
}

impl Document {
    pub fn new(text: String, catalog: &Catalog, limits: ScanLimits) -> Self {
        let index = LineIndex::new(&text);
        let session = Session::load(&Scanner::new(catalog).with_limits(limits), &text);
        Self { text, index, session }
    }

    pub fn is_truncated(&self) -> bool {
        self.session.is_truncated()
    }

    fn range_of(&self, c: &Candidate) -> Range {
        self.index.range(&self.text, c.span.start, c.span.end)
    }

    /// `textDocument/documentColor`.
    pub fn colors(&self) -> Vec<ColorInformation> {
        self.session
            .live_candidates()
            .map(|c| {
                let [red, green, blue, alpha] = c.value.to_rgba_f32();
                let color = Color { red, green, blue, alpha };
                ColorInformation { range: self.range_of(c), color }
            })
            .collect()
    }

    /// `textDocument/colorPresentation` for the literal occupying `range`.
    ///
    /// One presentation: the literal rewritten in its own notation.
    pub fn presentations(
        &self,
        range: Range,
        color: Color,
    ) -> Result<Vec<ColorPresentation>, SessionError> {
        let Some(start) = self.index.offset(&self.text, range.start) else {
            return Ok(Vec::new());
        };
        let Some(candidate) = self.session.candidate_at(start).filter(|c| c.span.start == start)
        else {
            return Ok(Vec::new());
        };

        let value = ColorValue::from_rgba_f32([color.red, color.green, color.blue, color.alpha]);
        let patch = self.session.preview(candidate.id, value)?;
        Ok(vec![ColorPresentation {
            label: patch.text.clone(),
            text_edit: Some(TextEdit { range: self.range_of(candidate), new_text: patch.text }),
            additional_text_edits: None,
        }])
    }

    /// `textDocument/hover` over a literal.
    pub fn hover(&self, pos: Position) -> Option<Hover> {
        let offset = self.index.offset(&self.text, pos)?;
        let c = self.session.candidate_at(offset)?;

        let mut md = format!(
            "**{}** · `{}` · {}\n\n`{}`",
            c.label(),
            c.value.to_hex_string(),
            c.shape.alpha_convention(),
            c.value
        );
        if c.clamped {
            md.push_str("\n\nOut-of-range channels were clamped to 0–255.");
        }
        if !c.shape.can_carry_alpha() {
            md.push_str("\n\nThis notation cannot hold a translucent color.");
        }
        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: md,
            }),
            range: Some(self.range_of(c)),
        })
    }
}
