//! Scan and rewrite over a C++ palette: Qt calls, namespaced struct
//! initializers, and 6- and 8-digit hex constants.

use tinct_core::{
    AlphaConvention, Candidate, Catalog, Channel, ColorValue, Notation, Scanner, Session,
    SessionError, render,
};

const PALETTE: &str = include_str!("fixtures/palette.cpp");

fn scan(src: &str) -> Vec<Candidate> {
    let catalog = Catalog::default();
    Scanner::new(&catalog).scan(src).collect()
}

fn find<'a>(found: &'a [Candidate], text: &str) -> &'a Candidate {
    found.iter().find(|c| c.text == text).unwrap_or_else(|| panic!("{text} not found"))
}

fn count(found: &[Candidate], notation: Notation) -> usize {
    found.iter().filter(|c| c.shape.notation() == notation).count()
}

#[test]
fn finds_every_integer_and_unit_literal() {
    let found = scan(PALETTE);
    assert_eq!(found.len(), 52);
    assert_eq!(count(&found, Notation::FunctionCall), 22);
    assert_eq!(count(&found, Notation::HexPacked), 15);
    assert_eq!(count(&found, Notation::PositionalStruct), 15);
}

#[test]
fn namespaced_initializers_default_to_premultiplied() {
    let found = scan(PALETTE);
    let structs: Vec<&Candidate> = found
        .iter()
        .filter(|c| c.shape.notation() == Notation::PositionalStruct)
        .collect();
    for c in &structs {
        assert_eq!(c.shape.alpha_convention(), AlphaConvention::Premultiplied, "{}", c.text);
    }
    assert_eq!(structs[0].text, "{255, 0, 0, 255}");
    assert_eq!(find(&found, "{0, 0, 0, 128}").value, ColorValue::new(0, 0, 0, 128));
    assert_eq!(find(&found, "{79, 195, 247, 255}").value, ColorValue::opaque(79, 195, 247));
}

#[test]
fn argb_constants_carry_alpha() {
    let found = scan(PALETTE);
    assert_eq!(find(&found, "0x80000000").value, ColorValue::new(0, 0, 0, 128));
    assert_eq!(find(&found, "0x00000000").value, ColorValue::new(0, 0, 0, 0));
    assert_eq!(find(&found, "0xFF0000FF").value, ColorValue::opaque(0, 0, 255));
    assert_eq!(find(&found, "0xFF5722").value, ColorValue::opaque(255, 87, 34));
}

#[test]
fn unit_constructors_read_as_fractions() {
    let found = scan(PALETTE);
    let overlay = find(&found, "QColor::fromRgbF(0.000, 0.000, 0.000, 0.50)");
    assert_eq!(overlay.value, ColorValue::new(0, 0, 0, 128));
    let primary = find(&found, "QColor::fromRgbF(0.384, 0.000, 0.933)");
    assert_eq!(primary.value, ColorValue::opaque(98, 0, 238));

    let highlight = find(&found, "QColor::fromRgbF(0.384, 0.000, 0.933, 0.25)");
    let out = render(highlight, highlight.value.with_channel(Channel::A, 128)).unwrap();
    assert_eq!(out.text, "QColor::fromRgbF(0.384, 0.000, 0.933, 0.50)");
}

#[test]
fn unchanged_values_render_identically() {
    for c in scan(PALETTE) {
        assert_eq!(render(&c, c.value).unwrap().text, c.text, "{}", c.label());
    }
}

#[test]
fn translucent_edits_widen_or_refuse() {
    let catalog = Catalog::default();
    let session = Session::load(&Scanner::new(&catalog), PALETTE);
    let (mut written, mut widened, mut refused) = (0, 0, 0);
    for c in session.candidates() {
        match session.preview(c.id, c.value.with_channel(Channel::A, 128)) {
            Ok(patch) if patch.widened => widened += 1,
            Ok(_) => written += 1,
            Err(SessionError::Unrepresentable(e)) => {
                assert_eq!(e.notation, Notation::HexPacked);
                refused += 1;
            }
            Err(e) => panic!("{e}"),
        }
    }
    // 3-argument calls gain alpha; 6-digit constants have nowhere to put it.
    assert_eq!((written, widened, refused), (28, 14, 10));

    let primary = session.candidates().iter().find(|c| c.text == "QColor(98, 0, 238)").unwrap();
    let patch = session.preview(primary.id, primary.value.with_channel(Channel::A, 64)).unwrap();
    assert_eq!(patch.text, "QColor(98, 0, 238, 64)");
}
