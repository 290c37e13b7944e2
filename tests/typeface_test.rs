use box_scene::{
    config::TextConfig,
    text::{
        RusttypeFace, Typeface,
        fitted::{FittedTextPlane, texture_extent},
    },
};

const DEJAVU: &[u8] = include_bytes!("fixtures/fonts/DejaVuSans.ttf");

fn dejavu() -> RusttypeFace {
    RusttypeFace::from_bytes("DejaVuSans", DEJAVU.to_vec()).unwrap()
}

fn label() -> TextConfig {
    TextConfig {
        content: "Hello, box".to_string(),
        texture_scale: 200.0,
        ..TextConfig::default()
    }
}

#[test]
fn width_grows_with_font_size() {
    let face = dejavu();
    let small = face.measure("Hello, box", 11.0);
    let large = face.measure("Hello, box", 22.0);
    assert!(small > 0.0);
    assert!((large - 2.0 * small).abs() < 0.5, "{} vs {}", large, small);
    assert_eq!(face.measure("", 11.0), 0.0);
}

#[test]
fn glyph_ink_stays_within_the_measured_advance() {
    let face = dejavu();
    let (mut min_x, mut max_x) = (i32::MAX, i32::MIN);
    face.draw("Hello, box", 40.0, (0.0, 40.0), &mut |x, _, coverage| {
        if coverage > 0.0 {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
    });
    let advance = face.measure("Hello, box", 40.0);
    assert!(min_x >= 0, "ink starts at {}", min_x);
    assert!((max_x as f32) <= advance.ceil(), "ink ends at {} of {}", max_x, advance);
}

#[test]
fn fitted_label_spans_but_never_exceeds_the_texture() {
    let config = label();
    let width = texture_extent(config.plane_width, config.texture_scale);
    let renderer = FittedTextPlane::new(config.clone(), "EMPTY", Box::new(dejavu()));
    let texture = renderer.render_texture().unwrap();
    assert_eq!(texture.width(), width);

    let face = dejavu();
    let measured = face.measure(&config.content, config.reference_size);
    let font_size = (width as f32 / (measured / config.reference_size)).floor();
    assert!(face.measure(&config.content, font_size) <= width as f32 + 1e-3);

    let inked: Vec<u32> = (0..texture.width())
        .filter(|&x| (0..texture.height()).any(|y| texture.pixel(x, y) != [255, 255, 255, 255]))
        .collect();
    let (first, last) = (inked[0], inked[inked.len() - 1]);
    assert!(last - first > width * 3 / 4, "ink spans {}..{}", first, last);
}
