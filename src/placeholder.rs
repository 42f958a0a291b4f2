//! Renders local placeholder images for panels whose artwork couldn't be
//! generated.

use std::io::Cursor;

use ab_glyph::{Font, FontVec, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::constants::{PLACEHOLDER_MAX_LINES, PLACEHOLDER_SCENE_LIMIT};
use crate::error::ComicgenError;
use crate::panel::Panel;

/// Gradient endpoint at the top of the image.
const GRADIENT_TOP: (f32, f32, f32) = (102.0, 126.0, 241.0);
/// Gradient endpoint at the bottom of the image.
const GRADIENT_BOTTOM: (f32, f32, f32) = (118.0, 187.0, 162.0);

const BADGE_FILL: Rgb<u8> = Rgb([0x63, 0x66, 0xf1]);
const TEXT_COLOR: Rgb<u8> = Rgb([0x1f, 0x29, 0x37]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

const BADGE_SIZE: i32 = 60;
const LINE_HEIGHT: i32 = 18;

/// System font locations tried before falling back to the bundled fonts.
const PREFERRED_BOLD_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];
const PREFERRED_REGULAR_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

const BUNDLED_BOLD_FONT: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");
const BUNDLED_REGULAR_FONT: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");

/// Renders a placeholder image for a panel and returns the PNG bytes.
///
/// The layout needs room for the number badge and the scene text box, so
/// dimensions below 100x200 are rejected. Deterministic apart from which
/// font the host resolves.
pub fn render_placeholder(panel: &Panel, width: u32, height: u32) -> Result<Vec<u8>, ComicgenError> {
    if width < 100 || height < 200 {
        return Err(ComicgenError::InternalServerError(format!(
            "Placeholder dimensions {width}x{height} are too small to lay out"
        )));
    }

    let font_large = load_font(PREFERRED_BOLD_FONTS, BUNDLED_BOLD_FONT)?;
    let font_medium = load_font(PREFERRED_REGULAR_FONTS, BUNDLED_REGULAR_FONT)?;
    let scale_large = PxScale::from(32.0);
    let scale_medium = PxScale::from(16.0);

    let mut image = RgbImage::new(width, height);

    // gradient background, one scanline at a time
    for y in 0..height {
        let t = y as f32 / height as f32;
        let pixel = Rgb([
            (GRADIENT_TOP.0 + (GRADIENT_BOTTOM.0 - GRADIENT_TOP.0) * t) as u8,
            (GRADIENT_TOP.1 + (GRADIENT_BOTTOM.1 - GRADIENT_TOP.1) * t) as u8,
            (GRADIENT_TOP.2 + (GRADIENT_BOTTOM.2 - GRADIENT_TOP.2) * t) as u8,
        ]);
        for x in 0..width {
            image.put_pixel(x, y, pixel);
        }
    }

    // panel number badge: white ring around a filled circle
    let badge_center = (20 + BADGE_SIZE / 2, 20 + BADGE_SIZE / 2);
    draw_filled_circle_mut(&mut image, badge_center, BADGE_SIZE / 2, WHITE);
    draw_filled_circle_mut(&mut image, badge_center, BADGE_SIZE / 2 - 4, BADGE_FILL);

    let number_text = panel.panel_number.to_string();
    let (number_width, number_height) = text_size(scale_large, &font_large, &number_text);
    let number_x = 20 + (BADGE_SIZE - number_width as i32) / 2;
    let number_y = 20 + (BADGE_SIZE - number_height as i32) / 2;
    draw_text_mut(
        &mut image,
        WHITE,
        number_x,
        number_y,
        scale_large,
        &font_large,
        &number_text,
    );

    // scene description, wrapped into the bottom text box
    let scene_text = truncate_scene(&panel.scene);
    let lines = scene_lines(&scene_text, width - 40, scale_medium, &font_medium);

    let box_y = height as i32 - 160;
    let box_height = height as i32 - 10 - box_y;
    draw_filled_rect_mut(
        &mut image,
        Rect::at(10, box_y).of_size(width - 20, box_height as u32),
        BADGE_FILL,
    );
    draw_filled_rect_mut(
        &mut image,
        Rect::at(13, box_y + 3).of_size(width - 26, box_height as u32 - 6),
        WHITE,
    );

    let mut text_y = box_y + 10;
    for line in &lines {
        draw_text_mut(
            &mut image,
            TEXT_COLOR,
            20,
            text_y,
            scale_medium,
            &font_medium,
            line,
        );
        text_y += LINE_HEIGHT;
    }

    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Loads the first readable preferred font, falling back to the bundled one.
fn load_font(preferred: &[&str], bundled: &[u8]) -> Result<FontVec, ComicgenError> {
    for path in preferred {
        if let Ok(bytes) = std::fs::read(path)
            && let Ok(font) = FontVec::try_from_vec(bytes)
        {
            return Ok(font);
        }
    }
    FontVec::try_from_vec(bundled.to_vec()).map_err(|err| {
        ComicgenError::InternalServerError(format!("Failed to load bundled font: {err}"))
    })
}

/// Caps scene text at the rendering limit, marking the cut with an ellipsis.
fn truncate_scene(scene: &str) -> String {
    if scene.chars().count() <= PLACEHOLDER_SCENE_LIMIT {
        return scene.to_string();
    }
    let kept: String = scene.chars().take(PLACEHOLDER_SCENE_LIMIT - 3).collect();
    format!("{kept}...")
}

/// Wraps scene text and caps it at the rendered line limit; overflow is
/// silently dropped.
fn scene_lines(text: &str, max_width: u32, scale: PxScale, font: &impl Font) -> Vec<String> {
    let mut lines = wrap_words(text, max_width, scale, font);
    lines.truncate(PLACEHOLDER_MAX_LINES);
    lines
}

/// Greedy word wrap against a pixel budget: each word is appended to the
/// current line unless the measured result would overflow, in which case a
/// new line starts with that word. A single word wider than the budget
/// still gets its own line.
fn wrap_words(text: &str, max_width: u32, scale: PxScale, font: &impl Font) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let (candidate_width, _) = text_size(scale, font, &candidate);
        if candidate_width <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
