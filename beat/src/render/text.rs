use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Horizontal alignment of laid out text inside its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font measurements at scale 1. Provided by whoever owns the real font.
pub trait GlyphMetrics {
    fn advance(&self, ch: char) -> f32;
    fn line_height(&self) -> f32;
}

/// Fixed-width metrics, good enough for bitmap fonts and headless runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 12.0,
        }
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn advance(&self, _ch: char) -> f32 {
        self.advance
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// One wrapped line, positioned by its top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub position: Vec2,
    pub width: f32,
}

fn measure(metrics: &dyn GlyphMetrics, text: &str, scale: f32) -> f32 {
    text.chars().map(|c| metrics.advance(c)).sum::<f32>() * scale
}

/// Word-wrap `text` into a box `width` wide whose top-left corner is `top_left`.
///
/// Lines grow downwards (decreasing y). Explicit newlines are kept; a word
/// wider than the box sits alone on its line rather than being split.
pub fn layout(
    text: &str,
    metrics: &dyn GlyphMetrics,
    scale: f32,
    top_left: Vec2,
    width: f32,
    align: HAlign,
) -> Vec<TextLine> {
    let space = metrics.advance(' ') * scale;
    let mut wrapped: Vec<(String, f32)> = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0;
        for word in paragraph.split_whitespace() {
            let word_width = measure(metrics, word, scale);
            if !line.is_empty() && line_width + space + word_width > width {
                wrapped.push((std::mem::take(&mut line), line_width));
                line_width = 0.0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_width += space;
            }
            line.push_str(word);
            line_width += word_width;
        }
        wrapped.push((line, line_width));
    }

    let line_height = metrics.line_height() * scale;
    wrapped
        .into_iter()
        .enumerate()
        .map(|(i, (text, line_width))| {
            let x = match align {
                HAlign::Left => top_left.x,
                HAlign::Center => top_left.x + (width - line_width) * 0.5,
                HAlign::Right => top_left.x + width - line_width,
            };
            TextLine {
                text,
                position: Vec2::new(x, top_left.y - i as f32 * line_height),
                width: line_width,
            }
        })
        .collect()
}
