//! Drawing seam between the simulation and whatever puts pixels on screen.
//!
//! The world only ever talks to [`Renderer`]. [`Canvas`] is the software
//! implementation used by the windowed binary: an RGBA8 buffer the front-end
//! copies into its surface after every [`Renderer::flip`].

use crate::geom::Rect;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// What to draw. Asset choice belongs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Agent,
    Food,
    Killer,
    Decoration,
}

pub trait Renderer {
    fn clear_background(&mut self, color: Rgb);
    fn present(&mut self, sprite: Sprite, bounds: Rect);
    fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: u32, color: Rgb);
    /// Finish the frame.
    fn flip(&mut self) -> Result<()>;
}

pub struct Canvas {
    width: u32,
    height: u32,
    frame: Vec<u8>,
    frames_presented: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: vec![0; width as usize * height as usize * 4],
            frames_presented: 0,
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8, row-major.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let idx = self.index(x as i32, y as i32)?;
        let px = self.frame.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: Rgb, a: u8) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let Some(px) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let alpha = u16::from(a);
        let inv = 255 - alpha;
        let mix = |src: u8, dst: u8| ((u16::from(src) * alpha + u16::from(dst) * inv) / 255) as u8;
        px[0] = mix(c.r, px[0]);
        px[1] = mix(c.g, px[1]);
        px[2] = mix(c.b, px[2]);
        px[3] = 255;
    }

    fn fill_rect(&mut self, rect: Rect, c: Rgb, a: u8) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width as i32);
        let y1 = rect.bottom().min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, c, a);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, c: Rgb, a: u8) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        let (x2, y2) = (rect.right() - 1, rect.bottom() - 1);
        for px in rect.x..=x2 {
            self.blend_pixel(px, rect.y, c, a);
            self.blend_pixel(px, y2, c, a);
        }
        for py in rect.y..=y2 {
            self.blend_pixel(rect.x, py, c, a);
            self.blend_pixel(x2, py, c, a);
        }
    }

    fn draw_char(&mut self, ch: char, x: i32, y: i32, scale: u32, c: Rgb) -> i32 {
        let advance = (6 * scale) as i32;
        let Some(rows) = glyph_5x7(ch) else {
            return advance;
        };
        let s = scale as i32;
        for (ry, row) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (row >> (4 - rx)) & 1 == 0 {
                    continue;
                }
                let cell = Rect::new(x + rx * s, y + ry as i32 * s, scale, scale);
                self.fill_rect(cell, c, 255);
            }
        }
        advance
    }
}

const fn sprite_colors(sprite: Sprite) -> (Rgb, Rgb) {
    match sprite {
        Sprite::Agent => (Rgb::new(60, 110, 230), Rgb::new(20, 40, 120)),
        Sprite::Food => (Rgb::new(80, 200, 90), Rgb::new(30, 110, 40)),
        Sprite::Killer => (Rgb::new(220, 50, 50), Rgb::new(120, 20, 20)),
        Sprite::Decoration => (Rgb::new(150, 170, 90), Rgb::new(150, 170, 90)),
    }
}

impl Renderer for Canvas {
    fn clear_background(&mut self, color: Rgb) {
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    fn present(&mut self, sprite: Sprite, bounds: Rect) {
        let (fill, edge) = sprite_colors(sprite);
        // Grass tufts sit behind everything and are drawn half-transparent.
        let alpha = if sprite == Sprite::Decoration { 140 } else { 255 };
        self.fill_rect(bounds, fill, alpha);
        self.stroke_rect(bounds, edge, alpha);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: u32, color: Rgb) {
        let mut cx = x;
        for ch in text.chars() {
            cx += self.draw_char(ch, cx, y, scale, color);
        }
    }

    fn flip(&mut self) -> Result<()> {
        self.frames_presented += 1;
        Ok(())
    }
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0b00000; 7],
        _ => return None,
    };
    Some(rows)
}
