//! The drawing-surface capability the scene renders into.
//!
//! All coordinates and lengths are surface units on a square of side
//! [`SURFACE_SIZE`]. Backends map that onto whatever resolution they hold.

use std::path::Path;

use bevy::math::DVec2;
use image::{Rgba as Pixel, RgbaImage};

use crate::error::Error;
use crate::viewport::SURFACE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Rgba {
  pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
  pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 255 }
  }
}

impl From<colorous::Color> for Rgba {
  fn from(color: colorous::Color) -> Self {
    Rgba::rgb(color.r, color.g, color.b)
  }
}

/// Axis-aligned rectangle on the surface; `origin` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
  pub origin: DVec2,
  pub size: DVec2,
}

pub trait Surface {
  fn clear(&mut self, color: Rgba);
  fn fill_rect(&mut self, rect: SurfaceRect, color: Rgba);
  /// Strokes are centered on the outline.
  fn stroke_rect(&mut self, rect: SurfaceRect, color: Rgba, line_width: f64);
  fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);
  fn stroke_circle(&mut self, center: DVec2, radius: f64, color: Rgba, line_width: f64);
  /// `origin` is the top-left of the text box, `height` the glyph height.
  fn fill_text(&mut self, text: &str, origin: DVec2, height: f64, color: Rgba);
  fn measure_text(&self, text: &str, height: f64) -> f64;
}

/// CPU pixel backend. Backs both the live window texture and PNG export.
pub struct Raster {
  image: RgbaImage,
  // pixels per surface unit
  scale: f64,
}

impl Raster {
  pub fn new(pixels: u32) -> Self {
    let pixels = pixels.max(1);
    Self {
      image: RgbaImage::from_pixel(pixels, pixels, Pixel([255, 255, 255, 255])),
      scale: f64::from(pixels) / SURFACE_SIZE,
    }
  }

  pub fn pixels(&self) -> u32 {
    self.image.width()
  }

  pub fn image(&self) -> &RgbaImage {
    &self.image
  }

  pub fn as_bytes(&self) -> &[u8] {
    self.image.as_raw()
  }

  pub fn pixel(&self, x: u32, y: u32) -> Rgba {
    let Pixel([r, g, b, a]) = *self.image.get_pixel(x, y);
    Rgba { r, g, b, a }
  }

  pub fn save_png(&self, path: &Path) -> Result<(), Error> {
    self.image
      .save_with_format(path, image::ImageFormat::Png)
      .map_err(|source| Error::Image { path: path.to_path_buf(), source })
  }

  /// Pixel index range covering `[lo, hi)` surface units, clipped to the image.
  fn span(&self, lo: f64, hi: f64) -> std::ops::Range<u32> {
    let n = f64::from(self.pixels());
    let start = (lo * self.scale).round().clamp(0.0, n) as u32;
    let end = (hi * self.scale).round().clamp(0.0, n) as u32;
    start..end
  }

  fn blend(&mut self, x: u32, y: u32, color: Rgba) {
    let px = self.image.get_pixel_mut(x, y);
    if color.a == 255 {
      *px = Pixel([color.r, color.g, color.b, 255]);
      return;
    }
    let alpha = u16::from(color.a);
    let mix = |src: u8, dst: u8| ((u16::from(src) * alpha + u16::from(dst) * (255 - alpha)) / 255) as u8;
    let Pixel([r, g, b, _]) = *px;
    *px = Pixel([mix(color.r, r), mix(color.g, g), mix(color.b, b), 255]);
  }

  /// Fills pixels whose centers satisfy `inside(distance_from_center)`.
  fn fill_radial(&mut self, center: DVec2, outer: f64, color: Rgba, inside: impl Fn(f64) -> bool) {
    let c = center * self.scale;
    let xs = self.span(center.x - outer - 1.0 / self.scale, center.x + outer + 1.0 / self.scale);
    let ys = self.span(center.y - outer - 1.0 / self.scale, center.y + outer + 1.0 / self.scale);
    for y in ys {
      for x in xs.clone() {
        let d = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5).distance(c);
        if inside(d) {
          self.blend(x, y, color);
        }
      }
    }
  }

  // A single pixel is the thinnest visible line.
  fn min_width(&self, line_width: f64) -> f64 {
    line_width.max(1.0 / self.scale)
  }
}

impl Surface for Raster {
  fn clear(&mut self, color: Rgba) {
    for px in self.image.pixels_mut() {
      *px = Pixel([color.r, color.g, color.b, color.a]);
    }
  }

  fn fill_rect(&mut self, rect: SurfaceRect, color: Rgba) {
    let (x0, x1) = ordered(rect.origin.x, rect.origin.x + rect.size.x);
    let (y0, y1) = ordered(rect.origin.y, rect.origin.y + rect.size.y);
    let xs = self.span(x0, x1);
    for y in self.span(y0, y1) {
      for x in xs.clone() {
        self.blend(x, y, color);
      }
    }
  }

  fn stroke_rect(&mut self, rect: SurfaceRect, color: Rgba, line_width: f64) {
    let lw = self.min_width(line_width);
    let half = lw / 2.0;
    let (x0, x1) = ordered(rect.origin.x, rect.origin.x + rect.size.x);
    let (y0, y1) = ordered(rect.origin.y, rect.origin.y + rect.size.y);
    let edges = [
      (DVec2::new(x0 - half, y0 - half), DVec2::new(x1 - x0 + lw, lw)),
      (DVec2::new(x0 - half, y1 - half), DVec2::new(x1 - x0 + lw, lw)),
      (DVec2::new(x0 - half, y0 - half), DVec2::new(lw, y1 - y0 + lw)),
      (DVec2::new(x1 - half, y0 - half), DVec2::new(lw, y1 - y0 + lw)),
    ];
    for (origin, size) in edges {
      self.fill_rect(SurfaceRect { origin, size }, color);
    }
  }

  fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
    // Tiny markers still cover the pixel under their center.
    let r = (radius * self.scale).max(0.5);
    self.fill_radial(center, radius, color, |d| d <= r);
  }

  fn stroke_circle(&mut self, center: DVec2, radius: f64, color: Rgba, line_width: f64) {
    let half = self.min_width(line_width) * self.scale / 2.0;
    let r = radius * self.scale;
    self.fill_radial(center, radius + line_width, color, |d| (d - r).abs() <= half);
  }

  fn fill_text(&mut self, text: &str, origin: DVec2, height: f64, color: Rgba) {
    let cell = height / f64::from(font::ROWS);
    for (col, ch) in text.chars().enumerate() {
      let Some(rows) = font::glyph(ch) else { continue };
      let left = origin.x + col as f64 * cell * f64::from(font::ADVANCE);
      for (row, bits) in rows.iter().enumerate() {
        for bit in 0..font::COLS {
          let mask = 1u8 << (font::COLS - 1 - bit);
          if *bits & mask != 0 {
            let rect = SurfaceRect {
              origin: DVec2::new(left + f64::from(bit) * cell, origin.y + row as f64 * cell),
              size: DVec2::splat(cell),
            };
            self.fill_rect(rect, color);
          }
        }
      }
    }
  }

  fn measure_text(&self, text: &str, height: f64) -> f64 {
    font::measure(text, height)
  }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
  if a <= b { (a, b) } else { (b, a) }
}

/// 5x7 bitmap glyphs for the cursor readout.
mod font {
  pub(super) const COLS: u32 = 5;
  pub(super) const ROWS: u8 = 7;
  pub(super) const ADVANCE: u8 = 6;

  pub(super) fn measure(text: &str, height: f64) -> f64 {
    text.chars().count() as f64 * height / f64::from(ROWS) * f64::from(ADVANCE)
  }

  pub(super) fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    Some(match ch {
      '0' => &[0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
      '1' => &[0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
      '2' => &[0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
      '3' => &[0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
      '4' => &[0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
      '5' => &[0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
      '6' => &[0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
      '7' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
      '8' => &[0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
      '9' => &[0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
      '.' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
      ',' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
      '-' => &[0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
      '+' => &[0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
      ':' => &[0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
      '(' => &[0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
      ')' => &[0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
      _ => return None,
    })
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  pub(crate) enum Op {
    Clear(Rgba),
    FillRect(SurfaceRect, Rgba),
    StrokeRect(SurfaceRect, Rgba, f64),
    FillCircle(DVec2, f64, Rgba),
    StrokeCircle(DVec2, f64, Rgba, f64),
    Text(String, DVec2),
  }

  /// Records draw calls instead of rasterizing them.
  #[derive(Debug, Default)]
  pub(crate) struct Recorder {
    pub(crate) ops: Vec<Op>,
  }

  impl Recorder {
    pub(crate) fn fill_circles(&self) -> Vec<(DVec2, f64, Rgba)> {
      self.ops.iter().filter_map(|op| match op {
        Op::FillCircle(c, r, color) => Some((*c, *r, *color)),
        _ => None,
      }).collect()
    }

    pub(crate) fn texts(&self) -> Vec<&str> {
      self.ops.iter().filter_map(|op| match op {
        Op::Text(text, _) => Some(text.as_str()),
        _ => None,
      }).collect()
    }
  }

  impl Surface for Recorder {
    fn clear(&mut self, color: Rgba) {
      self.ops.push(Op::Clear(color));
    }

    fn fill_rect(&mut self, rect: SurfaceRect, color: Rgba) {
      self.ops.push(Op::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: SurfaceRect, color: Rgba, line_width: f64) {
      self.ops.push(Op::StrokeRect(rect, color, line_width));
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
      self.ops.push(Op::FillCircle(center, radius, color));
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: Rgba, line_width: f64) {
      self.ops.push(Op::StrokeCircle(center, radius, color, line_width));
    }

    fn fill_text(&mut self, text: &str, origin: DVec2, _height: f64, _color: Rgba) {
      self.ops.push(Op::Text(text.to_string(), origin));
    }

    fn measure_text(&self, text: &str, height: f64) -> f64 {
      font::measure(text, height)
    }
  }
}
