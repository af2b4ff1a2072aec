//! Red/white/blue heat coloring and instrument hues.

use crate::models::Instrument;
use crate::options::Palette;
use crate::surface::Rgba;

const RED_HUE: f64 = 0.0;
const BLUE_HUE: f64 = 240.0;

/// Signed values normalized by the largest magnitude among peers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatScale {
  max: f64,
  bipolar: bool,
}

impl HeatScale {
  pub fn new<I: IntoIterator<Item = f64>>(values: I, bipolar: bool) -> Self {
    let max = values.into_iter()
      .filter(|v| v.is_finite())
      .fold(0.0, |max: f64, v| max.max(v.abs()));
    Self { max, bipolar }
  }

  pub fn max(&self) -> f64 {
    self.max
  }

  /// Positive values go red, negative blue, zero (or a zero scale) white.
  pub fn color(&self, value: f64) -> Rgba {
    if self.max == 0.0 || value == 0.0 || !value.is_finite() {
      return Rgba::WHITE;
    }
    let saturation = if self.bipolar { 1.0 } else { (value.abs() / self.max).min(1.0) };
    let hue = if value > 0.0 { RED_HUE } else { BLUE_HUE };
    hsv(hue, saturation, 1.0)
  }
}

/// Color for a musician's instrument when it is not heat-colored.
pub fn instrument_color(palette: Palette, instrument: Instrument, instruments: &[Instrument]) -> Rgba {
  match palette {
    Palette::Hue => {
      let count = instruments.len().max(1);
      hsv(360.0 * instrument.0 as f64 / count as f64, 1.0, 1.0)
    }
    Palette::Rainbow => {
      let max = instruments.last().map_or(0, |i| i.0);
      colorous::RAINBOW.eval_rational(instrument.0.min(max), max + 1).into()
    }
  }
}

/// `hue` in degrees, `saturation` and `value` in `0..=1`.
pub fn hsv(hue: f64, saturation: f64, value: f64) -> Rgba {
  let h = hue.rem_euclid(360.0) / 60.0;
  let c = value * saturation;
  let x = c * (1.0 - (h % 2.0 - 1.0).abs());
  let (r, g, b) = match h as u32 {
    0 => (c, x, 0.0),
    1 => (x, c, 0.0),
    2 => (0.0, c, x),
    3 => (0.0, x, c),
    4 => (x, 0.0, c),
    _ => (c, 0.0, x),
  };
  let m = value - c;
  let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
  Rgba::rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_zero_values_render_white() {
    let scale = HeatScale::new([0.0, 0.0, -0.0], false);
    assert_eq!(scale.max(), 0.0);
    assert_eq!(scale.color(0.0), Rgba::WHITE);
    // A zero scale never divides, even for a stray nonzero value.
    assert_eq!(scale.color(5.0), Rgba::WHITE);
  }

  #[test]
  fn extremes_are_pure_red_and_blue() {
    let scale = HeatScale::new([10.0, -20.0, 5.0], false);
    assert_eq!(scale.max(), 20.0);
    assert_eq!(scale.color(-20.0), Rgba::rgb(0, 0, 255));
    assert_eq!(scale.color(10.0), Rgba::rgb(255, 128, 128));
    assert_eq!(scale.color(0.0), Rgba::WHITE);
  }

  #[test]
  fn bipolar_saturates_nonzero_values() {
    let scale = HeatScale::new([100.0, -1.0], true);
    assert_eq!(scale.color(1.0), Rgba::rgb(255, 0, 0));
    assert_eq!(scale.color(-0.5), Rgba::rgb(0, 0, 255));
    assert_eq!(scale.color(0.0), Rgba::WHITE);
  }

  #[test]
  fn non_finite_values_are_ignored() {
    let scale = HeatScale::new([f64::NAN, 4.0, f64::INFINITY], false);
    assert_eq!(scale.max(), 4.0);
    assert_eq!(scale.color(f64::NAN), Rgba::WHITE);
  }

  #[test]
  fn instrument_hues_spread_over_the_wheel() {
    let instruments = [Instrument(0), Instrument(1), Instrument(2)];
    assert_eq!(instrument_color(Palette::Hue, Instrument(0), &instruments), Rgba::rgb(255, 0, 0));
    assert_eq!(instrument_color(Palette::Hue, Instrument(1), &instruments), Rgba::rgb(0, 255, 0));
    assert_eq!(instrument_color(Palette::Hue, Instrument(2), &instruments), Rgba::rgb(0, 0, 255));
  }

  #[test]
  fn rainbow_palette_matches_colorous() {
    let instruments = [Instrument(0), Instrument(3)];
    let expected: Rgba = colorous::RAINBOW.eval_rational(3, 4).into();
    assert_eq!(instrument_color(Palette::Rainbow, Instrument(3), &instruments), expected);
  }
}
