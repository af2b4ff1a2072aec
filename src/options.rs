use serde::{Deserialize, Serialize};

use crate::models::{Instrument, Item};

/// How musicians are colored when they are not heat-colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
  /// `hue = 360 * instrument / distinct_instruments`, full saturation and value.
  #[default]
  Hue,
  /// colorous rainbow over `0..=max_instrument`.
  Rainbow,
}

/// Host-owned rendering configuration. The locked item lives here, hover never does.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderingOption {
  #[serde(default)]
  pub taste_heatmap_instrument: Option<Instrument>,
  #[serde(default)]
  pub score_heatmap_musicians: bool,
  #[serde(default = "default_true")]
  pub score_heatmap_attendees: bool,
  #[serde(default)]
  pub bipolar_heatmap: bool,
  #[serde(default)]
  pub palette: Palette,
  #[serde(default)]
  pub locked_item: Option<Item>,
}

fn default_true() -> bool {
  true
}

impl Default for RenderingOption {
  fn default() -> Self {
    Self {
      taste_heatmap_instrument: None,
      score_heatmap_musicians: false,
      score_heatmap_attendees: true,
      bipolar_heatmap: false,
      palette: Palette::default(),
      locked_item: None,
    }
  }
}

impl RenderingOption {
  /// Clicking the locked item unlocks it, clicking anything else locks that.
  pub fn toggle_lock(&mut self, clicked: Item) {
    self.locked_item = match self.locked_item {
      Some(locked) if locked == clicked => None,
      _ => Some(clicked),
    };
    tracing::debug!(locked = ?self.locked_item, "lock toggled");
  }

  /// Steps the taste heatmap through `None -> instruments[0] -> ... -> None`.
  pub fn cycle_taste_instrument(&mut self, instruments: &[Instrument]) {
    self.taste_heatmap_instrument = match self.taste_heatmap_instrument {
      None => instruments.first().copied(),
      Some(current) => instruments.iter().copied().find(|i| *i > current),
    };
  }
}
