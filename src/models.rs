use std::collections::BTreeSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub type Dimension = f64;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Instrument(pub usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Position {
  pub x: Dimension,
  pub y: Dimension,
}

impl Position {
  pub fn new(x: Dimension, y: Dimension) -> Self {
    Self { x, y }
  }

  pub fn distance_squared(&self, other: &Position) -> Dimension {
    let dx = self.x - other.x;
    let dy = self.y - other.y;
    dx * dx + dy * dy
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Attendee {
  #[serde(flatten)]
  pub position: Position,
  pub tastes: Vec<f64>,
}

impl Attendee {
  /// Missing entries read as a neutral taste of zero.
  pub fn taste(&self, instrument: Instrument) -> f64 {
    self.tastes.get(instrument.0).copied().unwrap_or(0.0)
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Pillar {
  pub center: [Dimension; 2],
  pub radius: Dimension,
}

impl Pillar {
  pub fn position(&self) -> Position {
    Position::new(self.center[0], self.center[1])
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProblemSpec {
  pub room_height: Dimension,
  pub room_width: Dimension,
  pub stage_height: Dimension,
  pub stage_width: Dimension,
  pub stage_bottom_left: [Dimension; 2],
  pub musicians: Vec<Instrument>,
  pub attendees: Vec<Attendee>,
  #[serde(default)]
  pub pillars: Vec<Pillar>,
}

impl ProblemSpec {
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn stage_origin(&self) -> Position {
    Position::new(self.stage_bottom_left[0], self.stage_bottom_left[1])
  }

  /// Distinct instruments, ascending.
  pub fn instruments(&self) -> Vec<Instrument> {
    self.musicians.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Solution {
  pub placements: Vec<Position>,
}

impl Solution {
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// Indices that exist in both the problem's musician list and the placements.
  pub fn placed<'a>(&'a self, problem: &'a ProblemSpec) -> impl Iterator<Item = (usize, Instrument, &'a Position)> + 'a {
    problem.musicians.iter().copied()
      .zip(self.placements.iter())
      .enumerate()
      .map(|(idx, (inst, pos))| (idx, inst, pos))
  }
}

/// Score breakdown produced by the external evaluator. Every list may be
/// empty or shorter than the entity list it describes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EvaluationResult {
  #[serde(default)]
  pub score: f64,
  #[serde(default)]
  pub attendees: Vec<f64>,
  #[serde(default)]
  pub musicians: Vec<f64>,
  #[serde(default)]
  pub instruments: Vec<f64>,
  #[serde(default)]
  pub detailed_attendees: Vec<f64>,
  #[serde(default)]
  pub detailed_musicians: Vec<f64>,
  #[serde(default)]
  pub detailed_instruments: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  Attendee,
  Musician,
}

/// A hovered or locked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Item {
  pub kind: ItemKind,
  pub index: usize,
}

impl Item {
  pub fn attendee(index: usize) -> Self {
    Self { kind: ItemKind::Attendee, index }
  }

  pub fn musician(index: usize) -> Self {
    Self { kind: ItemKind::Musician, index }
  }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
  let json = std::fs::read_to_string(path).map_err(|source| Error::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&json).map_err(|source| Error::Parse {
    path: path.to_path_buf(),
    source,
  })
}
