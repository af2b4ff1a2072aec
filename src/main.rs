use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use viewer::inspect;
use viewer::models::{load_json, EvaluationResult, Instrument, Item, ItemKind, ProblemSpec, Solution};
use viewer::options::{Palette, RenderingOption};
use viewer::render;
use viewer::scene::Scene;
use viewer::snapshot;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct Inputs {
  problem: PathBuf,
  #[arg(short, long, env = "VIEWER_SOLUTION")]
  solution: Option<PathBuf>,
  #[arg(short, long, env = "VIEWER_EVALUATION")]
  evaluation: Option<PathBuf>,
}

#[derive(Args)]
struct Rendering {
  /// Colors attendees by their taste for this instrument
  #[arg(long, env = "VIEWER_TASTE_INSTRUMENT")]
  taste_instrument: Option<usize>,
  #[arg(long, env = "VIEWER_MUSICIAN_HEATMAP")]
  musician_heatmap: bool,
  #[arg(long, env = "VIEWER_NO_ATTENDEE_HEATMAP")]
  no_attendee_heatmap: bool,
  /// Full saturation for every non-zero score
  #[arg(long, env = "VIEWER_BIPOLAR")]
  bipolar: bool,
  #[arg(long, env = "VIEWER_PALETTE", value_enum, default_value_t = Palette::Hue)]
  palette: Palette,
}

impl Rendering {
  fn option(&self) -> RenderingOption {
    RenderingOption {
      taste_heatmap_instrument: self.taste_instrument.map(Instrument),
      score_heatmap_musicians: self.musician_heatmap,
      score_heatmap_attendees: !self.no_attendee_heatmap,
      bipolar_heatmap: self.bipolar,
      palette: self.palette,
      locked_item: None,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Opens the interactive viewer on the provided problem
  Render {
    #[command(flatten)]
    inputs: Inputs,
    #[command(flatten)]
    rendering: Rendering,
    #[arg(long, env = "VIEWER_PIXELS", default_value_t = 1000)]
    pixels: u32,
  },
  /// Writes a PNG of the fitted scene
  Snapshot {
    #[command(flatten)]
    inputs: Inputs,
    #[command(flatten)]
    rendering: Rendering,
    #[arg(short, long)]
    output: PathBuf,
    #[arg(long, default_value_t = 2000)]
    pixels: u32,
  },
  /// Prints what the viewer shows for one attendee or musician
  Inspect {
    #[command(flatten)]
    inputs: Inputs,
    #[arg(long, value_enum)]
    kind: ItemKind,
    #[arg(long)]
    index: usize,
    /// Scores and tastes relative to this item of the other kind
    #[arg(long)]
    locked: Option<usize>,
    #[arg(long)]
    json: bool,
  },
}

struct Loaded {
  problem: ProblemSpec,
  solution: Option<Solution>,
  evaluation: Option<EvaluationResult>,
}

fn load_optional<T: serde::de::DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>, viewer::Error> {
  path.map(|path| load_json(path)).transpose()
}

impl Inputs {
  fn load(&self) -> anyhow::Result<Loaded> {
    let problem: ProblemSpec = load_json(&self.problem)?;
    let solution: Option<Solution> = load_optional(self.solution.as_deref())?;
    let evaluation = load_optional(self.evaluation.as_deref())?;

    if let Some(solution) = &solution {
      if solution.placements.len() != problem.musicians.len() {
        tracing::warn!(
          placements = solution.placements.len(),
          musicians = problem.musicians.len(),
          "solution does not place every musician"
        );
      }
    }

    Ok(Loaded { problem, solution, evaluation })
  }
}

fn main() -> Result<(), anyhow::Error> {
  dotenvy::dotenv().ok();
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli: Cli = Cli::parse();

  match cli.command {
    Commands::Render { inputs, rendering, pixels } => {
      let loaded = inputs.load()?;
      render::run_app(loaded.problem, loaded.solution, loaded.evaluation, rendering.option(), pixels);
    }
    Commands::Snapshot { inputs, rendering, output, pixels } => {
      let loaded = inputs.load()?;
      let option = rendering.option();
      let scene = Scene {
        problem: &loaded.problem,
        solution: loaded.solution.as_ref(),
        evaluation: loaded.evaluation.as_ref(),
        option: &option,
      };
      snapshot::write_png(&scene, pixels, &output)?;
    }
    Commands::Inspect { inputs, kind, index, locked, json } => {
      let loaded = inputs.load()?;
      let other: fn(usize) -> Item = match kind {
        ItemKind::Attendee => Item::musician,
        ItemKind::Musician => Item::attendee,
      };
      let option = RenderingOption { locked_item: locked.map(other), ..Default::default() };
      let scene = Scene {
        problem: &loaded.problem,
        solution: loaded.solution.as_ref(),
        evaluation: loaded.evaluation.as_ref(),
        option: &option,
      };
      let item = Item { kind, index };
      let info = inspect::describe(&scene, item).with_context(|| format!("no {kind:?} with index {index}"))?;
      if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
      } else {
        println!("{info}");
      }
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;

  #[test]
  fn cli_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn rendering_flags_build_options() {
    let cli = Cli::try_parse_from([
      "icfp-2023-viewer",
      "snapshot",
      "problem.json",
      "--output",
      "out.png",
      "--taste-instrument",
      "2",
      "--no-attendee-heatmap",
      "--palette",
      "rainbow",
    ])
    .unwrap();

    let Commands::Snapshot { rendering, pixels, .. } = cli.command else { panic!("expected snapshot") };
    let option = rendering.option();
    assert_eq!(option.taste_heatmap_instrument, Some(Instrument(2)));
    assert!(!option.score_heatmap_attendees);
    assert!(!option.score_heatmap_musicians);
    assert_eq!(option.palette, Palette::Rainbow);
    assert_eq!(pixels, 2000);
  }

  #[test]
  fn inspect_takes_a_kind() {
    let cli = Cli::try_parse_from(["icfp-2023-viewer", "inspect", "p.json", "--kind", "musician", "--index", "4"]).unwrap();
    let Commands::Inspect { kind, index, locked, .. } = cli.command else { panic!("expected inspect") };
    assert_eq!((kind, index, locked), (ItemKind::Musician, 4, None));
  }
}
