//! One full frame: room, stage, attendees, pillars, musicians, highlights and
//! the cursor readout, in that order.

use bevy::math::DVec2;

use crate::draw::{draw_circle, draw_rect, Radius, Style};
use crate::heat::{instrument_color, HeatScale};
use crate::models::{EvaluationResult, Instrument, Item, ItemKind, Position, ProblemSpec, Solution};
use crate::options::RenderingOption;
use crate::surface::{Rgba, Surface};
use crate::viewport::Viewport;

pub const ATTENDEE_RADIUS: f64 = 10.0;
pub const MUSICIAN_RADIUS: f64 = 5.0;

const BACKGROUND: Rgba = Rgba::WHITE;
const STAGE: Rgba = Rgba::rgb(0xcb, 0xd5, 0xe1);
const ROOM: Rgba = Rgba::rgb(0, 0, 255);
const ROOM_LINE_WIDTH: f64 = 10.0;
const ATTENDEE: Rgba = Rgba::rgb(0x9c, 0xa3, 0xaf);
const PILLAR: Rgba = Rgba::rgb(0x33, 0x41, 0x55);
const HOVER: Rgba = Rgba::rgb(0xf5, 0x9e, 0x0b);
const LOCKED: Rgba = Rgba::BLACK;
const HIGHLIGHT_WIDTH: f64 = 6.0;
const READOUT_ORIGIN: DVec2 = DVec2::new(40.0, 40.0);
const READOUT_HEIGHT: f64 = 64.0;

/// Everything one frame reads. Borrowed from the host each tick.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
  pub problem: &'a ProblemSpec,
  pub solution: Option<&'a Solution>,
  pub evaluation: Option<&'a EvaluationResult>,
  pub option: &'a RenderingOption,
}

/// Per-frame pointer state: the tracked cursor on the surface and the hover.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
  pub cursor: Option<DVec2>,
  pub hovered: Option<Item>,
}

enum AttendeeColoring<'a> {
  Taste(Instrument),
  Score(&'a [f64]),
  Flat,
}

impl<'a> Scene<'a> {
  fn attendee_coloring(&self) -> AttendeeColoring<'a> {
    if let Some(instrument) = self.option.taste_heatmap_instrument {
      return AttendeeColoring::Taste(instrument);
    }
    match self.evaluation {
      Some(eval) if self.option.score_heatmap_attendees => {
        let locked_musician = matches!(self.option.locked_item, Some(Item { kind: ItemKind::Musician, .. }));
        if locked_musician && !eval.detailed_attendees.is_empty() {
          AttendeeColoring::Score(&eval.detailed_attendees)
        } else {
          AttendeeColoring::Score(&eval.attendees)
        }
      }
      _ => AttendeeColoring::Flat,
    }
  }

  fn musician_scores(&self) -> Option<&'a [f64]> {
    let eval = self.evaluation.filter(|_| self.option.score_heatmap_musicians)?;
    let locked_attendee = matches!(self.option.locked_item, Some(Item { kind: ItemKind::Attendee, .. }));
    if locked_attendee && !eval.detailed_musicians.is_empty() {
      Some(&eval.detailed_musicians)
    } else {
      Some(&eval.musicians)
    }
  }

  /// Where an item is drawn, if it exists in this scene.
  pub fn position_of(&self, item: Item) -> Option<Position> {
    match item.kind {
      ItemKind::Attendee => self.problem.attendees.get(item.index).map(|a| a.position),
      ItemKind::Musician => self.solution?
        .placed(self.problem)
        .nth(item.index)
        .map(|(_, _, pos)| *pos),
    }
  }
}

pub fn render<S: Surface + ?Sized>(surface: &mut S, scene: &Scene, vp: &Viewport, pointer: Pointer) {
  let problem = scene.problem;

  surface.clear(BACKGROUND);

  draw_rect(surface, vp, problem.stage_origin(), problem.stage_width, problem.stage_height, &Style::fill(STAGE));
  draw_rect(
    surface,
    vp,
    Position::new(0.0, 0.0),
    problem.room_width,
    problem.room_height,
    &Style::stroke(ROOM, ROOM_LINE_WIDTH),
  );

  draw_attendees(surface, scene, vp);

  for pillar in &problem.pillars {
    draw_circle(surface, vp, pillar.position(), Radius::Problem(pillar.radius), &Style::fill(PILLAR));
  }

  if let Some(solution) = scene.solution {
    draw_musicians(surface, scene, solution, vp);
  }

  if let Some(locked) = scene.option.locked_item {
    draw_highlight(surface, scene, vp, locked, LOCKED);
  }
  if let Some(hovered) = pointer.hovered.filter(|h| Some(*h) != scene.option.locked_item) {
    draw_highlight(surface, scene, vp, hovered, HOVER);
  }

  if let Some(cursor) = pointer.cursor {
    let at = vp.to_problem(cursor);
    surface.fill_text(&format!("({:.1}, {:.1})", at.x, at.y), READOUT_ORIGIN, READOUT_HEIGHT, Rgba::BLACK);
  }
}

fn draw_attendees<S: Surface + ?Sized>(surface: &mut S, scene: &Scene, vp: &Viewport) {
  let attendees = &scene.problem.attendees;
  let bipolar = scene.option.bipolar_heatmap;

  let colors: Vec<Rgba> = match scene.attendee_coloring() {
    AttendeeColoring::Taste(instrument) => {
      let heat = HeatScale::new(attendees.iter().map(|a| a.taste(instrument)), bipolar);
      attendees.iter().map(|a| heat.color(a.taste(instrument))).collect()
    }
    AttendeeColoring::Score(scores) => {
      let value = |idx: usize| scores.get(idx).copied().unwrap_or(0.0);
      let heat = HeatScale::new((0..attendees.len()).map(value), bipolar);
      (0..attendees.len()).map(|idx| heat.color(value(idx))).collect()
    }
    AttendeeColoring::Flat => vec![ATTENDEE; attendees.len()],
  };

  for (attendee, color) in attendees.iter().zip(colors) {
    draw_circle(surface, vp, attendee.position, Radius::Surface(ATTENDEE_RADIUS), &Style::fill(color));
  }
}

fn draw_musicians<S: Surface + ?Sized>(surface: &mut S, scene: &Scene, solution: &Solution, vp: &Viewport) {
  let problem = scene.problem;
  let placed = solution.placed(problem).count();

  let colors: Vec<Rgba> = match scene.musician_scores() {
    Some(scores) => {
      let value = |idx: usize| scores.get(idx).copied().unwrap_or(0.0);
      let heat = HeatScale::new((0..placed).map(value), scene.option.bipolar_heatmap);
      (0..placed).map(|idx| heat.color(value(idx))).collect()
    }
    None => {
      let instruments = problem.instruments();
      solution.placed(problem)
        .map(|(_, inst, _)| instrument_color(scene.option.palette, inst, &instruments))
        .collect()
    }
  };

  for ((_, _, pos), color) in solution.placed(problem).zip(colors) {
    draw_circle(surface, vp, *pos, Radius::Problem(MUSICIAN_RADIUS), &Style::fill(color));
  }
}

fn draw_highlight<S: Surface + ?Sized>(surface: &mut S, scene: &Scene, vp: &Viewport, item: Item, color: Rgba) {
  let Some(pos) = scene.position_of(item) else { return };
  let radius = match item.kind {
    ItemKind::Attendee => Radius::Surface(ATTENDEE_RADIUS + HIGHLIGHT_WIDTH),
    ItemKind::Musician => Radius::Problem(MUSICIAN_RADIUS * 1.6),
  };
  draw_circle(surface, vp, pos, radius, &Style::stroke(color, HIGHLIGHT_WIDTH));
}
