//! Camera state over problem space and its mapping onto the square drawing surface.
//!
//! Problem space has Y growing upward, the surface has Y growing downward. The
//! camera is the problem-space `center` of the surface and the problem-space
//! `size` of its side.

use bevy::math::DVec2;

use crate::models::{Dimension, Position, ProblemSpec, Solution};

/// Side of the square drawing surface, in surface units.
pub const SURFACE_SIZE: f64 = 4000.0;

/// Problem-space padding added around the fitted scene.
pub const FIT_MARGIN: Dimension = 100.0;

pub const ZOOM_OUT: f64 = 1.2;
pub const ZOOM_IN: f64 = 0.8;

// always ensure you end up with sane values
const MIN_SIZE: Dimension = 1e-3;
const MAX_SIZE: Dimension = 1e9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
  pub center: Position,
  pub size: Dimension,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportAction {
  /// Scale `size`, keeping `center`.
  Zoom { factor: f64 },
  /// Scale `size`, keeping the problem point under `anchor` (surface units) in place.
  ZoomAt { factor: f64, anchor: DVec2 },
  /// Commit a pending pan: `offset` is the camera shift in surface units.
  Pan { offset: DVec2 },
}

impl ViewportState {
  pub fn new(center: Position, size: Dimension) -> Self {
    Self { center, size: size.clamp(MIN_SIZE, MAX_SIZE) }
  }

  /// Fits stage, attendees and placements into the surface with [`FIT_MARGIN`].
  pub fn fit(problem: &ProblemSpec, solution: Option<&Solution>) -> Self {
    let stage = problem.stage_origin();
    let corners = [
      stage,
      Position::new(stage.x + problem.stage_width, stage.y + problem.stage_height),
    ];

    let points = corners.iter()
      .chain(problem.attendees.iter().map(|a| &a.position))
      .chain(solution.into_iter().flat_map(move |s| s.placed(problem).map(|(_, _, p)| p)));

    let (mut min, mut max) = (Position::new(f64::MAX, f64::MAX), Position::new(f64::MIN, f64::MIN));
    for p in points {
      min.x = min.x.min(p.x);
      min.y = min.y.min(p.y);
      max.x = max.x.max(p.x);
      max.y = max.y.max(p.y);
    }

    let center = Position::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    // The surface is square, so the larger of the width-fit and height-fit wins.
    let size = (max.x - min.x).max(max.y - min.y) + FIT_MARGIN;

    tracing::info!(x = center.x, y = center.y, size, "fitted viewport");
    Self::new(center, size)
  }

  /// Pure reducer. Invalid zoom factors leave the state unchanged.
  pub fn apply(self, action: ViewportAction) -> Self {
    match action {
      ViewportAction::Zoom { factor } => {
        if !valid_factor(factor) {
          return self;
        }
        Self::new(self.center, self.size * factor)
      }
      ViewportAction::ZoomAt { factor, anchor } => {
        if !valid_factor(factor) {
          return self;
        }
        let from_center = anchor - DVec2::splat(SURFACE_SIZE / 2.0);
        let anchored = Position::new(
          self.center.x + from_center.x * self.size / SURFACE_SIZE,
          self.center.y - from_center.y * self.size / SURFACE_SIZE,
        );
        let size = (self.size * factor).clamp(MIN_SIZE, MAX_SIZE);
        let center = Position::new(
          anchored.x - from_center.x * size / SURFACE_SIZE,
          anchored.y + from_center.y * size / SURFACE_SIZE,
        );
        tracing::debug!(size, x = center.x, y = center.y, "zoomed at cursor");
        Self { center, size }
      }
      ViewportAction::Pan { offset } => {
        let center = Position::new(
          self.center.x + offset.x * self.size / SURFACE_SIZE,
          self.center.y - offset.y * self.size / SURFACE_SIZE,
        );
        tracing::debug!(x = center.x, y = center.y, "pan committed");
        Self { center, size: self.size }
      }
    }
  }
}

fn valid_factor(factor: f64) -> bool {
  factor.is_finite() && factor > 0.0
}

/// Transform between problem space and the surface for one camera state,
/// including any pending (uncommitted) pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
  state: ViewportState,
  room_height: Dimension,
  pending: DVec2,
}

impl Viewport {
  pub fn new(state: ViewportState, room_height: Dimension) -> Self {
    Self { state, room_height, pending: DVec2::ZERO }
  }

  pub fn with_pending(mut self, pending: DVec2) -> Self {
    self.pending = pending;
    self
  }

  pub fn state(&self) -> ViewportState {
    self.state
  }

  pub fn to_surface_scale(&self, problem_length: Dimension) -> f64 {
    problem_length * SURFACE_SIZE / self.state.size
  }

  pub fn to_problem_scale(&self, surface_length: f64) -> Dimension {
    surface_length * self.state.size / SURFACE_SIZE
  }

  pub fn to_surface_x(&self, x: Dimension) -> f64 {
    let origin = self.to_surface_scale(self.state.center.x) - SURFACE_SIZE / 2.0;
    self.to_surface_scale(x) - origin - self.pending.x
  }

  pub fn to_surface_y(&self, y: Dimension) -> f64 {
    let origin = self.to_surface_scale(self.room_height - self.state.center.y) - SURFACE_SIZE / 2.0;
    self.to_surface_scale(self.room_height - y) - origin - self.pending.y
  }

  pub fn to_surface(&self, p: Position) -> DVec2 {
    DVec2::new(self.to_surface_x(p.x), self.to_surface_y(p.y))
  }

  pub fn to_problem_x(&self, sx: f64) -> Dimension {
    let origin = self.to_surface_scale(self.state.center.x) - SURFACE_SIZE / 2.0;
    self.to_problem_scale(sx + self.pending.x + origin)
  }

  pub fn to_problem_y(&self, sy: f64) -> Dimension {
    let origin = self.to_surface_scale(self.room_height - self.state.center.y) - SURFACE_SIZE / 2.0;
    self.room_height - self.to_problem_scale(sy + self.pending.y + origin)
  }

  pub fn to_problem(&self, s: DVec2) -> Position {
    Position::new(self.to_problem_x(s.x), self.to_problem_y(s.y))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::tests::{example_problem, example_solution};
  use proptest::prelude::*;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
  }

  #[test]
  fn center_maps_to_surface_middle() {
    let vp = Viewport::new(ViewportState::new(Position::new(300.0, 700.0), 1000.0), 5000.0);
    let s = vp.to_surface(Position::new(300.0, 700.0));
    assert!(close(s.x, SURFACE_SIZE / 2.0));
    assert!(close(s.y, SURFACE_SIZE / 2.0));
  }

  #[test]
  fn problem_up_is_surface_up() {
    let vp = Viewport::new(ViewportState::new(Position::new(0.0, 0.0), 1000.0), 500.0);
    let low = vp.to_surface(Position::new(0.0, 0.0));
    let high = vp.to_surface(Position::new(0.0, 100.0));
    assert!(high.y < low.y);
    assert!(close(low.y - high.y, 400.0));
  }

  #[test]
  fn zooming_out_three_times_composes() {
    let mut state = ViewportState::new(Position::new(123.0, -45.0), 1000.0);
    for _ in 0..3 {
      state = state.apply(ViewportAction::Zoom { factor: ZOOM_OUT });
    }
    assert!(close(state.size, 1728.0));
    assert_eq!(state.center, Position::new(123.0, -45.0));
  }

  #[test]
  fn invalid_zoom_factor_is_ignored() {
    let state = ViewportState::new(Position::new(0.0, 0.0), 10.0);
    assert_eq!(state.apply(ViewportAction::Zoom { factor: 0.0 }), state);
    assert_eq!(state.apply(ViewportAction::Zoom { factor: f64::NAN }), state);
    let anchor = DVec2::new(1.0, 1.0);
    assert_eq!(state.apply(ViewportAction::ZoomAt { factor: -1.0, anchor }), state);
  }

  #[test]
  fn pan_commit_moves_center_against_drag() {
    let state = ViewportState::new(Position::new(500.0, 500.0), 2000.0);
    // Dragging right by 400 and down by 200 surface units.
    let (dx, dy) = (400.0, 200.0);
    let committed = state.apply(ViewportAction::Pan { offset: DVec2::new(-dx, -dy) });

    let vp = Viewport::new(state, 1000.0);
    assert!(close(committed.center.x, 500.0 - vp.to_problem_scale(dx)));
    assert!(close(committed.center.y, 500.0 + vp.to_problem_scale(dy)));
    assert!(close(committed.center.x, 300.0));
    assert!(close(committed.center.y, 600.0));
  }

  #[test]
  fn pending_pan_renders_like_committed_pan() {
    let state = ViewportState::new(Position::new(500.0, 500.0), 2000.0);
    let offset = DVec2::new(-120.0, 75.0);
    let pending = Viewport::new(state, 1000.0).with_pending(offset);
    let committed = Viewport::new(state.apply(ViewportAction::Pan { offset }), 1000.0);

    let p = Position::new(321.0, 654.0);
    let (a, b) = (pending.to_surface(p), committed.to_surface(p));
    assert!(close(a.x, b.x));
    assert!(close(a.y, b.y));
  }

  #[test]
  fn fit_contains_scene() {
    let problem = example_problem();
    let solution = example_solution();
    let state = ViewportState::fit(&problem, Some(&solution));
    let vp = Viewport::new(state, problem.room_height);

    // x spans 100..1500, y spans 0..1000
    assert!(close(state.size, 1000.0 + FIT_MARGIN + 400.0));
    assert_eq!(state.center, Position::new(800.0, 500.0));
    for a in &problem.attendees {
      let s = vp.to_surface(a.position);
      assert!((0.0..=SURFACE_SIZE).contains(&s.x));
      assert!((0.0..=SURFACE_SIZE).contains(&s.y));
    }
  }

  #[test]
  fn fit_ignores_placements_without_a_musician() {
    let problem = example_problem();
    let mut solution = example_solution();
    let fitted = ViewportState::fit(&problem, Some(&solution));

    solution.placements.push(Position::new(90_000.0, 90_000.0));
    assert_eq!(ViewportState::fit(&problem, Some(&solution)), fitted);
  }

  #[test]
  fn fit_without_attendees_still_has_positive_size() {
    let mut problem = example_problem();
    problem.attendees.clear();
    problem.stage_width = 0.0;
    problem.stage_height = 0.0;

    let state = ViewportState::fit(&problem, None);
    assert!(state.size > 0.0);
    assert_eq!(state.center, Position::new(500.0, 0.0));
  }

  proptest! {
    #[test]
    fn surface_round_trip(
      cx in -1e4f64..1e4, cy in -1e4f64..1e4, size in 1.0f64..1e5,
      px in -1e4f64..1e4, py in -1e4f64..1e4,
      ox in -500f64..500.0, oy in -500f64..500.0,
    ) {
      let vp = Viewport::new(ViewportState::new(Position::new(cx, cy), size), 5000.0)
        .with_pending(DVec2::new(ox, oy));
      let back = vp.to_problem(vp.to_surface(Position::new(px, py)));
      // Absolute error is bounded by the magnitudes flowing through the transform.
      let scale = px.abs().max(py.abs()).max(cx.abs()).max(cy.abs()).max(5000.0).max(size);
      prop_assert!((back.x - px).abs() <= 1e-9 * scale);
      prop_assert!((back.y - py).abs() <= 1e-9 * scale);
    }

    #[test]
    fn zoom_keeps_anchor_fixed(
      cx in -1e4f64..1e4, cy in -1e4f64..1e4, size in 10.0f64..1e5,
      ax in 0f64..SURFACE_SIZE, ay in 0f64..SURFACE_SIZE,
      factor in 0.01f64..4.99,
    ) {
      let state = ViewportState::new(Position::new(cx, cy), size);
      let before = Viewport::new(state, 1000.0).to_problem(DVec2::new(ax, ay));
      let zoomed = state.apply(ViewportAction::ZoomAt { factor, anchor: DVec2::new(ax, ay) });
      let after = Viewport::new(zoomed, 1000.0).to_surface(before);
      prop_assert!((after.x - ax).abs() <= 1e-6);
      prop_assert!((after.y - ay).abs() <= 1e-6);
    }
  }
}
