use bevy::math::DVec2;

use crate::models::{Dimension, Position};
use crate::surface::{Rgba, Surface, SurfaceRect};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
  pub color: Rgba,
  pub width: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Style {
  pub fill: Option<Rgba>,
  pub stroke: Option<Stroke>,
}

impl Style {
  pub fn fill(color: Rgba) -> Self {
    Self { fill: Some(color), stroke: None }
  }

  pub fn stroke(color: Rgba, width: f64) -> Self {
    Self { fill: None, stroke: Some(Stroke { color, width }) }
  }
}

/// Circle radius, either scaling with zoom or fixed on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radius {
  Problem(Dimension),
  Surface(f64),
}

/// `origin` is the problem-space bottom-left corner.
pub fn draw_rect<S: Surface + ?Sized>(
  surface: &mut S,
  vp: &Viewport,
  origin: Position,
  width: Dimension,
  height: Dimension,
  style: &Style,
) {
  // The problem-space bottom edge is the lower edge on the surface too, so
  // the surface top-left sits one height above it.
  let rect = SurfaceRect {
    origin: DVec2::new(vp.to_surface_x(origin.x), vp.to_surface_y(origin.y) - vp.to_surface_scale(height)),
    size: DVec2::new(vp.to_surface_scale(width), vp.to_surface_scale(height)),
  };

  if let Some(fill) = style.fill {
    surface.fill_rect(rect, fill);
  }
  if let Some(stroke) = style.stroke.filter(|s| s.width > 0.0) {
    surface.stroke_rect(rect, stroke.color, stroke.width);
  }
}

pub fn draw_circle<S: Surface + ?Sized>(
  surface: &mut S,
  vp: &Viewport,
  center: Position,
  radius: Radius,
  style: &Style,
) {
  let center = vp.to_surface(center);
  let radius = match radius {
    Radius::Problem(r) => vp.to_surface_scale(r),
    Radius::Surface(r) => r,
  };

  if let Some(fill) = style.fill {
    surface.fill_circle(center, radius, fill);
  }
  if let Some(stroke) = style.stroke.filter(|s| s.width > 0.0) {
    surface.stroke_circle(center, radius, stroke.color, stroke.width);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::surface::testing::{Op, Recorder};
  use crate::viewport::ViewportState;

  const RED: Rgba = Rgba::rgb(255, 0, 0);

  fn viewport() -> Viewport {
    // 2 surface units per problem unit, problem (0, 0) at surface (0, 4000)
    Viewport::new(ViewportState::new(Position::new(1000.0, 1000.0), 2000.0), 2000.0)
  }

  #[test]
  fn rect_grows_upward_from_bottom_left() {
    let mut rec = Recorder::default();
    draw_rect(&mut rec, &viewport(), Position::new(100.0, 0.0), 300.0, 50.0, &Style::fill(RED));

    let expected = SurfaceRect { origin: DVec2::new(200.0, 3900.0), size: DVec2::new(600.0, 100.0) };
    assert_eq!(rec.ops, vec![Op::FillRect(expected, RED)]);
  }

  #[test]
  fn stroke_needs_a_positive_width() {
    let mut rec = Recorder::default();
    draw_rect(&mut rec, &viewport(), Position::new(0.0, 0.0), 1.0, 1.0, &Style::stroke(RED, 0.0));
    assert!(rec.ops.is_empty());

    draw_rect(&mut rec, &viewport(), Position::new(0.0, 0.0), 1.0, 1.0, &Style::stroke(RED, 10.0));
    assert!(matches!(rec.ops[..], [Op::StrokeRect(_, RED, w)] if w == 10.0));
  }

  #[test]
  fn problem_radius_scales_and_surface_radius_does_not() {
    let mut rec = Recorder::default();
    let vp = viewport();
    draw_circle(&mut rec, &vp, Position::new(1000.0, 1000.0), Radius::Problem(5.0), &Style::fill(RED));
    draw_circle(&mut rec, &vp, Position::new(1000.0, 1000.0), Radius::Surface(5.0), &Style::fill(RED));

    let zoomed = Viewport::new(ViewportState::new(Position::new(1000.0, 1000.0), 1000.0), 2000.0);
    draw_circle(&mut rec, &zoomed, Position::new(1000.0, 1000.0), Radius::Problem(5.0), &Style::fill(RED));
    draw_circle(&mut rec, &zoomed, Position::new(1000.0, 1000.0), Radius::Surface(5.0), &Style::fill(RED));

    let radii: Vec<f64> = rec.fill_circles().iter().map(|(_, r, _)| *r).collect();
    assert_eq!(radii, vec![10.0, 5.0, 20.0, 5.0]);
    assert!(rec.fill_circles().iter().all(|(c, _, _)| *c == DVec2::splat(2000.0)));
  }
}
