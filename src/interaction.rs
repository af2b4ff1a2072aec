//! Pointer and wheel handling: zoom, drag-to-pan and hover/click reporting.
//!
//! The controller owns only interaction-local state (drag, pending pan,
//! tracked cursor, last hover). Camera state and the locked item belong to the
//! host, which receives [`ViewEvent`]s and feeds the results back in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::math::DVec2;

use crate::hit::{hit_test, HoverTracker, SELECTION_RADIUS};
use crate::models::Item;
use crate::scene::{Pointer, Scene};
use crate::viewport::{Viewport, ViewportAction, ViewportState, SURFACE_SIZE, ZOOM_IN, ZOOM_OUT};

/// Pointer travel (surface units) under which a press and release count as a click.
pub const CLICK_TOLERANCE: f64 = 8.0;

/// Where the surface is displayed, in client coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
  pub left: f64,
  pub top: f64,
  pub width: f64,
  pub height: f64,
}

impl DisplayRect {
  pub fn square(left: f64, top: f64, side: f64) -> Self {
    Self { left, top, width: side, height: side }
  }

  /// Client coordinates to surface units, independent of the displayed size.
  pub fn to_surface(&self, client: DVec2) -> DVec2 {
    DVec2::new(
      (client.x - self.left) * SURFACE_SIZE / self.width.max(f64::EPSILON),
      (client.y - self.top) * SURFACE_SIZE / self.height.max(f64::EPSILON),
    )
  }
}

impl Default for DisplayRect {
  fn default() -> Self {
    Self::square(0.0, 0.0, SURFACE_SIZE)
  }
}

/// Raw input, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
  Down(DVec2),
  Move(DVec2),
  Up(DVec2),
  Leave,
  /// Positive `delta_y` scrolls away from the user and zooms out.
  Wheel { delta_y: f64 },
}

/// Notifications for the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
  ViewportChanged(ViewportState),
  HoverChanged(Option<Item>),
  Clicked(Item),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Drag {
  #[default]
  Idle,
  // `moved` sticks once the pointer has left the click tolerance
  Dragging { start: DVec2, moved: bool },
}

/// Disposer returned by [`Controller::attach`].
#[derive(Debug, Clone)]
pub struct Detach {
  attached: Arc<AtomicBool>,
}

impl Detach {
  /// Returns `true` only for the call that actually detached.
  pub fn detach(&self) -> bool {
    let was = self.attached.swap(false, Ordering::SeqCst);
    if was {
      tracing::debug!("controller detached");
    }
    was
  }
}

#[derive(Debug, Default)]
pub struct Controller {
  display: DisplayRect,
  drag: Drag,
  // camera shift in surface units, not yet committed
  pending: DVec2,
  cursor: Option<DVec2>,
  hover: HoverTracker,
  attached: Arc<AtomicBool>,
}

impl Controller {
  pub fn new(display: DisplayRect) -> Self {
    Self { display, ..Default::default() }
  }

  /// Starts accepting events until any handle returned from here detaches.
  pub fn attach(&mut self) -> Detach {
    self.attached.store(true, Ordering::SeqCst);
    Detach { attached: self.attached.clone() }
  }

  pub fn is_attached(&self) -> bool {
    self.attached.load(Ordering::SeqCst)
  }

  pub fn set_display(&mut self, display: DisplayRect) {
    self.display = display;
  }

  pub fn is_dragging(&self) -> bool {
    matches!(self.drag, Drag::Dragging { .. })
  }

  pub fn hovered(&self) -> Option<Item> {
    self.hover.current()
  }

  pub fn pointer(&self) -> Pointer {
    Pointer { cursor: self.cursor, hovered: self.hover.current() }
  }

  /// The transform to render with: committed camera plus the pending pan.
  pub fn viewport(&self, state: ViewportState, scene: &Scene) -> Viewport {
    Viewport::new(state, scene.problem.room_height).with_pending(self.pending)
  }

  pub fn handle(&mut self, event: PointerEvent, scene: &Scene, state: ViewportState) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    if !self.is_attached() {
      return events;
    }

    match event {
      PointerEvent::Down(client) => {
        let at = self.display.to_surface(client);
        self.cursor = Some(at);
        self.drag = Drag::Dragging { start: at, moved: false };
        self.rehover(scene, state, &mut events);
      }
      PointerEvent::Move(client) => {
        let at = self.display.to_surface(client);
        self.cursor = Some(at);
        if let Drag::Dragging { start, moved } = &mut self.drag {
          self.pending = *start - at;
          *moved |= start.distance(at) > CLICK_TOLERANCE;
        }
        self.rehover(scene, state, &mut events);
      }
      PointerEvent::Up(client) => {
        let at = self.display.to_surface(client);
        self.cursor = Some(at);
        if let Drag::Dragging { start, moved } = self.drag {
          self.commit(state, &mut events);
          if !moved && start.distance(at) <= CLICK_TOLERANCE {
            if let Some(item) = self.hover.current() {
              events.push(ViewEvent::Clicked(item));
            }
          }
        }
      }
      PointerEvent::Leave => {
        if self.is_dragging() {
          self.commit(state, &mut events);
        }
        self.cursor = None;
        if let Some(change) = self.hover.update(None) {
          events.push(ViewEvent::HoverChanged(change));
        }
      }
      PointerEvent::Wheel { delta_y } => {
        if delta_y == 0.0 || !delta_y.is_finite() {
          return events;
        }
        let factor = if delta_y < 0.0 { ZOOM_IN } else { ZOOM_OUT };
        let action = match self.cursor {
          // anchor at what is displayed under the cursor, pending pan included
          Some(cursor) => ViewportAction::ZoomAt { factor, anchor: cursor + self.pending },
          None => ViewportAction::Zoom { factor },
        };
        let zoomed = state.apply(action);
        events.push(ViewEvent::ViewportChanged(zoomed));
        self.rehover(scene, zoomed, &mut events);
      }
    }
    events
  }

  /// Re-runs the hit test for the current camera; call once per frame.
  pub fn refresh_hover(&mut self, scene: &Scene, state: ViewportState) -> Option<ViewEvent> {
    if !self.is_attached() {
      return None;
    }
    let mut events = Vec::with_capacity(1);
    self.rehover(scene, state, &mut events);
    events.pop()
  }

  fn rehover(&mut self, scene: &Scene, state: ViewportState, events: &mut Vec<ViewEvent>) {
    let vp = self.viewport(state, scene);
    let at = self.cursor.map(|c| vp.to_problem(c));
    let hit = hit_test(scene.problem, scene.solution, at, SELECTION_RADIUS);
    if let Some(change) = self.hover.update(hit) {
      events.push(ViewEvent::HoverChanged(change));
    }
  }

  fn commit(&mut self, state: ViewportState, events: &mut Vec<ViewEvent>) {
    if self.pending != DVec2::ZERO {
      let panned = state.apply(ViewportAction::Pan { offset: self.pending });
      events.push(ViewEvent::ViewportChanged(panned));
    }
    self.pending = DVec2::ZERO;
    self.drag = Drag::Idle;
  }
}

/// Trackpad scrolling adds up to one wheel step per this many pixels.
pub const PIXELS_PER_WHEEL_STEP: f64 = 100.0;

/// One frame of raw host input. Windowing hosts deliver it grouped by kind,
/// so the relative order of moves, buttons and leaves is lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
  pub moves: Vec<DVec2>,
  pub pressed: bool,
  pub released: bool,
  pub left: bool,
  /// Wheel notches, positive away from the user.
  pub wheel_lines: Vec<f64>,
  /// Trackpad scroll in pixels, positive away from the user.
  pub wheel_pixels: Vec<f64>,
}

/// Turns grouped [`FrameInput`]s back into an ordered [`PointerEvent`] stream.
#[derive(Debug, Default)]
pub struct InputOrder {
  last: Option<DVec2>,
  scrolled: f64,
}

impl InputOrder {
  /// Leave first, then a press where the pointer was before the moves, the
  /// moves themselves, a release at the final position and the wheel steps.
  pub fn order(&mut self, frame: FrameInput) -> Vec<PointerEvent> {
    let mut events = Vec::new();

    if frame.left {
      events.push(PointerEvent::Leave);
      self.last = None;
    }

    let first = frame.moves.first().copied();
    if frame.pressed {
      if let Some(at) = self.last.or(first) {
        events.push(PointerEvent::Down(at));
      }
    }
    events.extend(frame.moves.iter().copied().map(PointerEvent::Move));
    if let Some(at) = frame.moves.last() {
      self.last = Some(*at);
    }
    if frame.released {
      if let Some(at) = self.last {
        events.push(PointerEvent::Up(at));
      }
    }

    for delta_y in frame.wheel_lines {
      if delta_y != 0.0 {
        self.scrolled = 0.0;
        events.push(PointerEvent::Wheel { delta_y });
      }
    }
    for delta_y in frame.wheel_pixels {
      self.scrolled += delta_y;
      while self.scrolled.abs() >= PIXELS_PER_WHEEL_STEP {
        let step = self.scrolled.signum();
        self.scrolled -= step * PIXELS_PER_WHEEL_STEP;
        events.push(PointerEvent::Wheel { delta_y: step });
      }
    }

    events
  }
}
