//! Nearest-entity hit testing for hover.
//!
//! Candidates are visited attendees first, then musicians, each by ascending
//! index; only a strictly closer entity replaces the current best, so exact
//! ties resolve to the first visited.

use crate::models::{Dimension, Item, Position, ProblemSpec, Solution};

/// Problem-space selection radius. Constant in problem space, so it covers
/// fewer surface pixels as the camera zooms in.
pub const SELECTION_RADIUS: Dimension = 20.0;

/// The globally closest attendee or placed musician and its squared distance.
pub fn closest(problem: &ProblemSpec, solution: Option<&Solution>, at: Position) -> Option<(Item, Dimension)> {
  let attendees = problem.attendees.iter()
    .enumerate()
    .map(|(idx, a)| (Item::attendee(idx), &a.position));
  let musicians = solution.into_iter()
    .flat_map(|s| s.placed(problem))
    .map(|(idx, _, pos)| (Item::musician(idx), pos));

  let mut best: Option<(Item, Dimension)> = None;
  for (item, pos) in attendees.chain(musicians) {
    let d2 = pos.distance_squared(&at);
    if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
      best = Some((item, d2));
    }
  }
  best
}

/// The closest entity within `radius` of the pointer; nothing when no pointer is tracked.
pub fn hit_test(
  problem: &ProblemSpec,
  solution: Option<&Solution>,
  at: Option<Position>,
  radius: Dimension,
) -> Option<Item> {
  let (item, d2) = closest(problem, solution, at?)?;
  (d2 <= radius * radius).then_some(item)
}

/// Remembers the last reported hover so only transitions are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTracker {
  current: Option<Item>,
}

impl HoverTracker {
  pub fn current(&self) -> Option<Item> {
    self.current
  }

  /// `Some(new)` when the hovered identity changed, `None` otherwise.
  pub fn update(&mut self, next: Option<Item>) -> Option<Option<Item>> {
    if next == self.current {
      return None;
    }
    tracing::trace!(from = ?self.current, to = ?next, "hover changed");
    self.current = next;
    Some(next)
  }
}
