use std::fmt;

use serde::Serialize;

use crate::models::{Instrument, Item, ItemKind, Position};
use crate::scene::Scene;

/// What the dashboard shows for a hovered or locked entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemInfo {
  pub item: Item,
  pub position: Option<Position>,
  pub instrument: Option<Instrument>,
  pub score: Option<f64>,
  /// Score towards (or from) the locked item, when one of the other kind is locked.
  pub locked_score: Option<f64>,
  /// Taste between this item and the locked item of the other kind.
  pub locked_taste: Option<f64>,
}

/// `None` when the item does not exist in the problem.
pub fn describe(scene: &Scene, item: Item) -> Option<ItemInfo> {
  let problem = scene.problem;
  let eval = scene.evaluation;
  let locked = scene.option.locked_item.filter(|l| l.kind != item.kind);

  match item.kind {
    ItemKind::Attendee => {
      let attendee = problem.attendees.get(item.index)?;
      let locked_instrument = locked.and_then(|l| problem.musicians.get(l.index).copied());
      Some(ItemInfo {
        item,
        position: Some(attendee.position),
        instrument: None,
        score: eval.and_then(|e| e.attendees.get(item.index).copied()),
        locked_score: locked.and(eval).and_then(|e| e.detailed_attendees.get(item.index).copied()),
        locked_taste: locked_instrument.map(|inst| attendee.taste(inst)),
      })
    }
    ItemKind::Musician => {
      let instrument = *problem.musicians.get(item.index)?;
      let locked_attendee = locked.and_then(|l| problem.attendees.get(l.index));
      Some(ItemInfo {
        item,
        position: scene.position_of(item),
        instrument: Some(instrument),
        score: eval.and_then(|e| e.musicians.get(item.index).copied()),
        locked_score: locked.and(eval).and_then(|e| e.detailed_musicians.get(item.index).copied()),
        locked_taste: locked_attendee.map(|a| a.taste(instrument)),
      })
    }
  }
}

impl fmt::Display for ItemInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.item.kind {
      ItemKind::Attendee => "attendee",
      ItemKind::Musician => "musician",
    };
    write!(f, "{kind} {}", self.item.index)?;
    if let Some(pos) = self.position {
      write!(f, " at ({}, {})", pos.x, pos.y)?;
    }
    if let Some(inst) = self.instrument {
      write!(f, ", instrument {}", inst.0)?;
    }
    if let Some(score) = self.score {
      write!(f, ", score {score}")?;
    }
    if let Some(score) = self.locked_score {
      write!(f, ", locked score {score}")?;
    }
    if let Some(taste) = self.locked_taste {
      write!(f, ", locked taste {taste}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::tests::{example_problem, example_solution};
  use crate::models::EvaluationResult;
  use crate::options::RenderingOption;

  #[test]
  fn musician_with_locked_attendee() {
    let problem = example_problem();
    let solution = example_solution();
    let evaluation = EvaluationResult {
      musicians: vec![10.0, 20.0, 30.0],
      detailed_musicians: vec![1.0, 2.0, 3.0],
      ..Default::default()
    };
    let option = RenderingOption { locked_item: Some(Item::attendee(0)), ..Default::default() };
    let scene = Scene { problem: &problem, solution: Some(&solution), evaluation: Some(&evaluation), option: &option };

    let info = describe(&scene, Item::musician(1)).unwrap();
    assert_eq!(info.position, Some(Position::new(1100.0, 100.0)));
    assert_eq!(info.instrument, Some(Instrument(1)));
    assert_eq!(info.score, Some(20.0));
    assert_eq!(info.locked_score, Some(2.0));
    assert_eq!(info.locked_taste, Some(-1000.0));
    assert_eq!(
      info.to_string(),
      "musician 1 at (1100, 100), instrument 1, score 20, locked score 2, locked taste -1000"
    );
  }

  #[test]
  fn same_kind_lock_has_no_cross_score() {
    let problem = example_problem();
    let option = RenderingOption { locked_item: Some(Item::attendee(1)), ..Default::default() };
    let scene = Scene { problem: &problem, solution: None, evaluation: None, option: &option };

    let info = describe(&scene, Item::attendee(2)).unwrap();
    assert_eq!(info.locked_taste, None);
    assert_eq!(info.score, None);
    assert_eq!(info.to_string(), "attendee 2 at (1100, 800)");
  }

  #[test]
  fn unknown_items_are_none() {
    let problem = example_problem();
    let option = RenderingOption::default();
    let scene = Scene { problem: &problem, solution: None, evaluation: None, option: &option };
    assert_eq!(describe(&scene, Item::attendee(99)), None);
    // musicians exist without a solution, just without a position
    assert_eq!(describe(&scene, Item::musician(0)).unwrap().position, None);
  }
}
