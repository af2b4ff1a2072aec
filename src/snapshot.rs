use std::path::Path;

use crate::error::Error;
use crate::scene::{self, Pointer, Scene};
use crate::surface::Raster;
use crate::viewport::{Viewport, ViewportState};

/// Renders the scene once with the fitted camera and no pointer.
pub fn render_snapshot(scene: &Scene, pixels: u32) -> Raster {
  let state = ViewportState::fit(scene.problem, scene.solution);
  let vp = Viewport::new(state, scene.problem.room_height);
  let mut raster = Raster::new(pixels);
  scene::render(&mut raster, scene, &vp, Pointer::default());
  raster
}

pub fn write_png(scene: &Scene, pixels: u32, path: &Path) -> Result<(), Error> {
  let raster = render_snapshot(scene, pixels);
  raster.save_png(path)?;
  tracing::info!(path = %path.display(), pixels, "wrote snapshot");
  Ok(())
}
