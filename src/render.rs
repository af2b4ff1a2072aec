use bevy::app::AppExit;
use bevy::input::mouse::{MouseButtonInput, MouseScrollUnit, MouseWheel};
use bevy::input::ButtonState;
use bevy::log::LogPlugin;
use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow, WindowCloseRequested};

use crate::inspect;
use crate::interaction::{Controller, Detach, DisplayRect, FrameInput, InputOrder, ViewEvent};
use crate::models::{EvaluationResult, ProblemSpec, Solution};
use crate::options::RenderingOption;
use crate::scene::{self, Scene};
use crate::surface::Raster;
use crate::viewport::ViewportState;

const TITLE: &str = "ICFP 2023 viewer";

#[derive(Component)]
struct SurfaceSprite;

#[derive(Resource)]
struct LiveConfig {
  pixels: u32,
}

#[derive(Resource)]
struct Canvas {
  raster: Raster,
  image: Handle<Image>,
}

/// Everything the host owns: inputs, camera state and the lock.
#[derive(Resource)]
struct Session {
  problem: ProblemSpec,
  solution: Option<Solution>,
  evaluation: Option<EvaluationResult>,
  option: RenderingOption,
  viewport: ViewportState,
  controller: Controller,
  detach: Detach,
}

impl Session {
  fn split(&mut self) -> (Scene<'_>, &mut Controller, &mut ViewportState) {
    let scene = Scene {
      problem: &self.problem,
      solution: self.solution.as_ref(),
      evaluation: self.evaluation.as_ref(),
      option: &self.option,
    };
    (scene, &mut self.controller, &mut self.viewport)
  }

  fn apply(&mut self, events: Vec<ViewEvent>) {
    for event in events {
      match event {
        ViewEvent::ViewportChanged(state) => self.viewport = state,
        ViewEvent::HoverChanged(hovered) => debug!(?hovered, "hover"),
        ViewEvent::Clicked(item) => self.option.toggle_lock(item),
      }
    }
  }

  fn title(&mut self) -> String {
    let (scene, controller, _) = self.split();
    let item = controller.hovered().or(scene.option.locked_item);
    match (item.and_then(|item| inspect::describe(&scene, item)), scene.evaluation) {
      (Some(info), _) => info.to_string(),
      (None, Some(eval)) => format!("{TITLE} - score {}", eval.score),
      (None, None) => TITLE.to_string(),
    }
  }
}

fn setup(
  config: Res<LiveConfig>,
  mut commands: Commands,
  mut images: ResMut<Assets<Image>>,
) {
  commands.spawn(Camera2dBundle::default());

  let raster = Raster::new(config.pixels);
  let size = Extent3d {
    width: raster.pixels(),
    height: raster.pixels(),
    depth_or_array_layers: 1,
  };
  let image = images.add(Image::new_fill(
    size,
    TextureDimension::D2,
    &[255, 255, 255, 255],
    TextureFormat::Rgba8UnormSrgb,
  ));

  commands.spawn((SpriteBundle {
    texture: image.clone(),
    ..default()
  }, SurfaceSprite));

  commands.insert_resource(Canvas { raster, image });
}

// The surface is shown as the largest square centered in the window.
fn fit_sprite(
  windows: Query<&Window, With<PrimaryWindow>>,
  mut sprites: Query<&mut Sprite, With<SurfaceSprite>>,
  mut session: ResMut<Session>,
) {
  let Ok(window) = windows.get_single() else { return };
  let side = window.width().min(window.height());
  for mut sprite in &mut sprites {
    if sprite.custom_size != Some(Vec2::splat(side)) {
      sprite.custom_size = Some(Vec2::splat(side));
    }
  }

  let (w, h, side) = (f64::from(window.width()), f64::from(window.height()), f64::from(side));
  session.controller.set_display(DisplayRect::square((w - side) / 2.0, (h - side) / 2.0, side));
}

fn handle_keys(keys: Res<Input<KeyCode>>, mut session: ResMut<Session>) {
  let session = &mut *session;
  let option = &mut session.option;

  if keys.just_pressed(KeyCode::M) {
    option.score_heatmap_musicians = !option.score_heatmap_musicians;
  }
  if keys.just_pressed(KeyCode::A) {
    option.score_heatmap_attendees = !option.score_heatmap_attendees;
  }
  if keys.just_pressed(KeyCode::B) {
    option.bipolar_heatmap = !option.bipolar_heatmap;
  }
  if keys.just_pressed(KeyCode::T) {
    option.cycle_taste_instrument(&session.problem.instruments());
    info!(instrument = ?option.taste_heatmap_instrument, "taste heatmap");
  }
  if keys.just_pressed(KeyCode::Escape) {
    option.locked_item = None;
  }
  if keys.just_pressed(KeyCode::R) {
    session.viewport = ViewportState::fit(&session.problem, session.solution.as_ref());
  }
}

//https://bevy-cheatbook.github.io/input/mouse.html
fn handle_input(
  windows: Query<&Window, With<PrimaryWindow>>,
  mut moved: EventReader<CursorMoved>,
  mut left: EventReader<CursorLeft>,
  mut buttons: EventReader<MouseButtonInput>,
  mut wheel: EventReader<MouseWheel>,
  mut order: Local<InputOrder>,
  mut session: ResMut<Session>,
) {
  let Ok(window) = windows.get_single() else { return };
  // bevy reports cursor positions from the bottom-left corner
  let height = f64::from(window.height());
  let client = |p: Vec2| DVec2::new(f64::from(p.x), height - f64::from(p.y));

  let mut frame = FrameInput {
    moves: moved.iter().map(|ev| client(ev.position)).collect(),
    left: left.iter().count() > 0,
    ..default()
  };
  for ev in buttons.iter().filter(|ev| ev.button == MouseButton::Left) {
    match ev.state {
      ButtonState::Pressed => frame.pressed = true,
      ButtonState::Released => frame.released = true,
    }
  }
  for ev in wheel.iter() {
    let delta_y = -f64::from(ev.y);
    match ev.unit {
      MouseScrollUnit::Line => frame.wheel_lines.push(delta_y),
      MouseScrollUnit::Pixel => frame.wheel_pixels.push(delta_y),
    }
  }

  for input in order.order(frame) {
    let (scene, controller, viewport) = session.split();
    let events = controller.handle(input, &scene, *viewport);
    session.apply(events);
  }
}

fn draw_frame(
  mut session: ResMut<Session>,
  mut canvas: ResMut<Canvas>,
  mut images: ResMut<Assets<Image>>,
) {
  let (scene, controller, viewport) = session.split();
  if !controller.is_attached() {
    return;
  }
  let hover = controller.refresh_hover(&scene, *viewport);
  let vp = controller.viewport(*viewport, &scene);

  let canvas = &mut *canvas;
  scene::render(&mut canvas.raster, &scene, &vp, controller.pointer());
  if let Some(image) = images.get_mut(&canvas.image) {
    image.data.clear();
    image.data.extend_from_slice(canvas.raster.as_bytes());
  }

  if let Some(event) = hover {
    session.apply(vec![event]);
  }
}

fn update_title(
  mut windows: Query<&mut Window, With<PrimaryWindow>>,
  mut session: ResMut<Session>,
) {
  let Ok(mut window) = windows.get_single_mut() else { return };
  let title = session.title();
  if window.title != title {
    window.title = title;
  }
}

fn teardown(
  mut closed: EventReader<WindowCloseRequested>,
  mut exit: EventReader<AppExit>,
  session: Res<Session>,
) {
  let closing = closed.iter().count() > 0;
  let exiting = exit.iter().count() > 0;
  if closing || exiting {
    session.detach.detach();
  }
}

pub fn run_app(
  problem: ProblemSpec,
  solution: Option<Solution>,
  evaluation: Option<EvaluationResult>,
  option: RenderingOption,
  pixels: u32,
) {
  let viewport = ViewportState::fit(&problem, solution.as_ref());
  let mut controller = Controller::new(DisplayRect::default());
  let detach = controller.attach();

  info!(
    attendees = problem.attendees.len(),
    musicians = problem.musicians.len(),
    pillars = problem.pillars.len(),
    "starting live view"
  );

  App::new()
    // Background Color
    // https://bevy-cheatbook.github.io/window/clear-color.html
    .insert_resource(ClearColor(Color::GRAY))
    .insert_resource(LiveConfig { pixels })
    .insert_resource(Session {
      problem,
      solution,
      evaluation,
      option,
      viewport,
      controller,
      detach,
    })
    .add_plugins(
      DefaultPlugins
        .set(WindowPlugin {
          primary_window: Some(Window {
            title: TITLE.into(),
            resolution: (1000., 1000.).into(),
            ..default()
          }),
          ..default()
        })
        // tracing is installed by the binary
        .disable::<LogPlugin>(),
    )
    .add_startup_system(setup)
    .add_systems((fit_sprite, handle_keys, handle_input, draw_frame, update_title).chain())
    .add_system(teardown)
    .run();
}
