pub mod draw;
pub mod error;
pub mod heat;
pub mod hit;
pub mod inspect;
pub mod interaction;
pub mod models;
pub mod options;
pub mod render;
pub mod scene;
pub mod snapshot;
pub mod surface;
pub mod viewport;

pub use error::Error;
