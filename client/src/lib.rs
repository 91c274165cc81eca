pub mod actions;
mod app;
mod geometry;
pub mod net;
pub mod persistence;
pub mod state;
mod util;

pub use app::MaskEditor;
