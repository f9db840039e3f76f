//! pointmark - keypoint annotation editor
//!
//! A browser canvas editor for placing named keypoints on a raster image and
//! exporting them in the image's native pixel coordinates. The editing core
//! (viewport, keypoint store, interaction state machine, label codec) is
//! platform independent; the browser glue and the local static server are
//! compiled per target.

pub mod config;
pub mod constants;
pub mod coords;
pub mod error;
pub mod format;
pub mod input;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod remote;
pub mod render;
pub mod session;
pub mod store;
pub mod viewport;

pub use error::EditorError;
pub use session::EditorSession;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod wasm_canvas;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;
