//! Rendering interface
//!
//! The matrix/shader pipeline lives outside this crate. Bodies only need a
//! renderer that accepts a single precision model-view transform and
//! triangle data, plus a way to guarantee that whatever one body does to the
//! ambient transform is undone before its siblings draw.

pub mod commands;
pub mod renderer;

pub use commands::{DrawCommand, RecordingRenderer};
pub use renderer::{Renderer, TransformScope};
