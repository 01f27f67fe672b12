//! Rendering pipeline.

pub mod frame;
pub mod renderer;

pub use frame::Frame;
