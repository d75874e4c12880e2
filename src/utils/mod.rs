//! Image utilities shared by the operations

pub mod composite;
pub mod resize;

pub use composite::Compositor;
pub use resize::ImageResizer;
