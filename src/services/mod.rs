//! Service layer
//!
//! Infrastructure concerns kept apart from the operation logic.

pub mod format;

pub use format::OutputFormatHandler;
