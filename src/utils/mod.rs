//! Utility modules for the build pipeline.

pub mod date;
pub mod html;
pub mod slug;
