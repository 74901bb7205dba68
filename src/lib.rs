//! Plan which wells of a 96-well plate belong to which experimental
//! category, then draw the plate or export it.

pub mod about;
pub mod engine;
pub mod engine_shell;
pub mod error;
pub mod export;
pub mod registry;
pub mod resolver;

pub use plate_protocol;
pub use plate_render;
