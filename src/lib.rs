// Public library interface for dendroview-rs
// The viewer and the debug CLI both build on these modules

pub mod app;
pub mod config;
pub mod error;
pub mod layout;
pub mod render;
pub mod tree;
pub mod ui;

pub use error::{Error, Result};
