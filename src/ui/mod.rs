pub mod input;
pub mod viewport;
