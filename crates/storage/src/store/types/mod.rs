#![forbid(unsafe_code)]

mod events;
mod projects;

pub use events::*;
pub use projects::*;
