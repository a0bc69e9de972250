#![forbid(unsafe_code)]

mod delete;
mod insert;
mod maintenance;
mod moves;
mod read;
mod setters;
mod system;
