// File: ./src/model/mod.rs
pub mod datetime;
pub mod item;
pub mod parser;
pub mod transcript;

pub use item::{ParsedTask, Priority, TaskKind, TaskStatus};
