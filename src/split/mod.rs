pub mod cli;
pub mod commands;
mod chapters;
mod config;
mod description;
mod error;
mod resolver;
mod review;
mod segment;
mod support;
mod timestamp;
mod track;

pub use cli::SplitCommands;
pub use commands::handle_split_command;
