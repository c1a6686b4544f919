pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod state;
