// Application layer and command-line front end.
// Wires domain services to the infrastructure implementations.

pub mod application;
pub mod presentation;

pub use presentation::cli::run;
