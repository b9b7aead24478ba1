// Crate root library declaration and module exports.
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod dates;
pub mod model;
pub mod present;
pub mod reachability;
pub mod segment;
