pub mod alerts;
pub mod chatlog;
pub mod config;
pub mod coordinator;
pub mod idle;
pub mod log_io;
pub mod model;
pub mod tracker;

#[cfg(test)]
mod sim_test;
