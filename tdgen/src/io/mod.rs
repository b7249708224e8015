//! Side-effecting adapters: config files, child processes and run logs.

pub mod client;
pub mod config;
pub mod iteration_log;
pub mod process;
pub mod test_runner;
