pub mod aggregate;
pub mod app;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod grid;
pub mod loader;
pub mod mount;
pub mod output;
pub mod pages;
pub mod router;
pub mod runner;
pub mod utils;

#[cfg(test)]
mod tests;
