pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod debounce;
pub mod flows;
pub mod model;
pub mod output;
pub mod query;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
