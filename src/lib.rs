#![forbid(unsafe_code)]

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod narrative;
pub mod sheet;
pub mod sources;
pub mod store;
pub mod text;
