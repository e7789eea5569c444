pub mod config;
pub mod dimension;
pub mod model;
pub mod report;
pub mod scoring;
