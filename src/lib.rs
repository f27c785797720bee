pub mod cli;
pub mod config;
pub mod error;
pub mod importer;
pub mod parser;
pub mod pipeline;
pub mod scanner;
pub mod sheet;
pub mod store;
