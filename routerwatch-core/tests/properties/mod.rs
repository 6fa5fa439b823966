//! Property test modules

mod config_tests;
mod key_tests;
mod parser_tests;
mod tracing_tests;
