//! Library wrapper around the `jarcheck` binary so `cargo test --lib`
//! typechecks the CLI without building the integration suite.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
