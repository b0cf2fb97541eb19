//! Helpers shared by jarcheck tests: synthesized classfiles, jar fixtures, and
//! serialized access to process environment variables.

mod classfile;
pub mod env;
mod jar;

pub use classfile::ClassFileBuilder;
pub use env::{env_lock, EnvVarGuard};
pub use jar::JarFixture;
