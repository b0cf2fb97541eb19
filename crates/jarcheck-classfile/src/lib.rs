#![forbid(unsafe_code)]

mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;

pub use crate::classfile::{ClassFile, ClassMember};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};

/// Convert an internal name (`java/util/Map$Entry`) to a binary name
/// (`java.util.Map$Entry`).
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Convert a binary name (`java.util.Map$Entry`) to an internal name
/// (`java/util/Map$Entry`).
pub fn binary_to_internal(binary: &str) -> String {
    binary.replace('.', "/")
}
