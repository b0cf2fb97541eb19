//! Structural type model shared by the dependency walker and the directories
//! that back it.
//!
//! Nothing here knows about classfiles or archives: a [`TypeDirectory`] is any
//! catalog that can answer "does this fully-qualified name exist" and "what
//! does it declare". [`InMemoryDirectory`] is the trivial implementation used
//! by tests and embedders.

mod directory;
mod type_ref;

pub use directory::{DirectoryError, InMemoryDirectory, TypeDirectory};
pub use type_ref::{InvalidTypeName, PrimitiveType, TypeRef};

use serde::Serialize;

/// A declared field. Only the type participates in resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldShape {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameter_types: Vec<TypeRef>,
    pub return_type: TypeRef,
}

impl MethodSignature {
    pub fn new(
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = TypeRef>,
        return_type: TypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().collect(),
            return_type,
        }
    }
}

/// Structural description of a resolved type, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeShape {
    /// Binary name of the described type (`com.example.Foo$Inner`).
    pub name: String,
    pub fields: Vec<FieldShape>,
    pub methods: Vec<MethodSignature>,
    /// `None` only for the root of a hierarchy.
    pub superclass: Option<TypeRef>,
}

impl TypeShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
            superclass: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldShape {
            name: name.into(),
            ty,
        });
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(TypeRef::named(name));
        self
    }
}
