use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::TypeShape;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("type `{name}` is not present in the directory")]
    NotFound { name: String },
}

/// Read-only catalog of the types loadable from a fixed set of bundles.
///
/// Implementations are queried by exact fully-qualified binary name. They
/// must not change between calls for the duration of a dependency check; if
/// they are shared across threads they must tolerate concurrent reads.
pub trait TypeDirectory {
    /// Whether `name` can be located.
    fn resolve(&self, name: &str) -> bool;

    /// The declared shape of `name`. Only meaningful after a successful
    /// [`TypeDirectory::resolve`].
    fn describe(&self, name: &str) -> Result<TypeShape, DirectoryError>;
}

impl<T: TypeDirectory + ?Sized> TypeDirectory for &T {
    fn resolve(&self, name: &str) -> bool {
        (**self).resolve(name)
    }

    fn describe(&self, name: &str) -> Result<TypeShape, DirectoryError> {
        (**self).describe(name)
    }
}

impl<T: TypeDirectory + ?Sized> TypeDirectory for Arc<T> {
    fn resolve(&self, name: &str) -> bool {
        (**self).resolve(name)
    }

    fn describe(&self, name: &str) -> Result<TypeShape, DirectoryError> {
        (**self).describe(name)
    }
}

/// A directory backed by a plain map of shapes.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDirectory {
    shapes: HashMap<String, TypeShape>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape. An existing entry with the same name is kept, so the
    /// first registration wins like an ordered classpath.
    pub fn insert(&mut self, shape: TypeShape) -> &mut Self {
        self.shapes.entry(shape.name.clone()).or_insert(shape);
        self
    }

    /// Register a type with no members and no superclass.
    pub fn insert_empty(&mut self, name: impl Into<String>) -> &mut Self {
        self.insert(TypeShape::new(name))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl FromIterator<TypeShape> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = TypeShape>>(iter: I) -> Self {
        let mut dir = Self::new();
        for shape in iter {
            dir.insert(shape);
        }
        dir
    }
}

impl TypeDirectory for InMemoryDirectory {
    fn resolve(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    fn describe(&self, name: &str) -> Result<TypeShape, DirectoryError> {
        self.shapes
            .get(name)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRef;

    #[test]
    fn first_registration_wins() {
        let mut dir = InMemoryDirectory::new();
        dir.insert(TypeShape::new("a.A").with_field("first", TypeRef::named("x.X")));
        dir.insert(TypeShape::new("a.A").with_field("second", TypeRef::named("y.Y")));

        assert_eq!(dir.len(), 1);
        let shape = dir.describe("a.A").unwrap();
        assert_eq!(shape.fields[0].name, "first");
    }

    #[test]
    fn describe_unknown_is_not_found() {
        let dir = InMemoryDirectory::new();
        assert!(!dir.resolve("a.Missing"));
        assert_eq!(
            dir.describe("a.Missing"),
            Err(DirectoryError::NotFound {
                name: "a.Missing".to_string()
            })
        );
    }

    #[test]
    fn references_and_arcs_delegate() {
        fn resolves_a<D: TypeDirectory>(dir: D) -> bool {
            dir.resolve("a.A")
        }

        let dir: InMemoryDirectory = [TypeShape::new("a.A")].into_iter().collect();
        let shared: Arc<dyn TypeDirectory> = Arc::new(dir.clone());
        assert!(resolves_a(&dir));
        assert!(resolves_a(shared.clone()));
        assert!(!shared.resolve("a.B"));
    }
}
