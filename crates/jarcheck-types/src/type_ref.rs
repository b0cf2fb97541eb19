use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Char,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }
}

/// A reference to a type by structure: primitive, `void`, array, or a
/// fully-qualified binary name.
///
/// Two `Named` refs with equal names denote the same type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Void,
    Array(Box<TypeRef>),
    Named(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array_of(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    /// Java source-style name: `int`, `void`, `java.lang.String[][]`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// The component type, one dimension down. `None` for non-arrays.
    pub fn component_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(component) => Some(component),
            _ => None,
        }
    }

    /// The innermost non-array type.
    pub fn element_type(&self) -> &TypeRef {
        let mut ty = self;
        while let TypeRef::Array(component) = ty {
            ty = component;
        }
        ty
    }

    /// Parse a source-style name. Internal separators (`a/b/C`) are accepted
    /// and normalized to dots.
    pub fn parse_source_name(input: &str) -> Result<Self, InvalidTypeName> {
        let trimmed = input.trim();
        let mut base = trimmed;
        let mut dims = 0usize;
        while let Some(rest) = base.strip_suffix("[]") {
            base = rest.trim_end();
            dims += 1;
        }

        if base.is_empty() || base.contains(['[', ']']) || base.chars().any(char::is_whitespace) {
            return Err(InvalidTypeName(input.to_string()));
        }

        let mut ty = if base == "void" {
            if dims > 0 {
                return Err(InvalidTypeName(input.to_string()));
            }
            TypeRef::Void
        } else if let Some(primitive) = PrimitiveType::from_keyword(base) {
            TypeRef::Primitive(primitive)
        } else {
            let dotted = base.replace('/', ".");
            if dotted.starts_with('.') || dotted.ends_with('.') || dotted.contains("..") {
                return Err(InvalidTypeName(input.to_string()));
            }
            TypeRef::Named(dotted)
        };

        for _ in 0..dims {
            ty = TypeRef::array_of(ty);
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.keyword()),
            TypeRef::Void => f.write_str("void"),
            TypeRef::Array(component) => write!(f, "{component}[]"),
            TypeRef::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for TypeRef {
    type Err = InvalidTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_source_name(s)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type name `{0}`")]
pub struct InvalidTypeName(pub String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_source_names() {
        assert_eq!(
            TypeRef::parse_source_name("int").unwrap(),
            TypeRef::Primitive(PrimitiveType::Int)
        );
        assert_eq!(TypeRef::parse_source_name("void").unwrap(), TypeRef::Void);
        assert_eq!(
            TypeRef::parse_source_name("com/example/Foo$Inner").unwrap(),
            TypeRef::named("com.example.Foo$Inner")
        );
        assert_eq!(
            "com.example.Bar[][]".parse::<TypeRef>().unwrap(),
            TypeRef::array_of(TypeRef::array_of(TypeRef::named("com.example.Bar")))
        );
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "[]", "void[]", "a..b", ".a", "a b", "a[]b", "a[[]"] {
            assert!(TypeRef::parse_source_name(bad).is_err(), "accepted `{bad}`");
        }
    }

    #[test]
    fn display_round_trips_through_source_names() {
        let ty = TypeRef::array_of(TypeRef::Primitive(PrimitiveType::Byte));
        assert_eq!(ty.name(), "byte[]");
        assert_eq!(TypeRef::parse_source_name(&ty.name()).unwrap(), ty);
    }

    #[test]
    fn element_type_unwraps_every_dimension() {
        let ty = TypeRef::array_of(TypeRef::array_of(TypeRef::named("a.B")));
        assert!(ty.is_array());
        assert_eq!(
            ty.component_type(),
            Some(&TypeRef::array_of(TypeRef::named("a.B")))
        );
        assert_eq!(ty.element_type(), &TypeRef::named("a.B"));
        assert_eq!(TypeRef::Void.component_type(), None);
    }
}
