use std::fmt;

use serde::Serialize;

/// Outcome of one dependency check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionVerdict {
    Satisfied,
    Missing(MissingDependency),
}

impl ResolutionVerdict {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ResolutionVerdict::Satisfied)
    }

    /// Name of the first unresolved type, if any.
    pub fn missing_type(&self) -> Option<&str> {
        match self {
            ResolutionVerdict::Satisfied => None,
            ResolutionVerdict::Missing(missing) => Some(&missing.type_name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    /// Binary name of the unresolved type. For array references this is the
    /// element type, never the array notation.
    pub type_name: String,
    pub site: ReferenceSite,
}

/// Where an unresolved reference was declared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReferenceSite {
    /// The class declaring the reference.
    pub owner: String,
    #[serde(flatten)]
    pub kind: SiteKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "site", rename_all = "snake_case")]
pub enum SiteKind {
    Field { name: String },
    Parameter { method: String, index: usize },
    Return { method: String },
    Superclass,
}

impl fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = &self.owner;
        match &self.kind {
            SiteKind::Field { name } => write!(f, "field `{name}` of {owner}"),
            SiteKind::Parameter { method, index } => {
                write!(f, "parameter {index} of {owner}.{method}")
            }
            SiteKind::Return { method } => write!(f, "return type of {owner}.{method}"),
            SiteKind::Superclass => write!(f, "superclass of {owner}"),
        }
    }
}
