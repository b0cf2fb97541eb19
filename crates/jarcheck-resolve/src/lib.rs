//! Dependency closure checks over a [`TypeDirectory`].
//!
//! [`check_dependencies`] walks an entry type's declared field types, method
//! parameter and return types, then repeats for each superclass, stopping at
//! the first reference the directory cannot resolve. The order of that walk is
//! part of the contract: it decides which missing type gets reported.

mod verdict;
mod walker;

pub use verdict::{MissingDependency, ReferenceSite, ResolutionVerdict, SiteKind};
pub use walker::{check_dependencies, is_resolvable, WalkError, MAX_SUPERCLASS_DEPTH};

pub use jarcheck_types::TypeDirectory;
