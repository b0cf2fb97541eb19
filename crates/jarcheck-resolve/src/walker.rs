use std::collections::HashSet;

use jarcheck_types::{DirectoryError, TypeDirectory, TypeRef, TypeShape};
use thiserror::Error;

use crate::verdict::{MissingDependency, ReferenceSite, ResolutionVerdict, SiteKind};

/// Longest superclass chain walked before the input is treated as malformed.
pub const MAX_SUPERCLASS_DEPTH: usize = 1024;

/// Faults that prevent a verdict from being produced at all.
///
/// An unresolved dependency is never an error; it is a
/// [`ResolutionVerdict::Missing`].
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("cannot describe `{name}`")]
    Undescribable {
        name: String,
        #[source]
        source: DirectoryError,
    },
    #[error("superclass chain of `{entry}` revisits `{repeated}`")]
    SuperclassCycle { entry: String, repeated: String },
    #[error("superclass chain of `{entry}` exceeds {MAX_SUPERCLASS_DEPTH} links")]
    SuperclassChainTooDeep { entry: String },
    #[error("`{owner}` declares non-class superclass `{superclass}`")]
    InvalidSuperclass { owner: String, superclass: String },
}

/// Whether `ty` resolves in `directory`.
///
/// Primitives and `void` always resolve; arrays resolve iff their component
/// does; everything else is a lookup by name.
pub fn is_resolvable<D: TypeDirectory + ?Sized>(ty: &TypeRef, directory: &D) -> bool {
    match ty {
        TypeRef::Primitive(_) | TypeRef::Void => true,
        TypeRef::Array(component) => is_resolvable(component, directory),
        TypeRef::Named(name) => directory.resolve(name),
    }
}

/// Check that every type structurally reachable from `entry` resolves.
///
/// `entry` must already be known to the directory; resolving the entry point
/// is the caller's job. Checks run fields, then methods (parameters before the
/// return type), then the superclass, each in declaration order, and the first
/// unresolved reference under that order is reported. Nothing is memoized: a
/// type referenced twice is looked up twice.
pub fn check_dependencies<D: TypeDirectory + ?Sized>(
    entry: &str,
    directory: &D,
) -> Result<ResolutionVerdict, WalkError> {
    let mut chain: HashSet<String> = HashSet::new();
    let mut current = entry.to_string();

    loop {
        if chain.len() >= MAX_SUPERCLASS_DEPTH {
            return Err(WalkError::SuperclassChainTooDeep {
                entry: entry.to_string(),
            });
        }
        if !chain.insert(current.clone()) {
            return Err(WalkError::SuperclassCycle {
                entry: entry.to_string(),
                repeated: current,
            });
        }

        let shape = directory
            .describe(&current)
            .map_err(|source| WalkError::Undescribable {
                name: current.clone(),
                source,
            })?;

        tracing::debug!(
            target: "jarcheck.resolve",
            class = %shape.name,
            depth = chain.len() - 1,
            fields = shape.fields.len(),
            methods = shape.methods.len(),
            "checking declared members"
        );

        if let Some(missing) = first_unresolved_member(&shape, directory) {
            return Ok(report(entry, missing));
        }

        let Some(superclass) = shape.superclass else {
            return Ok(ResolutionVerdict::Satisfied);
        };

        if !is_resolvable(&superclass, directory) {
            let missing = MissingDependency {
                type_name: superclass.element_type().name(),
                site: ReferenceSite {
                    owner: shape.name,
                    kind: SiteKind::Superclass,
                },
            };
            return Ok(report(entry, missing));
        }

        match superclass {
            TypeRef::Named(name) => current = name,
            other => {
                return Err(WalkError::InvalidSuperclass {
                    owner: shape.name,
                    superclass: other.name(),
                })
            }
        }
    }
}

fn first_unresolved_member<D: TypeDirectory + ?Sized>(
    shape: &TypeShape,
    directory: &D,
) -> Option<MissingDependency> {
    let missing = |ty: &TypeRef, kind: SiteKind| MissingDependency {
        type_name: ty.element_type().name(),
        site: ReferenceSite {
            owner: shape.name.clone(),
            kind,
        },
    };

    for field in &shape.fields {
        if !is_resolvable(&field.ty, directory) {
            return Some(missing(
                &field.ty,
                SiteKind::Field {
                    name: field.name.clone(),
                },
            ));
        }
    }

    for method in &shape.methods {
        for (index, param) in method.parameter_types.iter().enumerate() {
            if !is_resolvable(param, directory) {
                return Some(missing(
                    param,
                    SiteKind::Parameter {
                        method: method.name.clone(),
                        index,
                    },
                ));
            }
        }
        if !is_resolvable(&method.return_type, directory) {
            return Some(missing(
                &method.return_type,
                SiteKind::Return {
                    method: method.name.clone(),
                },
            ));
        }
    }

    None
}

fn report(entry: &str, missing: MissingDependency) -> ResolutionVerdict {
    tracing::debug!(
        target: "jarcheck.resolve",
        entry,
        missing = %missing.type_name,
        site = %missing.site,
        "unresolved dependency"
    );
    ResolutionVerdict::Missing(missing)
}
