//! Type directory over an ordered classpath of JARs, JMODs and class
//! directories.
//!
//! [`ClasspathIndex::build`] reads and parses every classfile up front, so all
//! bundle I/O and format errors surface at construction. Afterwards the index
//! is immutable and answers [`TypeDirectory`] queries from memory.

mod jdk;
mod shape;

use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use jarcheck_classfile::ClassFile;
use jarcheck_types::{DirectoryError, TypeDirectory, TypeShape};

pub use jdk::{JdkDiscoveryError, JdkInstallation, JdkLayout};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("classpath entry {path} does not exist")]
    MissingEntry { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("malformed classfile {member} in {path}: {source}")]
    ClassFile {
        path: PathBuf,
        member: String,
        #[source]
        source: jarcheck_classfile::Error,
    },
}

impl ClasspathError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ClasspathError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn zip(path: &Path, source: zip::result::ZipError) -> Self {
        ClasspathError::Zip {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
    Jmod(PathBuf),
}

impl ClasspathEntry {
    /// Infer the entry kind from a path: directories are exploded class
    /// directories, `.jmod` files are JMODs, anything else is read as a zip.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            ClasspathEntry::ClassDir(path)
        } else if path.extension() == Some(OsStr::new("jmod")) {
            ClasspathEntry::Jmod(path)
        } else {
            ClasspathEntry::Jar(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) | ClasspathEntry::Jmod(p) => p,
        }
    }
}

#[derive(Clone, Debug)]
struct IndexedClass {
    shape: TypeShape,
    /// Position of the providing entry in `ClasspathIndex::entries`.
    origin: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ClasspathIndex {
    entries: Vec<ClasspathEntry>,
    classes: HashMap<String, IndexedClass>,
    binary_names_sorted: Vec<String>,
}

impl ClasspathIndex {
    /// Index `entries` in order. When the same binary name appears in more
    /// than one entry, the earliest entry wins.
    pub fn build(entries: &[ClasspathEntry]) -> Result<Self, ClasspathError> {
        let mut classes: HashMap<String, IndexedClass> = HashMap::new();

        for (origin, entry) in entries.iter().enumerate() {
            let shapes = index_entry(entry)?;
            let indexed = shapes.len();
            let mut shadowed = 0usize;

            for shape in shapes {
                if classes.contains_key(&shape.name) {
                    shadowed += 1;
                    tracing::trace!(
                        target: "jarcheck.classpath",
                        class = %shape.name,
                        path = %entry.path().display(),
                        "class shadowed by an earlier classpath entry"
                    );
                    continue;
                }
                classes.insert(shape.name.clone(), IndexedClass { shape, origin });
            }

            tracing::debug!(
                target: "jarcheck.classpath",
                path = %entry.path().display(),
                classes = indexed,
                shadowed,
                "indexed classpath entry"
            );
        }

        let mut binary_names_sorted: Vec<String> = classes.keys().cloned().collect();
        binary_names_sorted.sort();

        Ok(Self {
            entries: entries.to_vec(),
            classes,
            binary_names_sorted,
        })
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Look up a class by binary (`a.b.C`) or internal (`a/b/C`) name.
    pub fn lookup(&self, name: &str) -> Option<&TypeShape> {
        self.classes.get(normalize_name(name).as_ref()).map(|c| &c.shape)
    }

    /// The entry that provided `name`.
    pub fn origin(&self, name: &str) -> Option<&ClasspathEntry> {
        let class = self.classes.get(normalize_name(name).as_ref())?;
        self.entries.get(class.origin)
    }

    /// All indexed binary names in lexicographic order.
    pub fn iter_binary_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.binary_names_sorted.iter().map(String::as_str)
    }
}

impl TypeDirectory for ClasspathIndex {
    fn resolve(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn describe(&self, name: &str) -> Result<TypeShape, DirectoryError> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                name: name.to_string(),
            })
    }
}

fn normalize_name(name: &str) -> Cow<'_, str> {
    if name.contains('/') {
        Cow::Owned(name.replace('/', "."))
    } else {
        Cow::Borrowed(name)
    }
}

fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

fn parse_class(path: &Path, member: &str, bytes: &[u8]) -> Result<Option<TypeShape>, ClasspathError> {
    let wrap = |source| ClasspathError::ClassFile {
        path: path.to_path_buf(),
        member: member.to_string(),
        source,
    };

    let cf = ClassFile::parse(bytes).map_err(wrap)?;
    if is_ignored_class(&cf.this_class) {
        return Ok(None);
    }
    shape::shape_from_classfile(&cf).map(Some).map_err(wrap)
}

fn index_entry(entry: &ClasspathEntry) -> Result<Vec<TypeShape>, ClasspathError> {
    let path = entry.path();
    if !path.exists() {
        return Err(ClasspathError::MissingEntry {
            path: path.to_path_buf(),
        });
    }

    match entry {
        ClasspathEntry::ClassDir(dir) => index_class_dir(dir),
        ClasspathEntry::Jar(path) => index_jar(path),
        ClasspathEntry::Jmod(path) => index_jmod(path),
    }
}

fn index_class_dir(dir: &Path) -> Result<Vec<TypeShape>, ClasspathError> {
    let mut out = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            ClasspathError::Io {
                path,
                source: err.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension() != Some(OsStr::new("class")) {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        if rel.starts_with("META-INF") {
            continue;
        }

        let bytes = std::fs::read(entry.path()).map_err(|e| ClasspathError::io(entry.path(), e))?;
        let member = rel.to_string_lossy();
        if let Some(shape) = parse_class(dir, &member, &bytes)? {
            out.push(shape);
        }
    }
    Ok(out)
}

fn open_zip(path: &Path) -> Result<zip::ZipArchive<std::fs::File>, ClasspathError> {
    let file = std::fs::File::open(path).map_err(|e| ClasspathError::io(path, e))?;
    zip::ZipArchive::new(file).map_err(|e| ClasspathError::zip(path, e))
}

const MAX_PREALLOC: usize = 1 << 20;

fn read_member<R: Read + Seek>(
    path: &Path,
    archive: &mut zip::ZipArchive<R>,
    index: usize,
) -> Result<Option<(String, Vec<u8>)>, ClasspathError> {
    let mut file = archive.by_index(index).map_err(|e| ClasspathError::zip(path, e))?;
    if !file.is_file() || !file.name().ends_with(".class") {
        return Ok(None);
    }
    let name = file.name().to_owned();
    // The header size is untrusted; let `read_to_end` grow past the cap.
    let capacity = usize::try_from(file.size()).map_or(MAX_PREALLOC, |size| size.min(MAX_PREALLOC));
    let mut bytes = Vec::with_capacity(capacity);
    file.read_to_end(&mut bytes)
        .map_err(|e| ClasspathError::io(path, e))?;
    Ok(Some((name, bytes)))
}

fn index_jmod(path: &Path) -> Result<Vec<TypeShape>, ClasspathError> {
    let mut archive = open_zip(path)?;
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let Some((name, bytes)) = read_member(path, &mut archive, i)? else {
            continue;
        };
        // JMODs place class files under `classes/`.
        if !name.starts_with("classes/") {
            continue;
        }
        if let Some(shape) = parse_class(path, &name, &bytes)? {
            out.push(shape);
        }
    }
    Ok(out)
}

fn index_jar(path: &Path) -> Result<Vec<TypeShape>, ClasspathError> {
    let mut archive = open_zip(path)?;
    let is_multi_release = jar_is_multi_release(&mut archive);

    // Multi-release jars keep version-specific classes under
    // `META-INF/versions/<n>/`. Base classes always win; a versioned class is
    // only used when no base class exists, preferring the highest version.
    let mut best: HashMap<String, (u32, TypeShape)> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for i in 0..archive.len() {
        let Some((name, bytes)) = read_member(path, &mut archive, i)? else {
            continue;
        };

        let version = match name.strip_prefix("META-INF/") {
            None => 0,
            Some(_) if !is_multi_release => continue,
            Some(rest) => {
                let Some(versioned) = rest.strip_prefix("versions/") else {
                    continue;
                };
                let Some((version, _)) = versioned.split_once('/') else {
                    continue;
                };
                match version.parse::<u32>() {
                    Ok(v) if v > 0 => v,
                    _ => continue,
                }
            }
        };

        let Some(shape) = parse_class(path, &name, &bytes)? else {
            continue;
        };

        match best.get(&shape.name) {
            None => {
                order.push(shape.name.clone());
                best.insert(shape.name.clone(), (version, shape));
            }
            Some((existing, _)) if *existing == 0 => {}
            Some((existing, _)) => {
                if version == 0 || version > *existing {
                    best.insert(shape.name.clone(), (version, shape));
                }
            }
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|name| best.remove(&name).map(|(_, shape)| shape))
        .collect())
}

fn jar_is_multi_release<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> bool {
    let Ok(mut file) = archive.by_name("META-INF/MANIFEST.MF") else {
        return false;
    };

    let mut manifest = String::new();
    if file.read_to_string(&mut manifest).is_err() {
        return false;
    }

    manifest_is_multi_release(&manifest)
}

fn manifest_is_multi_release(manifest: &str) -> bool {
    manifest.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("Multi-Release")
                && value.trim().eq_ignore_ascii_case("true")
        })
    })
}
