use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::{ClasspathEntry, ClasspathError};

/// How a JDK ships its platform classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JdkLayout {
    /// JDK 9+: one `.jmod` per module under `jmods/`.
    Jmods(PathBuf),
    /// JDK 8 and earlier: a single `rt.jar`.
    RtJar(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdkInstallation {
    root: PathBuf,
    layout: JdkLayout,
}

#[derive(Debug, Error)]
pub enum JdkDiscoveryError {
    #[error("could not discover a JDK installation (tried JAVA_HOME and `java` on PATH)")]
    NotFound,

    #[error("JDK root `{root}` contains neither `jmods/` nor `lib/rt.jar`")]
    UnsupportedLayout { root: PathBuf },
}

impl JdkInstallation {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &JdkLayout {
        &self.layout
    }

    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, JdkDiscoveryError> {
        let root = root.as_ref().to_path_buf();
        match detect_layout(&root) {
            Some(layout) => Ok(Self { root, layout }),
            None => Err(JdkDiscoveryError::UnsupportedLayout { root }),
        }
    }

    /// Discover a JDK installation.
    ///
    /// An explicit `home` always wins (and is an error if it is not a usable
    /// JDK). Otherwise `JAVA_HOME` is tried, then `java` on `PATH`.
    pub fn discover(home: Option<&Path>) -> Result<Self, JdkDiscoveryError> {
        if let Some(home) = home {
            let candidate = coerce_to_jdk_root(home.to_path_buf()).unwrap_or_else(|| home.to_path_buf());
            return Self::from_root(candidate);
        }

        discover_from_java_home()
            .or_else(discover_from_java_on_path)
            .and_then(|root| Self::from_root(root).ok())
            .ok_or(JdkDiscoveryError::NotFound)
    }

    /// Classpath entries for the platform classes, `java.base` first.
    pub fn platform_entries(&self) -> Result<Vec<ClasspathEntry>, ClasspathError> {
        match &self.layout {
            JdkLayout::RtJar(path) => Ok(vec![ClasspathEntry::Jar(path.clone())]),
            JdkLayout::Jmods(dir) => {
                let read_dir = std::fs::read_dir(dir).map_err(|e| ClasspathError::io(dir, e))?;
                let mut module_paths: Vec<PathBuf> = read_dir
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.extension().is_some_and(|ext| ext == "jmod"))
                    .collect();

                module_paths.sort_by_key(|p| {
                    let file_name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    (file_name != "java.base.jmod", file_name.to_owned())
                });

                Ok(module_paths.into_iter().map(ClasspathEntry::Jmod).collect())
            }
        }
    }
}

fn detect_layout(root: &Path) -> Option<JdkLayout> {
    let jmods = root.join("jmods");
    if jmods.is_dir() {
        return Some(JdkLayout::Jmods(jmods));
    }

    ["jre/lib/rt.jar", "lib/rt.jar"]
        .into_iter()
        .map(|rel| root.join(rel))
        .find(|p| p.is_file())
        .map(JdkLayout::RtJar)
}

fn discover_from_java_home() -> Option<PathBuf> {
    std::env::var_os("JAVA_HOME")
        .map(PathBuf::from)
        .and_then(coerce_to_jdk_root)
}

fn discover_from_java_on_path() -> Option<PathBuf> {
    discover_from_java_command().or_else(discover_from_java_symlink)
}

fn discover_from_java_command() -> Option<PathBuf> {
    let output = Command::new("java")
        .args(["-XshowSettings:properties", "-version"])
        .output()
        .ok()?;

    // HotSpot prints settings to stderr, but we accept both.
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    let java_home = java_home_from_settings(&combined)?;
    coerce_to_jdk_root(PathBuf::from(java_home))
}

fn java_home_from_settings(settings: &str) -> Option<&str> {
    settings.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        (k.trim() == "java.home").then(|| v.trim())
    })
}

fn discover_from_java_symlink() -> Option<PathBuf> {
    let java_bin = find_java_on_path()?.canonicalize().ok()?;
    let root = java_bin.parent()?.parent()?.to_path_buf();
    coerce_to_jdk_root(root)
}

fn find_java_on_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let exe_name = if cfg!(windows) { "java.exe" } else { "java" };

    std::env::split_paths(&path_var)
        .map(|dir| dir.join(exe_name))
        .find(|candidate| candidate.is_file())
}

fn coerce_to_jdk_root(mut candidate: PathBuf) -> Option<PathBuf> {
    // `java.home` may point at `$JDK/jre` on older installations.
    if detect_layout(&candidate).is_some() {
        return Some(candidate);
    }

    candidate.pop();
    detect_layout(&candidate).is_some().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_java_home_from_settings_dump() {
        let dump = "Property settings:\n    file.encoding = UTF-8\n    java.home = /opt/jdk-21\n    java.vendor = X\n";
        assert_eq!(java_home_from_settings(dump), Some("/opt/jdk-21"));
        assert_eq!(java_home_from_settings("nothing here"), None);
    }

    #[test]
    fn detects_jmods_and_rt_jar_layouts() {
        let tmp = tempfile::TempDir::new().unwrap();

        let modern = tmp.path().join("jdk-21");
        std::fs::create_dir_all(modern.join("jmods")).unwrap();
        std::fs::write(modern.join("jmods/java.sql.jmod"), b"").unwrap();
        std::fs::write(modern.join("jmods/java.base.jmod"), b"").unwrap();
        std::fs::write(modern.join("jmods/README"), b"").unwrap();

        let install = JdkInstallation::from_root(&modern).unwrap();
        assert!(matches!(install.layout(), JdkLayout::Jmods(_)));
        let entries = install.platform_entries().unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| e.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["java.base.jmod", "java.sql.jmod"]);

        let legacy = tmp.path().join("jdk8");
        std::fs::create_dir_all(legacy.join("jre/lib")).unwrap();
        std::fs::write(legacy.join("jre/lib/rt.jar"), b"").unwrap();
        let install = JdkInstallation::from_root(&legacy).unwrap();
        assert_eq!(
            install.platform_entries().unwrap(),
            vec![ClasspathEntry::Jar(legacy.join("jre/lib/rt.jar"))]
        );
    }

    #[test]
    fn explicit_jre_home_is_coerced_to_jdk_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().join("jdk");
        std::fs::create_dir_all(root.join("jmods")).unwrap();
        std::fs::create_dir_all(root.join("jre")).unwrap();

        let install = JdkInstallation::discover(Some(root.join("jre").as_path())).unwrap();
        assert_eq!(install.root(), root.as_path());
    }

    #[test]
    fn explicit_home_without_platform_classes_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = JdkInstallation::discover(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, JdkDiscoveryError::UnsupportedLayout { .. }));
    }
}
