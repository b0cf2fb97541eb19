use std::io::Write;
use std::path::Path;

use crate::ClassFileBuilder;

/// In-memory description of a JAR (or JMOD) to be written to disk.
#[derive(Debug, Default, Clone)]
pub struct JarFixture {
    entries: Vec<(String, Vec<u8>)>,
}

impl JarFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class at its natural path (`com/example/Foo.class`).
    pub fn class(self, class: &ClassFileBuilder) -> Self {
        let name = format!("{}.class", class.internal_name());
        self.file(name, class.build())
    }

    /// Add a class under a path prefix, e.g. `classes/` for JMODs or
    /// `META-INF/versions/11/` for multi-release jars.
    pub fn class_under(self, prefix: &str, class: &ClassFileBuilder) -> Self {
        let name = format!("{prefix}{}.class", class.internal_name());
        self.file(name, class.build())
    }

    pub fn manifest(self, text: &str) -> Self {
        self.file("META-INF/MANIFEST.MF", text.as_bytes().to_vec())
    }

    pub fn file(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.push((name.into(), bytes));
        self
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();

        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Write every entry as a loose file below `dir` (an exploded classes
    /// directory).
    pub fn write_exploded(&self, dir: &Path) -> std::io::Result<()> {
        for (name, bytes) in &self.entries {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, bytes)?;
        }
        Ok(())
    }
}
