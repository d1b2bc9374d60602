//! the loaded hcl documents of a workspace
//!
//! Every document is split into its top level blocks and attributes. Blocks are numbered in
//! load order across all documents; that number is how the rest of the crate refers to a
//! block. Each block remembers the file it came from for diagnostics.
use hcl::{Attribute, Block, Body, Structure};
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct Located<T> {
    file: usize,
    item: T,
}

#[derive(Default, Debug)]
pub struct HclDocuments {
    files: Vec<Option<PathBuf>>,
    blocks: Vec<Located<Block>>,
    attributes: Vec<Located<Attribute>>,
}

impl HclDocuments {
    /// Add a parsed document; `path` only shows up in diagnostics
    pub fn add(&mut self, body: Body, path: Option<PathBuf>) {
        let file = self.files.len();
        self.files.push(path);

        for structure in body {
            match structure {
                Structure::Block(item) => self.blocks.push(Located { file, item }),
                Structure::Attribute(item) => self.attributes.push(Located { file, item }),
            }
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Blocks with their number, in load order
    pub fn blocks(&self) -> impl Iterator<Item = (usize, &Block)> + '_ {
        self.blocks.iter().map(|located| &located.item).enumerate()
    }

    /// # Panics
    /// Panics if `index` was not handed out by [HclDocuments::blocks]
    pub fn block(&self, index: usize) -> &Block {
        &self.blocks[index].item
    }

    /// Locations of top level attributes, e.g. `version (main.hcl)`
    pub fn stray_attributes(&self) -> impl Iterator<Item = String> + '_ {
        self.attributes
            .iter()
            .map(|located| self.locate(located.item.key.as_str(), located.file))
    }

    /// Location of a block, e.g. `panel.stat.requests (panels.hcl)`
    pub fn describe_block(&self, index: usize) -> String {
        let Located { file, item } = &self.blocks[index];
        let name = std::iter::once(item.identifier.as_str())
            .chain(item.labels.iter().map(|label| label.as_str()))
            .collect::<Vec<_>>()
            .join(".");

        self.locate(&name, *file)
    }

    fn locate(&self, name: &str, file: usize) -> String {
        match &self.files[file] {
            Some(path) => format!("{name} ({})", path.display()),
            None => name.to_string(),
        }
    }
}

impl HclDocuments {
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let read = |source| LoadError::Read {
            path: path.to_owned(),
            source,
        };
        let path = path.canonicalize().map_err(read)?;
        tracing::info!(path = %path.display(), "loading file");

        let text = std::fs::read_to_string(&path).map_err(read)?;
        let body = hcl::parse(&text).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })?;

        self.add(body, Some(path));
        Ok(())
    }

    /// Load the `*.hcl` files of a directory (not recursive), ordered by file name
    pub fn load_directory(&mut self, dir: &Path) -> Result<(), LoadError> {
        let read = |source| LoadError::Read {
            path: dir.to_owned(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read)? {
            let entry = entry.map_err(read)?;
            let path = entry.path();
            let is_hcl = path.extension().is_some_and(|extension| extension == "hcl");
            if is_hcl && entry.file_type().map_err(read)?.is_file() {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(LoadError::NoFiles {
                path: dir.to_owned(),
            });
        }

        // read_dir order is platform dependent and panel ids follow load order
        files.sort();
        files.iter().try_for_each(|file| self.load_file(file))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("{}: no .hcl files found", path.display())]
    NoFiles { path: PathBuf },
    #[error("{}: unable to read", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: unable to parse hcl", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: hcl::Error,
    },
}

impl From<Body> for HclDocuments {
    fn from(body: Body) -> Self {
        let mut documents = HclDocuments::default();
        documents.add(body, None);
        documents
    }
}

/// Build [HclDocuments] from hcl source text
///
/// A single document without a path:
/// ```
/// # use gdash::hcl_documents;
/// let documents = hcl_documents!(r#"panel "text" "readme" { title = "Readme" }"#);
/// assert_eq!(documents.file_count(), 1);
/// ```
///
/// Several documents, each with a path used in diagnostics:
/// ```
/// # use gdash::hcl_documents;
/// let documents = hcl_documents! {
///   "panels.hcl" => r#"panel "text" "readme" {}"#,
///   "dashboards.hcl" => r#"dashboard "home" {}"#
/// };
/// assert_eq!(documents.describe_block(1), "dashboard.home (dashboards.hcl)");
/// ```
///
/// # Panics
/// Panics if a document does not parse
///
/// ```should_panic
/// # use gdash::hcl_documents;
/// hcl_documents!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! hcl_documents {
    { $($path:literal => $source:expr),+ $(,)? } => {{
        let mut documents = $crate::documents::HclDocuments::default();
        $(
            documents.add(
                hcl::parse($source).expect("document must parse"),
                Some(std::path::PathBuf::from($path)),
            );
        )+
        documents
    }};
    { $source:expr } => {
        $crate::documents::HclDocuments::from(hcl::parse($source).expect("document must parse"))
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blocks_and_attributes_are_separated() {
        let documents = hcl_documents! {r#"
        attr_1 = 1
        panel "text" "one" {}
        dashboard "two" {}
        attr_2 = 2
        "#};

        assert_eq!(documents.blocks().count(), 2);
        assert_eq!(documents.block(1).identifier.as_str(), "dashboard");
        assert_eq!(
            documents.stray_attributes().collect::<Vec<_>>(),
            vec!["attr_1", "attr_2"]
        );
    }

    #[test]
    fn blocks_are_numbered_across_documents() {
        let documents = hcl_documents! {
            "a.hcl" => "defaults {}\nversion = 2",
            "b.hcl" => r#"panel "stat" "requests" {}"#
        };

        assert_eq!(documents.file_count(), 2);
        assert_eq!(documents.describe_block(0), "defaults (a.hcl)");
        assert_eq!(documents.describe_block(1), "panel.stat.requests (b.hcl)");
        assert_eq!(
            documents.stray_attributes().collect::<Vec<_>>(),
            vec!["version (a.hcl)"]
        );
    }

    #[test]
    fn directories_load_hcl_files_by_name() {
        let dir = std::env::temp_dir().join(format!("gdash-documents-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.hcl"), r#"dashboard "home" {}"#).unwrap();
        std::fs::write(dir.join("a.hcl"), r#"panel "text" "readme" {}"#).unwrap();
        std::fs::write(dir.join("notes.txt"), "not hcl").unwrap();

        let mut documents = HclDocuments::default();
        documents.load_directory(&dir).unwrap();

        let identifiers: Vec<&str> = documents
            .blocks()
            .map(|(_, block)| block.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["panel", "dashboard"]);
        assert_eq!(documents.file_count(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_directories_are_an_error() {
        let dir = std::env::temp_dir().join(format!("gdash-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let err = HclDocuments::default().load_directory(&dir).unwrap_err();
        assert!(matches!(err, LoadError::NoFiles { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
