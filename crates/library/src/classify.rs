//! Extension to category mapping.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::OptionExt;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Destination subfolder a file is copied into.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    #[display("Datasets_Data")]
    DatasetsData,
    #[display("Notebooks_Scripts")]
    NotebooksScripts,
    #[display("Modelos_IA")]
    ModelosIa,
    #[display("Documentos")]
    Documentos,
    #[display("Imagenes")]
    Imagenes,
    #[display("Videos_Audio")]
    VideosAudio,
    #[display("Comprimidos_Installers")]
    ComprimidosInstallers,
    #[display("Otros")]
    Otros,
}
impl Category {
    pub const ALL: [Category; 8] = [
        Self::DatasetsData,
        Self::NotebooksScripts,
        Self::ModelosIa,
        Self::Documentos,
        Self::Imagenes,
        Self::VideosAudio,
        Self::ComprimidosInstallers,
        Self::Otros,
    ];

    /// Folder name, identical to the [`Display`](std::fmt::Display) output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatasetsData => "Datasets_Data",
            Self::NotebooksScripts => "Notebooks_Scripts",
            Self::ModelosIa => "Modelos_IA",
            Self::Documentos => "Documentos",
            Self::Imagenes => "Imagenes",
            Self::VideosAudio => "Videos_Audio",
            Self::ComprimidosInstallers => "Comprimidos_Installers",
            Self::Otros => "Otros",
        }
    }
}
impl FromStr for Category {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_raise(|| ErrorKind::Classifier(format!("unknown category \"{s}\"")))
    }
}

const BUILT_IN: [(Category, &[&str]); 7] = [
    (Category::DatasetsData, &["csv", "json", "parquet", "xlsx", "xml", "sql", "db"]),
    (Category::NotebooksScripts, &["ipynb", "py", "r", "sh", "bat", "ps1"]),
    (Category::ModelosIa, &["gguf", "pt", "safetensors", "bin", "h5", "onnx", "pkl"]),
    (Category::Documentos, &["pdf", "docx", "txt", "pptx", "md"]),
    (Category::Imagenes, &["jpg", "jpeg", "png", "gif", "svg", "webp", "ico"]),
    (Category::VideosAudio, &["mp4", "avi", "mov", "mkv", "mp3", "wav"]),
    // "tar.gz" is kept for parity with existing configurations, but since
    // only the final suffix is compared it never matches.
    (Category::ComprimidosInstallers, &["zip", "rar", "7z", "tar.gz", "exe", "msi", "iso"]),
];

/// Maps file extensions onto [`Category`] values.
///
/// Every extension maps to at most one category; tables that would assign an
/// extension twice are rejected when the classifier is built, so lookups are
/// deterministic regardless of table order.
#[derive(Clone, Debug)]
pub struct Classifier {
    table: BTreeMap<String, Category>,
}
impl Default for Classifier {
    fn default() -> Self {
        let table = BUILT_IN
            .iter()
            .flat_map(|(category, extensions)| extensions.iter().map(|ext| (normalize(ext), *category)))
            .collect();
        Self { table }
    }
}
impl Classifier {
    /// Builds a classifier from a `category label -> extensions` table such as
    /// the one found in configuration.
    pub fn from_table<'a>(table: impl IntoIterator<Item = (&'a String, &'a Vec<String>)>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (label, extensions) in table {
            let category: Category = label.parse()?;
            for extension in extensions {
                let extension = normalize(extension);
                if extension.is_empty() {
                    exn::bail!(ErrorKind::Classifier(format!("empty extension listed under {category}")));
                }
                if let Some(previous) = map.insert(extension.clone(), category) {
                    exn::bail!(ErrorKind::Classifier(format!(
                        "extension \"{extension}\" listed under both {previous} and {category}"
                    )));
                }
            }
        }
        Ok(Self { table: map })
    }

    /// Category for an extension (with or without its leading dot, any case).
    /// Files without an extension, and unknown extensions, are [`Category::Otros`].
    pub fn classify(&self, extension: Option<&str>) -> Category {
        extension.and_then(|ext| self.table.get(&normalize(ext)).copied()).unwrap_or(Category::Otros)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
