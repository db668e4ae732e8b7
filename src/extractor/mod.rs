//! Post-download extraction: hand downloaded sources to a text generation
//! service together with a description of what to pull out of them.

mod gemini;
mod notebook;

pub use gemini::GeminiExtractor;
pub use notebook::{convert_notebooks, notebook_to_python};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Anything that turns a prompt into generated text.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Relative to the collected directory.
    pub path: PathBuf,
    pub content: String,
}

/// Parse a comma separated extension list such as `.py,js`.
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Read every UTF-8 file under `dir`, optionally limited to `extensions`.
/// Notebooks are skipped; convert them first.
pub fn collect_sources(dir: &Path, extensions: Option<&[String]>) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if ext == "ipynb" {
            continue;
        }
        if let Some(allowed) = extensions {
            if !allowed.iter().any(|a| *a == ext) {
                continue;
            }
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            debug!("Skipping non-text file {}", path.display());
            continue;
        };
        let relative = path.strip_prefix(dir).unwrap_or(path).to_path_buf();
        sources.push(SourceFile {
            path: relative,
            content,
        });
    }
    Ok(sources)
}

pub fn build_prompt(remark: &str, sources: &[SourceFile]) -> String {
    let mut prompt = format!(
        "Extract the following from the source files below: {}\n\
         Return only the extracted code or text, without commentary.\n\n",
        remark.trim()
    );
    for source in sources {
        prompt.push_str(&format!(
            "File: {}\n```\n{}\n```\n\n",
            source.path.display(),
            source.content.trim_end()
        ));
    }
    prompt
}

/// Convert notebooks and collect sources. Blocking; see [`extract_from_dir`].
fn prepare_sources(dir: &Path, extensions: Option<&[String]>) -> Result<Vec<SourceFile>> {
    let converted = convert_notebooks(dir)?;
    if !converted.is_empty() {
        debug!("Converted {} notebooks", converted.len());
    }
    collect_sources(dir, extensions)
}

/// Convert notebooks, collect sources and run them through `extractor`.
/// The directory walk runs on the blocking pool.
pub async fn extract_from_dir(
    extractor: &dyn Extractor,
    dir: &Path,
    remark: &str,
    extensions: Option<&[String]>,
) -> Result<String> {
    let owned_dir = dir.to_path_buf();
    let owned_extensions = extensions.map(<[String]>::to_vec);
    let sources = tokio::task::spawn_blocking(move || prepare_sources(&owned_dir, owned_extensions.as_deref()))
        .await
        .map_err(|e| Error::Extraction(format!("reading sources failed: {}", e)))??;

    if sources.is_empty() {
        return Err(Error::Extraction(format!(
            "no matching source files under {}",
            dir.display()
        )));
    }
    debug!("Extracting from {} files", sources.len());

    extractor.generate(&build_prompt(remark, &sources)).await
}
