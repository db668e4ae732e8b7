use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

#[derive(Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: Source,
}

/// nbformat allows a cell's source as one string or a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Default for Source {
    fn default() -> Self {
        Source::Text(String::new())
    }
}

impl Source {
    fn joined(&self) -> String {
        match self {
            Source::Lines(lines) => lines.concat(),
            Source::Text(text) => text.clone(),
        }
    }
}

/// Render a notebook's code cells as a Python script.
pub fn notebook_to_python(raw: &str) -> Result<String> {
    let notebook: Notebook = serde_json::from_str(raw)?;
    let mut script = String::new();
    let code_cells = notebook.cells.iter().filter(|c| c.cell_type == "code");
    for (n, cell) in code_cells.enumerate() {
        let source = cell.source.joined();
        if source.trim().is_empty() {
            continue;
        }
        script.push_str(&format!("# In[{}]:\n\n{}\n\n", n + 1, source.trim_end()));
    }
    Ok(script)
}

/// Write a `.py` sibling for every notebook under `dir`. Existing scripts are
/// left alone. Returns the paths written.
pub fn convert_notebooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "ipynb") {
            continue;
        }

        let target = path.with_extension("py");
        if target.exists() {
            debug!("{} already exists, not converting", target.display());
            continue;
        }

        let raw = std::fs::read_to_string(path)?;
        match notebook_to_python(&raw) {
            Ok(script) => {
                std::fs::write(&target, script)?;
                debug!("Converted {} to {}", path.display(), target.display());
                written.push(target);
            }
            Err(e) => warn!("Could not convert notebook {}: {}", path.display(), e),
        }
    }
    Ok(written)
}
