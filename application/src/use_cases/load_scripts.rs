//! Script-set loading — discover and run a directory of scripts.
//!
//! Scripts load in alphabetical order so numbered prefixes control
//! sequencing. A file that fails to load is logged and skipped; the
//! remaining files still run.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ports::script_engine::{ScriptEnginePort, ScriptError};

/// Result of loading a script set.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: Vec<(PathBuf, ScriptError)>,
}

impl LoadSummary {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the `*.lua` files in `dir`, sorted by name.
pub fn discover_scripts(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut scripts: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "lua"))
        .collect();
    scripts.sort();
    Ok(scripts)
}

/// Load each script through the engine, continuing past failures.
pub fn load_scripts(engine: &dyn ScriptEnginePort, paths: &[PathBuf]) -> LoadSummary {
    let mut summary = LoadSummary::default();
    for path in paths {
        match engine.load_script(path) {
            Ok(()) => {
                info!(script = %path.display(), "loaded script");
                summary.loaded += 1;
            }
            Err(err) => {
                warn!(script = %path.display(), error = %err, "skipping script");
                summary.failed.push((path.clone(), err));
            }
        }
    }
    summary
}
