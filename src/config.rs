use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Overrides the platform data directory when set.
pub(crate) const DATA_DIR_ENV: &str = "BUDGET_TRACKER_DIR";

const EXPENSES_FILE: &str = "expenses.json";
const BUDGETS_FILE: &str = "budgets.json";

/// Where the tracker keeps its files.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory and make sure it exists.
    pub(crate) fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        Self::at(&data_dir)
    }

    pub(crate) fn at(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;
        tracing::debug!("using data directory {}", data_dir.display());
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub(crate) fn expenses_path(&self) -> PathBuf {
        self.data_dir.join(EXPENSES_FILE)
    }

    pub(crate) fn budgets_path(&self) -> PathBuf {
        self.data_dir.join(BUDGETS_FILE)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "budget-tracker", "BudgetTracker")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
