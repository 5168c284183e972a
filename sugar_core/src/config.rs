use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SugarError;
use crate::SugarResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["sugar.toml", ".sugar.toml"];

/// Configuration loaded from a `sugar.toml` file.
///
/// ```toml
/// input = "site/templates/**/*.kirby"
/// out_dir = "site/dist"
/// exclude = ["vendor/**"]
/// ```
///
/// Every value is optional and CLI flags take precedence over it.
#[derive(Debug, Default, Deserialize)]
pub struct SugarConfig {
	/// Glob pattern selecting the template files to compile, relative to the
	/// project root.
	#[serde(default)]
	pub input: Option<String>,
	/// Directory compiled files are written to, relative to the project
	/// root. When absent, output is written next to each input file.
	#[serde(default)]
	pub out_dir: Option<PathBuf>,
	/// Glob patterns for files to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl SugarConfig {
	/// Find the first existing config file at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> SugarResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = toml::from_str(&content).map_err(|e| SugarError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}
