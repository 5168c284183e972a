//! The file-batch layer: collect input templates, compile each one, and
//! write the output next to it or under an output directory.

use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::WalkBuilder;
use tracing::debug;

use crate::SugarConfig;
use crate::SugarError;
use crate::SugarResult;
use crate::transform;

/// Default input pattern when neither the CLI nor the config provides one.
pub const DEFAULT_INPUT_PATTERN: &str = "**/*.kirby";

/// Extension of compiled output files.
pub const OUTPUT_EXTENSION: &str = "php";

/// Options controlling one build: where to look, what to match, where to
/// write.
#[derive(Debug, Clone)]
pub struct BuildOptions {
	/// Project root directory. The input pattern and `out_dir` are resolved
	/// relative to it.
	pub root: PathBuf,
	/// Glob pattern (or plain file path) selecting input templates.
	pub pattern: String,
	/// Output directory relative to the root. `None` writes next to inputs.
	pub out_dir: Option<PathBuf>,
	/// Glob patterns for files to skip.
	pub exclude: Vec<String>,
}

impl BuildOptions {
	/// Construct options from CLI values, falling back to the config and
	/// then to the defaults.
	pub fn new(
		root: PathBuf,
		pattern: Option<String>,
		out_dir: Option<PathBuf>,
		config: Option<&SugarConfig>,
	) -> Self {
		let pattern = pattern
			.or_else(|| config.and_then(|config| config.input.clone()))
			.unwrap_or_else(|| DEFAULT_INPUT_PATTERN.to_string());
		let out_dir = out_dir.or_else(|| config.and_then(|config| config.out_dir.clone()));
		let exclude = config.map(|config| config.exclude.clone()).unwrap_or_default();

		Self {
			root,
			pattern,
			out_dir,
			exclude,
		}
	}
}

/// What happened to one input file during a build.
#[derive(Debug)]
pub struct FileOutcome {
	/// The input template.
	pub file: PathBuf,
	/// Where the compiled output lives.
	pub output: PathBuf,
	/// False when the existing output was already up to date.
	pub written: bool,
}

/// A file that failed to compile. The batch continues past it.
#[derive(Debug)]
pub struct BuildFailure {
	pub file: PathBuf,
	pub error: SugarError,
}

/// Result of one build pass over all matched files.
#[derive(Debug, Default)]
pub struct BuildResult {
	pub outcomes: Vec<FileOutcome>,
	pub failures: Vec<BuildFailure>,
}

impl BuildResult {
	/// Number of files whose output was (re)written.
	pub fn written_count(&self) -> usize {
		self.outcomes.iter().filter(|outcome| outcome.written).count()
	}

	/// True when every matched file compiled.
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> SugarResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			SugarError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}

	builder.build().map_err(|e| {
		SugarError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Collect the input files matching the pattern under the root, respecting
/// `.gitignore`. A pattern naming an existing file selects exactly that
/// file.
pub fn collect_input_files(options: &BuildOptions) -> SugarResult<Vec<PathBuf>> {
	let direct = options.root.join(&options.pattern);
	if direct.is_file() {
		return Ok(vec![direct]);
	}

	let include = build_glob_set(std::slice::from_ref(&options.pattern))?;
	let exclude = build_glob_set(&options.exclude)?;

	let mut files = Vec::new();
	for entry in WalkBuilder::new(&options.root).build() {
		let Ok(entry) = entry else {
			continue;
		};
		let path = entry.path();
		if !path.is_file() {
			continue;
		}
		let Ok(relative) = path.strip_prefix(&options.root) else {
			continue;
		};
		if !include.is_match(relative) || exclude.is_match(relative) {
			continue;
		}
		files.push(path.to_path_buf());
	}
	files.sort();

	debug!(count = files.len(), pattern = %options.pattern, "collected input files");
	Ok(files)
}

/// Derive the output path for an input file: re-rooted under `out_dir` when
/// one is set, with the extension replaced by `.php`.
pub fn output_path(options: &BuildOptions, file: &Path) -> PathBuf {
	let relative = file.strip_prefix(&options.root).unwrap_or(file);
	let target = match &options.out_dir {
		Some(out_dir) => options.root.join(out_dir).join(relative),
		None => file.to_path_buf(),
	};
	target.with_extension(OUTPUT_EXTENSION)
}

/// Compile one file without writing anything. Returns the target path and
/// the compiled text.
pub fn preview_file(options: &BuildOptions, file: &Path) -> SugarResult<(PathBuf, String)> {
	let text = std::fs::read_to_string(file)?;
	let compiled = transform(&text)?;
	Ok((output_path(options, file), compiled))
}

/// Compile one file and write the output, skipping the write when the
/// existing output is already identical.
#[tracing::instrument(skip_all, fields(file = %file.display()))]
pub fn transform_file(options: &BuildOptions, file: &Path) -> SugarResult<FileOutcome> {
	let (output, compiled) = preview_file(options, file)?;

	if let Some(parent) = output.parent() {
		if !parent.exists() {
			std::fs::create_dir_all(parent)?;
		}
	}

	let unchanged = std::fs::read_to_string(&output).is_ok_and(|existing| existing == compiled);
	if unchanged {
		debug!("output is up to date");
		return Ok(FileOutcome {
			file: file.to_path_buf(),
			output,
			written: false,
		});
	}

	std::fs::write(&output, compiled)?;
	debug!(output = %output.display(), "wrote compiled file");

	Ok(FileOutcome {
		file: file.to_path_buf(),
		output,
		written: true,
	})
}

/// Compile every matched file. Per-file failures are collected instead of
/// aborting, so one broken template does not stop the batch.
pub fn build(options: &BuildOptions) -> SugarResult<BuildResult> {
	let files = collect_input_files(options)?;

	let mut result = BuildResult::default();
	for file in files {
		match transform_file(options, &file) {
			Ok(outcome) => result.outcomes.push(outcome),
			Err(error) => result.failures.push(BuildFailure { file, error }),
		}
	}

	Ok(result)
}
