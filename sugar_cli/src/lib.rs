use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Compile template sugar tags in Kirby templates to plain PHP.",
	long_about = "sugar compiles HTML-style template tags — <snippet:card>, <layout>, <slot> and \
	              CSS custom-property attributes — into plain PHP snippet calls.\n\nEverything \
	              outside the rewritten tags stays byte-for-byte identical, including line \
	              numbers, so PHP error messages keep pointing at your template source.\n\nQuick \
	              start:\n  sugar build                 Compile all *.kirby templates\n  sugar \
	              build --watch         Recompile on every change\n  sugar print file.kirby     \
	              Print the compiled PHP to stdout"
)]
pub struct SugarCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Compile template files into plain PHP.
	///
	/// Expands the input glob, compiles every matched template and writes a
	/// `.php` file for each one — next to the input, or re-rooted under
	/// `--out-dir`. Files whose output is already up to date are skipped.
	///
	/// A template that fails to compile is reported and does not stop the
	/// rest of the batch.
	Build {
		/// Glob pattern or file path selecting the templates to compile.
		/// Falls back to the `input` value in `sugar.toml`, then to
		/// `**/*.kirby`.
		input: Option<String>,

		/// Directory compiled files are written to, relative to the project
		/// root. Defaults to writing next to each input file.
		#[arg(long)]
		out_dir: Option<PathBuf>,

		/// Preview which files would be written without writing them.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// With --dry-run, show a unified diff between the existing output
		/// and what would be written.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Watch for file changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Compile a single template file and print the result to stdout.
	///
	/// Useful for inspecting what a template compiles to without touching
	/// the filesystem.
	Print {
		/// The template file to compile.
		file: PathBuf,
	},
}
