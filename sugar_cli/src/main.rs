use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use sugar_cli::Commands;
use sugar_cli::SugarCli;
use sugar_core::AnyEmptyResult;
use sugar_core::AnyResult;
use sugar_core::BuildOptions;
use sugar_core::SugarConfig;
use sugar_core::build;
use sugar_core::collect_input_files;
use sugar_core::preview_file;
use sugar_core::transform;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let mut args = SugarCli::parse();

	// Respect NO_COLOR, the --no-color flag, and non-tty output.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let command = args.command.take();
	let result = match command {
		Some(Commands::Build {
			input,
			out_dir,
			dry_run,
			diff,
			watch,
		}) => run_build(&args, input, out_dir, dry_run, diff, watch),
		Some(Commands::Print { file }) => run_print(&args, &file),
		None => {
			eprintln!("No subcommand specified. Run `sugar --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<sugar_core::SugarError>() {
			Ok(sugar_err) => {
				let report: miette::Report = (*sugar_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &SugarCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn build_options(
	args: &SugarCli,
	input: Option<String>,
	out_dir: Option<PathBuf>,
) -> AnyResult<BuildOptions> {
	let root = resolve_root(args);
	let config = SugarConfig::load(&root)?;
	Ok(BuildOptions::new(root, input, out_dir, config.as_ref()))
}

fn run_build(
	args: &SugarCli,
	input: Option<String>,
	out_dir: Option<PathBuf>,
	dry_run: bool,
	diff: bool,
	watch: bool,
) -> AnyEmptyResult {
	let options = build_options(args, input, out_dir)?;
	let had_failures = run_build_once(args, &options, dry_run, diff)?;

	if !watch || dry_run {
		if had_failures {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	println!();
	println!(
		"{}",
		colored!("Watching for file changes... (press Ctrl+C to stop)", bold)
	);

	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&options.root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, building...");
		if let Err(e) = run_build_once(args, &options, false, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Run a single build pass. Returns whether any file failed to compile.
fn run_build_once(
	args: &SugarCli,
	options: &BuildOptions,
	dry_run: bool,
	diff: bool,
) -> AnyResult<bool> {
	if dry_run {
		return run_dry_run(options, diff);
	}

	let result = build(options)?;

	for failure in &result.failures {
		eprintln!(
			"{} {}: {}",
			colored!("error:", red),
			make_relative(&failure.file, &options.root),
			failure.error
		);
	}

	let written = result.written_count();
	if written == 0 {
		println!("All output files are already up to date.");
	} else {
		println!("Compiled {written} file(s).");
		if args.verbose {
			for outcome in result.outcomes.iter().filter(|outcome| outcome.written) {
				println!(
					"  {} -> {}",
					make_relative(&outcome.file, &options.root),
					make_relative(&outcome.output, &options.root)
				);
			}
		}
	}

	Ok(!result.failures.is_empty())
}

fn run_dry_run(options: &BuildOptions, diff: bool) -> AnyResult<bool> {
	let files = collect_input_files(options)?;

	let mut stale = Vec::new();
	let mut failures = Vec::new();
	for file in &files {
		match preview_file(options, file) {
			Ok((output, compiled)) => {
				let existing = std::fs::read_to_string(&output).ok();
				if existing.as_deref() != Some(compiled.as_str()) {
					stale.push((output, existing, compiled));
				}
			}
			Err(error) => failures.push((file.clone(), error)),
		}
	}

	for (file, error) in &failures {
		eprintln!(
			"{} {}: {error}",
			colored!("error:", red),
			make_relative(file, &options.root)
		);
	}

	if stale.is_empty() {
		println!("All output files are already up to date.");
	} else {
		println!("Dry run: would write {} file(s):", stale.len());
		for (output, existing, compiled) in &stale {
			println!("  {}", make_relative(output, &options.root));
			if diff {
				print_diff(existing.as_deref().unwrap_or(""), compiled);
			}
		}
	}

	Ok(!failures.is_empty())
}

fn run_print(args: &SugarCli, file: &Path) -> AnyEmptyResult {
	let root = resolve_root(args);
	let path = if file.is_absolute() {
		file.to_path_buf()
	} else {
		root.join(file)
	};

	let text = std::fs::read_to_string(&path)?;
	let compiled = transform(&text)?;
	print!("{compiled}");

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
