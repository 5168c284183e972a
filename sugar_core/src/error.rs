use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SugarError {
	#[error(transparent)]
	#[diagnostic(code(sugar::io_error))]
	Io(#[from] std::io::Error),

	#[error("unterminated PHP block starting at byte {offset}")]
	#[diagnostic(
		code(sugar::unterminated_php),
		help("add a closing `?>` marker; a `?>` inside a PHP string or comment does not count")
	)]
	UnterminatedPhp { offset: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sugar::config_parse),
		help("check that sugar.toml is valid TOML with `input`, `out_dir` and `exclude` keys")
	)]
	ConfigParse(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(sugar::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },
}

pub type SugarResult<T> = Result<T, SugarError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
