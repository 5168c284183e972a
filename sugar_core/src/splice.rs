//! Position-preserving output assembly.
//!
//! [`SpliceBuffer`] applies span replacements to the original text in one
//! pass, leaving everything outside the edited spans byte-identical.
//! [`join_lines`] builds replacement text whose line count matches the span
//! it replaces, so edits never shift line numbers of the content after them.

/// A single replacement of a byte span in the original buffer.
#[derive(Debug, Clone)]
struct Edit {
	start: usize,
	end: usize,
	replacement: String,
}

/// Collects `(start, end, replacement)` edits against an original buffer and
/// produces the final output text.
///
/// Edits are keyed by tag spans, which never overlap for well-formed input;
/// overlapping edits are a defect in the input, and only the first one wins.
#[derive(Debug)]
pub struct SpliceBuffer<'a> {
	original: &'a str,
	edits: Vec<Edit>,
}

impl<'a> SpliceBuffer<'a> {
	pub fn new(original: &'a str) -> Self {
		Self {
			original,
			edits: vec![],
		}
	}

	/// Replace the byte span `start..end` with `replacement`.
	pub fn overwrite(&mut self, start: usize, end: usize, replacement: impl Into<String>) {
		self.edits.push(Edit {
			start,
			end,
			replacement: replacement.into(),
		});
	}

	/// Apply all edits in one pass and return the output text.
	pub fn finish(mut self) -> String {
		self.edits.sort_by_key(|edit| edit.start);

		let mut output = String::with_capacity(self.original.len());
		let mut cursor = 0;
		for edit in &self.edits {
			if edit.start < cursor {
				continue;
			}
			output.push_str(&self.original[cursor..edit.start]);
			output.push_str(&edit.replacement);
			cursor = edit.end;
		}
		output.push_str(&self.original[cursor..]);

		output
	}
}

/// One piece of replacement text, tagged with the source line (relative to
/// the replaced span) it belongs on.
#[derive(Debug, Clone)]
pub struct SourceLine {
	pub text: String,
	pub line: usize,
}

impl SourceLine {
	pub fn new(text: impl Into<String>, line: usize) -> Self {
		Self {
			text: text.into(),
			line,
		}
	}
}

/// Join pieces so that each one lands on its tagged line. Gaps are filled
/// with blank lines and pieces tagged with an already-reached line are
/// appended in place, so the result spans exactly as many lines as the
/// highest tag (plus any newlines inside the pieces themselves).
pub fn join_lines(lines: &[SourceLine]) -> String {
	let mut result = String::new();
	let mut current_line = 0;

	for piece in lines {
		for _ in current_line..piece.line {
			result.push('\n');
		}
		if piece.line > current_line {
			current_line = piece.line;
		}
		result.push_str(&piece.text);
		current_line += piece.text.matches('\n').count();
	}

	result
}

/// Append newlines so `text` spans `line_count` source lines. Used for
/// single-line call forms replacing tags that span multiple lines.
pub(crate) fn pad_lines(text: String, line_count: usize) -> String {
	let missing = line_count.saturating_sub(text.matches('\n').count());
	if missing == 0 {
		return text;
	}

	let mut padded = text;
	for _ in 0..missing {
		padded.push('\n');
	}
	padded
}
