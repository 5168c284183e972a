use crate::Attribute;
use crate::SugarResult;
use crate::Tag;
use crate::php::read_php;

/// Tag names whose bodies are raw content: nothing inside them is tokenized
/// as markup except the matching close tag.
pub const RAW_TAG_NAMES: [&str; 2] = ["script", "style"];

/// Receives tag events from [`parse`]. Both callbacks run synchronously
/// while the scanner is paused; the scanner resumes once they return.
pub trait TagSink {
	/// Called for every completed open tag (including self-closing tags).
	fn open_tag(&mut self, tag: &Tag);
	/// Called for every completed close tag.
	fn close_tag(&mut self, tag: &Tag);
}

/// Scan `input` once, left to right, delivering open- and close-tag events
/// to `sink`. All scanner state lives in a fresh instance per call, so
/// separate documents can be parsed concurrently without coordination.
///
/// The only fatal error is an embedded PHP block whose `?>` is never found;
/// everything else degrades to "no event" (unterminated tags and raw bodies
/// are silently consumed).
pub fn parse(input: &str, sink: &mut dyn TagSink) -> SugarResult<()> {
	Scanner::new(input).run(sink)
}

/// A read/peek cursor over the input that counts every consumed newline.
/// The PHP sub-scanner reads through the same cursor, so newlines inside
/// embedded code still count toward the surrounding tag's line tally.
pub(crate) struct Cursor<'a> {
	input: &'a str,
	position: usize,
	newlines: usize,
}

impl<'a> Cursor<'a> {
	pub(crate) fn new(input: &'a str) -> Self {
		Self {
			input,
			position: 0,
			newlines: 0,
		}
	}

	/// Byte offset of the next unread byte.
	pub(crate) fn position(&self) -> usize {
		self.position
	}

	/// Total newlines consumed so far.
	pub(crate) fn newlines(&self) -> usize {
		self.newlines
	}

	pub(crate) fn read_byte(&mut self) -> Option<u8> {
		let byte = *self.input.as_bytes().get(self.position)?;
		self.position += 1;
		if byte == b'\n' {
			self.newlines += 1;
		}
		Some(byte)
	}

	pub(crate) fn peek_byte(&self) -> Option<u8> {
		self.peek_byte_at(0)
	}

	pub(crate) fn peek_byte_at(&self, offset: usize) -> Option<u8> {
		self.input.as_bytes().get(self.position + offset).copied()
	}

	pub(crate) fn next_is(&self, expected: &str) -> bool {
		self.input.as_bytes()[self.position..].starts_with(expected.as_bytes())
	}

	pub(crate) fn advance(&mut self, count: usize) {
		for _ in 0..count {
			if self.read_byte().is_none() {
				break;
			}
		}
	}

	/// Slice the input between two byte offsets. Callers only slice at
	/// positions delimited by ASCII structure characters, which are always
	/// UTF-8 boundaries.
	pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
		&self.input[start..end]
	}
}

enum ScanState {
	Normal,
	Tag,
	AttributeName,
	AttributeValue,
}

/// An attribute that started but has not been pushed onto its tag yet.
struct PendingAttribute {
	/// Byte offset of the first name character.
	start: usize,
	/// Set once `="` is seen and the name span is final.
	name: Option<String>,
	line: usize,
	indent: String,
}

struct Scanner<'a> {
	input: &'a str,
	cursor: Cursor<'a>,
	state: ScanState,
	tag: Option<Tag>,
	/// Cursor newline tally when the current tag's `<` was consumed.
	tag_newline_base: usize,
	pending: Option<PendingAttribute>,
	quote: u8,
	value_start: usize,
	/// Name of the currently open raw tag, if any. While set, everything
	/// except the matching close tag is literal content.
	open_raw_tag: Option<String>,
}

impl<'a> Scanner<'a> {
	fn new(input: &'a str) -> Self {
		Self {
			input,
			cursor: Cursor::new(input),
			state: ScanState::Normal,
			tag: None,
			tag_newline_base: 0,
			pending: None,
			quote: b'"',
			value_start: 0,
			open_raw_tag: None,
		}
	}

	fn run(&mut self, sink: &mut dyn TagSink) -> SugarResult<()> {
		loop {
			let offset = self.cursor.position();
			let Some(byte) = self.cursor.read_byte() else {
				// Unterminated tags and attributes never fire an event.
				break;
			};

			match self.state {
				ScanState::Normal => self.scan_normal(byte, offset)?,
				ScanState::Tag => self.scan_tag(byte, offset, sink)?,
				ScanState::AttributeName => self.scan_attribute_name(byte, offset, sink),
				ScanState::AttributeValue => self.scan_attribute_value(byte, offset)?,
			}
		}

		Ok(())
	}

	fn scan_normal(&mut self, byte: u8, offset: usize) -> SugarResult<()> {
		if byte != b'<' {
			return Ok(());
		}

		if self.cursor.next_is("!--") {
			self.cursor.advance(3);
			// Comment content is discarded, never tokenized.
			while !self.cursor.next_is("-->") {
				if self.cursor.read_byte().is_none() {
					return Ok(());
				}
			}
			self.cursor.advance(3);
			return Ok(());
		}

		if self.cursor.peek_byte() == Some(b'?') {
			// Top-level embedded code is not attribute data and produces no
			// tag event.
			read_php(&mut self.cursor, offset)?;
			return Ok(());
		}

		let name_start = self.cursor.position();
		while let Some(next) = self.cursor.peek_byte() {
			if matches!(next, b' ' | b'\t' | b'\n' | b'\r' | b'>') {
				break;
			}
			self.cursor.advance(1);
		}
		let raw_name = self.cursor.slice(name_start, self.cursor.position());

		// Inside a raw tag the only markup is the matching close tag;
		// everything else (including `<` itself) is literal content.
		if let Some(open_raw) = &self.open_raw_tag {
			if raw_name.strip_prefix('/') != Some(open_raw.as_str()) {
				return Ok(());
			}
		}

		let is_close_tag = raw_name.starts_with('/');
		let name = raw_name.strip_prefix('/').unwrap_or(raw_name);
		// A tight self-close like `<k:seo/head/>` leaves the trailing slash
		// on the name; self-closing itself is detected at the `>`.
		let name = name.strip_suffix('/').unwrap_or(name);

		self.tag = Some(Tag {
			name: name.to_string(),
			attributes: vec![],
			is_close_tag,
			is_self_closing: false,
			start_index: offset,
			end_index: 0,
			line_count: 0,
			indent_before_end: String::new(),
		});
		self.tag_newline_base = self.cursor.newlines();
		self.state = ScanState::Tag;
		Ok(())
	}

	fn scan_tag(&mut self, byte: u8, offset: usize, sink: &mut dyn TagSink) -> SugarResult<()> {
		match byte {
			b'>' => self.finish_tag(offset, sink),
			b'<' if self.cursor.peek_byte() == Some(b'?') => {
				// Embedded PHP inside the attribute area becomes a nameless
				// attribute spanning the whole block.
				let line = self.relative_line();
				let indent = indent_before(self.input, offset);
				read_php(&mut self.cursor, offset)?;
				let value = self.cursor.slice(offset, self.cursor.position()).to_string();

				if let Some(tag) = &mut self.tag {
					tag.attributes.push(Attribute {
						name: String::new(),
						value: Some(value),
						is_php: true,
						line,
						indent,
					});
				}
			}
			byte if byte != b'/' && !is_whitespace(byte) => {
				self.pending = Some(PendingAttribute {
					start: offset,
					name: None,
					line: self.relative_line(),
					indent: indent_before(self.input, offset),
				});
				self.state = ScanState::AttributeName;
			}
			_ => {}
		}

		Ok(())
	}

	fn scan_attribute_name(&mut self, byte: u8, offset: usize, sink: &mut dyn TagSink) {
		if byte == b'>' {
			self.finish_attribute(offset, None);
			self.finish_tag(offset, sink);
		} else if is_whitespace(byte) || byte == b'/' {
			self.finish_attribute(offset, None);
			self.state = ScanState::Tag;
		} else if byte == b'=' && self.cursor.peek_byte().is_some_and(is_quote) {
			if let Some(pending) = &mut self.pending {
				pending.name = Some(self.input[pending.start..offset].to_string());
			}
			self.quote = self.cursor.read_byte().unwrap_or(b'"');
			self.value_start = self.cursor.position();
			self.state = ScanState::AttributeValue;
		}
		// Any other byte — including an `=` that is not followed by a quote —
		// stays part of the name.
	}

	fn scan_attribute_value(&mut self, byte: u8, offset: usize) -> SugarResult<()> {
		if byte == self.quote {
			let value = self.input[self.value_start..offset].to_string();
			self.finish_attribute(offset, Some(value));
			self.state = ScanState::Tag;
		} else if byte == b'<' && self.cursor.peek_byte() == Some(b'?') {
			// Values may mix literal text and embedded code, like
			// `id="static-<?= $x ?>-suffix"`; a quote inside the block must
			// not end the value.
			read_php(&mut self.cursor, offset)?;
		}

		Ok(())
	}

	/// Push the pending attribute onto the current tag. For value-less
	/// attributes the name span ends at `name_end`.
	fn finish_attribute(&mut self, name_end: usize, value: Option<String>) {
		let Some(pending) = self.pending.take() else {
			return;
		};
		let Some(tag) = &mut self.tag else {
			return;
		};

		let name = match pending.name {
			Some(name) => name,
			None => self.input[pending.start..name_end].to_string(),
		};

		tag.attributes.push(Attribute {
			name,
			value,
			is_php: false,
			line: pending.line,
			indent: pending.indent,
		});
	}

	/// Finalize the current tag at its closing `>` and fire the event.
	fn finish_tag(&mut self, offset: usize, sink: &mut dyn TagSink) {
		self.state = ScanState::Normal;
		let Some(mut tag) = self.tag.take() else {
			return;
		};

		tag.is_self_closing = offset > 0 && self.input.as_bytes()[offset - 1] == b'/';
		tag.end_index = offset;
		tag.line_count = self.cursor.newlines() - self.tag_newline_base;
		tag.indent_before_end = if tag.is_self_closing {
			indent_before(self.input, offset - 1)
		} else {
			indent_before(self.input, offset)
		};

		if tag.is_close_tag {
			if self.open_raw_tag.as_deref() == Some(tag.name.as_str()) {
				self.open_raw_tag = None;
			}
			sink.close_tag(&tag);
		} else {
			if !tag.is_self_closing && RAW_TAG_NAMES.contains(&tag.name.as_str()) {
				self.open_raw_tag = Some(tag.name.clone());
			}
			sink.open_tag(&tag);
		}
	}

	/// Line the cursor is on, relative to the current tag's first line.
	fn relative_line(&self) -> usize {
		self.cursor.newlines() - self.tag_newline_base
	}
}

fn is_whitespace(byte: u8) -> bool {
	matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_quote(byte: u8) -> bool {
	matches!(byte, b'"' | b'\'' | b'`')
}

/// The run of spaces and tabs immediately preceding `offset`.
fn indent_before(input: &str, offset: usize) -> String {
	let bytes = input.as_bytes();
	let mut start = offset;
	while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
		start -= 1;
	}
	input[start..offset].to_string()
}
