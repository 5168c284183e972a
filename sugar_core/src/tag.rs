use std::ops::Range;

/// One parsed markup element, delivered to a [`TagSink`](crate::TagSink) the
/// moment its terminating `>` is reached.
///
/// Tags are transient: the scanner owns a tag only while it is being read and
/// never retains it afterwards. Anything a sink wants to keep it must clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	/// The tag name, case sensitive. Names may contain `:` (the dialect
	/// separator, e.g. `snippet:card`) and `/` (nested-path names like
	/// `k:seo/head`).
	pub name: String,
	/// Attributes in source order. Order is significant — it drives output
	/// ordering and CSS-variable grouping.
	pub attributes: Vec<Attribute>,
	/// True for a `</name>` close tag. Mutually exclusive with
	/// [`is_self_closing`](Tag::is_self_closing).
	pub is_close_tag: bool,
	/// True for a `<name />` self-closing tag.
	pub is_self_closing: bool,
	/// Byte offset of the opening `<` in the original buffer.
	pub start_index: usize,
	/// Byte offset of the closing `>` in the original buffer (inclusive).
	pub end_index: usize,
	/// Newlines consumed between `start_index` and `end_index`, including
	/// newlines inside embedded PHP blocks and quoted attribute values.
	pub line_count: usize,
	/// Whitespace run immediately preceding the closing `>` (or the `/` of a
	/// self-closing tag), used to reproduce closing-bracket indentation in
	/// generated output.
	pub indent_before_end: String,
}

impl Tag {
	/// The full byte span of the tag in the original buffer.
	pub fn span(&self) -> Range<usize> {
		self.start_index..self.end_index + 1
	}
}

/// One attribute occurrence inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	/// The attribute name. Empty for a nameless embedded-PHP attribute that
	/// appears directly inside a tag's attribute area, like
	/// `<div <?= $attr ?>>`.
	pub name: String,
	/// The attribute value. `None` for a value-less boolean attribute like
	/// `disabled`.
	pub value: Option<String>,
	/// True when the whole attribute is an embedded PHP block rather than a
	/// name/value pair.
	pub is_php: bool,
	/// Line the attribute starts on, relative to the tag's first line.
	pub line: usize,
	/// Whitespace run immediately preceding the attribute, used to reproduce
	/// the source layout in generated output.
	pub indent: String,
}
