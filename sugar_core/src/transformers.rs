//! The built-in tag transformers and their registry.
//!
//! Matching order is an explicit contract: snippet/layout first, then slot,
//! then the generic CSS-variable tag. The first transformer whose predicate
//! accepts a tag decides its replacement; returning `None` leaves the tag
//! untouched even if a later transformer would also match.

use crate::Attribute;
use crate::Tag;
use crate::php::ValueSegment;
use crate::php::inner_expression;
use crate::php::split_segments;
use crate::splice::SourceLine;
use crate::splice::join_lines;
use crate::splice::pad_lines;

/// Name prefix marking an attribute as a CSS custom property.
const CSS_VAR_PREFIX: &str = "--";

/// The built-in transformers, a small closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTransformer {
	/// `snippet:*`, `layout` and `layout:*` tags become `snippet()` /
	/// `layout()` calls with their attributes packed into `__snippetData()`.
	SnippetOrLayout,
	/// `slot` and `slot:*` tags become `slot()` / `endslot()` calls.
	Slot,
	/// Any other tag carrying at least one `--*` attribute gets those
	/// attributes merged into a single `style` attribute.
	CssVarTag,
}

impl TagTransformer {
	pub fn matches(self, tag: &Tag) -> bool {
		match self {
			Self::SnippetOrLayout => {
				tag.name.starts_with("snippet:")
					|| tag.name == "layout"
					|| tag.name.starts_with("layout:")
			}
			Self::Slot => tag.name == "slot" || tag.name.starts_with("slot:"),
			Self::CssVarTag => {
				tag.attributes
					.iter()
					.any(|attr| attr.name.starts_with(CSS_VAR_PREFIX))
			}
		}
	}

	/// Replacement text for an open tag, or `None` to leave it unchanged.
	pub fn transform_open_tag(self, tag: &Tag) -> Option<String> {
		match self {
			Self::SnippetOrLayout => Some(snippet_or_layout_open(tag)),
			Self::Slot => Some(slot_open(tag)),
			Self::CssVarTag => Some(css_var_tag_open(tag)),
		}
	}

	/// Replacement text for a close tag, or `None` to leave it unchanged.
	pub fn transform_close_tag(self, tag: &Tag) -> Option<String> {
		match self {
			Self::SnippetOrLayout => Some(snippet_or_layout_close(tag)),
			Self::Slot => Some(slot_close(tag)),
			// The close tag of a CSS-variable tag passes through.
			Self::CssVarTag => None,
		}
	}
}

/// The ordered transformer list. Evaluation order is fixed by
/// [`Registry::default`]; the first match wins.
#[derive(Debug, Clone)]
pub struct Registry {
	transformers: Vec<TagTransformer>,
}

impl Default for Registry {
	fn default() -> Self {
		Self {
			transformers: vec![
				TagTransformer::SnippetOrLayout,
				TagTransformer::Slot,
				TagTransformer::CssVarTag,
			],
		}
	}
}

impl Registry {
	pub fn transform_open_tag(&self, tag: &Tag) -> Option<String> {
		let transformer = self.transformers.iter().find(|t| t.matches(tag))?;
		transformer.transform_open_tag(tag)
	}

	pub fn transform_close_tag(&self, tag: &Tag) -> Option<String> {
		let transformer = self.transformers.iter().find(|t| t.matches(tag))?;
		transformer.transform_close_tag(tag)
	}
}

/// Split a dialect name into the call kind and the snippet/layout name.
/// `layout` without a name falls back to `default`.
fn call_parts(name: &str) -> (&str, &str) {
	match name.split_once(':') {
		Some((kind, rest)) => (kind, rest),
		None => (name, "default"),
	}
}

fn snippet_or_layout_open(tag: &Tag) -> String {
	let (kind, name) = call_parts(&tag.name);
	let slots = if tag.is_self_closing { "" } else { ", slots: true" };

	if tag.attributes.is_empty() {
		return pad_lines(format!("<?php {kind}('{name}'{slots}); ?>"), tag.line_count);
	}

	let grouped = group_css_vars(&tag.attributes);
	let mut lines = vec![SourceLine::new(
		format!("<?php {kind}('{name}', __snippetData(["),
		0,
	)];

	let last_index = grouped.attributes.len() - 1;
	for (index, attr) in grouped.attributes.iter().enumerate() {
		let text = match grouped.css_position(index) {
			Some(CssPosition::Only) => {
				// A trailing comma is only needed when more entries follow.
				let comma = if index < last_index { "," } else { "" };
				format!(
					"{}'style' => '{}: {}'{comma}",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::PhpString)
				)
			}
			Some(CssPosition::First) => {
				format!(
					"{}'style' => '{}: {};",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::PhpString)
				)
			}
			Some(CssPosition::Middle) => {
				format!(
					"{}{}: {};",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::PhpString)
				)
			}
			Some(CssPosition::Last) => {
				format!(
					"{}{}: {}',",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::PhpString)
				)
			}
			None => {
				// A nameless PHP attribute has no key to bind; its source
				// line stays blank in the output.
				if attr.name.is_empty() {
					continue;
				}
				format!("{}'{}' => {},", attr.indent, attr.name, resolve_value(attr))
			}
		};
		lines.push(SourceLine::new(text, attr.line));
	}

	lines.push(SourceLine::new(
		format!("{}]){slots}); ?>", tag.indent_before_end),
		tag.line_count,
	));

	join_lines(&lines)
}

fn snippet_or_layout_close(tag: &Tag) -> String {
	let (kind, name) = call_parts(&tag.name);
	// Layouts have no close form; the close tag is erased.
	let text = if kind == "snippet" {
		format!("<?php endsnippet(/* {name} */); ?>")
	} else {
		String::new()
	};
	pad_lines(text, tag.line_count)
}

fn slot_name(tag: &Tag) -> Option<&str> {
	tag.name.strip_prefix("slot:").filter(|name| !name.is_empty())
}

fn slot_open(tag: &Tag) -> String {
	let text = match slot_name(tag) {
		Some(name) => format!("<?php slot('{name}'); ?>"),
		None => "<?php slot(); ?>".to_string(),
	};
	pad_lines(text, tag.line_count)
}

fn slot_close(tag: &Tag) -> String {
	let text = match slot_name(tag) {
		Some(name) => format!("<?php endslot(/* {name} */); ?>"),
		None => "<?php endslot(); ?>".to_string(),
	};
	pad_lines(text, tag.line_count)
}

/// Re-serialize an ordinary tag with its CSS-variable attributes merged into
/// one `style` attribute.
fn css_var_tag_open(tag: &Tag) -> String {
	let grouped = group_css_vars(&tag.attributes);
	let mut lines = vec![SourceLine::new(format!("<{}", tag.name), 0)];

	for (index, attr) in grouped.attributes.iter().enumerate() {
		let text = match grouped.css_position(index) {
			Some(CssPosition::Only) => {
				format!(
					"{}style=\"{}: {}\"",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::Markup)
				)
			}
			Some(CssPosition::First) => {
				format!(
					"{}style=\"{}: {};",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::Markup)
				)
			}
			Some(CssPosition::Middle) => {
				format!(
					"{}{}: {};",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::Markup)
				)
			}
			Some(CssPosition::Last) => {
				format!(
					"{}{}: {}\"",
					attr.indent,
					attr.name,
					resolve_css_value(attr, CssContext::Markup)
				)
			}
			None => {
				if attr.is_php {
					format!("{}{}", attr.indent, attr.value.as_deref().unwrap_or(""))
				} else {
					match &attr.value {
						Some(value) => format!("{}{}=\"{value}\"", attr.indent, attr.name),
						None => format!("{}{}", attr.indent, attr.name),
					}
				}
			}
		};
		lines.push(SourceLine::new(text, attr.line));
	}

	let end = if tag.is_self_closing { "/>" } else { ">" };
	lines.push(SourceLine::new(
		format!("{}{end}", tag.indent_before_end),
		tag.line_count,
	));

	join_lines(&lines)
}

/// Attributes with the CSS variables regrouped into one contiguous run at
/// the first variable's original position. All other attributes keep their
/// relative order — the one sanctioned reordering.
struct GroupedAttributes<'a> {
	attributes: Vec<&'a Attribute>,
	css_range: Option<(usize, usize)>,
}

enum CssPosition {
	Only,
	First,
	Middle,
	Last,
}

impl GroupedAttributes<'_> {
	fn css_position(&self, index: usize) -> Option<CssPosition> {
		let (first, last) = self.css_range?;
		if index < first || index > last {
			return None;
		}
		Some(match (index == first, index == last) {
			(true, true) => CssPosition::Only,
			(true, false) => CssPosition::First,
			(false, true) => CssPosition::Last,
			(false, false) => CssPosition::Middle,
		})
	}
}

fn group_css_vars(attributes: &[Attribute]) -> GroupedAttributes<'_> {
	let mut css_vars = Vec::new();
	let mut rest = Vec::new();
	let mut first_index = None;

	for (index, attr) in attributes.iter().enumerate() {
		if attr.name.starts_with(CSS_VAR_PREFIX) {
			if first_index.is_none() {
				first_index = Some(index);
			}
			css_vars.push(attr);
		} else {
			rest.push(attr);
		}
	}

	let Some(first) = first_index else {
		return GroupedAttributes {
			attributes: rest,
			css_range: None,
		};
	};

	let last = first + css_vars.len() - 1;
	let mut attributes = rest;
	attributes.splice(first..first, css_vars);

	GroupedAttributes {
		attributes,
		css_range: Some((first, last)),
	}
}

/// Resolve an attribute value into a PHP expression: a quoted literal, a
/// bare embedded expression, or a `.`-concatenation of both.
fn resolve_value(attr: &Attribute) -> String {
	let Some(value) = &attr.value else {
		// The value-less `$name` shorthand resolves to the variable of the
		// same name; other value-less attributes become an empty string.
		if attr.name.starts_with('$') {
			return attr.name.clone();
		}
		return "''".to_string();
	};

	let segments = split_segments(value);
	match segments.as_slice() {
		[ValueSegment::Php(block)] => inner_expression(block).to_string(),
		[] | [ValueSegment::Literal(_)] => format!("'{value}'"),
		segments => {
			let parts: Vec<String> = segments
				.iter()
				.map(|segment| {
					match segment {
						ValueSegment::Literal(text) => format!("'{text}'"),
						ValueSegment::Php(block) => inner_expression(block).to_string(),
					}
				})
				.collect();
			parts.join(" . ")
		}
	}
}

/// Where a resolved CSS value ends up: spliced into a single-quoted PHP
/// string (snippet/layout data) or into a plain markup attribute.
#[derive(Clone, Copy)]
enum CssContext {
	PhpString,
	Markup,
}

fn resolve_css_value(attr: &Attribute, context: CssContext) -> String {
	let value = attr.value.as_deref().unwrap_or("");

	// A value that is itself a custom property name is shorthand for a
	// variable reference.
	if value.starts_with(CSS_VAR_PREFIX) {
		return format!("var({value})");
	}

	match context {
		CssContext::Markup => value.to_string(),
		CssContext::PhpString => {
			split_segments(value)
				.iter()
				.map(|segment| {
					match segment {
						ValueSegment::Literal(text) => (*text).to_string(),
						ValueSegment::Php(block) => format!("' . {} . '", inner_expression(block)),
					}
				})
				.collect::<Vec<_>>()
				.concat()
		}
	}
}
