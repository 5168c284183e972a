use crate::Registry;
use crate::SpliceBuffer;
use crate::SugarResult;
use crate::Tag;
use crate::TagSink;
use crate::scanner::parse;

/// Feeds matched tag spans into the splice buffer as the scanner emits them.
struct Rewriter<'a> {
	registry: Registry,
	output: SpliceBuffer<'a>,
}

impl TagSink for Rewriter<'_> {
	fn open_tag(&mut self, tag: &Tag) {
		if let Some(replacement) = self.registry.transform_open_tag(tag) {
			let span = tag.span();
			self.output.overwrite(span.start, span.end, replacement);
		}
	}

	fn close_tag(&mut self, tag: &Tag) {
		if let Some(replacement) = self.registry.transform_close_tag(tag) {
			let span = tag.span();
			self.output.overwrite(span.start, span.end, replacement);
		}
	}
}

/// Compile one template document to plain PHP.
///
/// This is a pure function composing the scanner, the transformer registry
/// and the splice buffer. Input without dialect tags or CSS-variable
/// attributes passes through unchanged, and the output always has the same
/// number of lines as the input.
pub fn transform(input: &str) -> SugarResult<String> {
	let mut rewriter = Rewriter {
		registry: Registry::default(),
		output: SpliceBuffer::new(input),
	};
	parse(input, &mut rewriter)?;

	Ok(rewriter.output.finish())
}
