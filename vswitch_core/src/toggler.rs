use std::borrow::Cow;

use crate::FileKind;
use crate::VswError;
use crate::VswResult;
use crate::lexer::Directive;
use crate::lexer::scan_directive;

/// What happens to a line that is not itself a directive marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
	/// Outside any block: emitted unchanged.
	Passthrough,
	/// Inside a single block for the target variant: made active.
	Uncomment,
	/// Inside a block for another variant, or nested more than one level
	/// deep: made inert.
	Comment,
}

/// Pending `#ifdef` names for the line currently being processed, outermost
/// first.
#[derive(Debug, Default)]
pub struct BlockStack {
	entries: Vec<OpenBlock>,
}

#[derive(Debug)]
struct OpenBlock {
	variant: String,
	/// 1-indexed line of the opening marker.
	line: usize,
}

impl BlockStack {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, variant: impl Into<String>, line: usize) {
		self.entries.push(OpenBlock {
			variant: variant.into(),
			line,
		});
	}

	/// Pop the innermost block, returning its variant name.
	pub fn pop(&mut self) -> Option<String> {
		self.entries.pop().map(|block| block.variant)
	}

	pub fn depth(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Line of the innermost block that is still open.
	pub fn innermost_line(&self) -> Option<usize> {
		self.entries.last().map(|block| block.line)
	}

	/// Decide what to do with a content line under the current stack.
	///
	/// Only a stack holding exactly one entry equal to `target` makes a line
	/// active. Any deeper nesting comments the line out, even when every
	/// enclosing block names the target.
	pub fn action(&self, target: &str) -> LineAction {
		match self.entries.as_slice() {
			[] => LineAction::Passthrough,
			[only] if only.variant == target => LineAction::Uncomment,
			_ => LineAction::Comment,
		}
	}
}

/// Rewrite `lines` so that blocks for `target` are active and every other
/// block is commented out.
///
/// Directive markers are emitted unchanged and the output always has as many
/// lines as the input. Running the toggler again on its own output with the
/// same target returns the same lines. `source` only names the file in
/// diagnostics.
pub fn toggle_comments<S: AsRef<str>>(
	target: &str,
	kind: FileKind,
	lines: &[S],
	source: &str,
) -> VswResult<Vec<String>> {
	let syntax = kind.syntax();
	let mut stack = BlockStack::new();
	let mut output = Vec::with_capacity(lines.len());

	for (index, line) in lines.iter().enumerate() {
		let line = line.as_ref();
		let line_number = index + 1;

		match scan_directive(line) {
			Some(Directive::Open(variant)) => {
				tracing::debug!(
					file = source,
					line = line_number,
					variant,
					"start of conditional block"
				);
				stack.push(variant, line_number);
				output.push(line.to_string());
				continue;
			}
			Some(Directive::Close) => {
				tracing::debug!(file = source, line = line_number, "end of conditional block");
				if stack.pop().is_none() {
					return Err(VswError::UnbalancedDirective {
						file: source.to_string(),
						line: line_number,
					});
				}
				output.push(line.to_string());
				continue;
			}
			None => {}
		}

		let rewritten = match stack.action(target) {
			LineAction::Passthrough => Cow::Borrowed(line),
			LineAction::Uncomment => syntax.uncomment(line),
			LineAction::Comment => syntax.comment(line),
		};
		output.push(rewritten.into_owned());
	}

	if let Some(line) = stack.innermost_line() {
		return Err(VswError::UnbalancedDirective {
			file: source.to_string(),
			line,
		});
	}

	debug_assert_eq!(output.len(), lines.len());
	Ok(output)
}

/// Split file content into lines, each keeping its terminator. The last line
/// may lack one. Joining the result reproduces `content` exactly.
pub fn split_lines(content: &str) -> Vec<&str> {
	content.split_inclusive('\n').collect()
}
