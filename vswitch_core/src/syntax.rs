use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::VswError;
use crate::VswResult;

/// The comment style of a file, which decides how lines are commented out
/// and restored.
///
/// Implementations must be no-ops when the line is already in the requested
/// state. That property is what makes repeated switches idempotent.
pub trait CommentSyntax: Sync {
	/// Returns true when `line` is already commented out in this syntax.
	fn is_commented(&self, line: &str) -> bool;

	/// Wrap `line` as a comment, unless it already is one.
	fn comment<'a>(&self, line: &'a str) -> Cow<'a, str>;

	/// Strip exactly one layer of comment wrapping from `line`, if present.
	fn uncomment<'a>(&self, line: &'a str) -> Cow<'a, str>;
}

/// Single-line comments introduced by a fixed prefix, e.g. `//`.
#[derive(Debug, Clone, Copy)]
pub struct LineCommentSyntax {
	pub prefix: &'static str,
}

impl CommentSyntax for LineCommentSyntax {
	fn is_commented(&self, line: &str) -> bool {
		line.starts_with(self.prefix)
	}

	fn comment<'a>(&self, line: &'a str) -> Cow<'a, str> {
		if self.is_commented(line) {
			Cow::Borrowed(line)
		} else {
			Cow::Owned(format!("{} {line}", self.prefix))
		}
	}

	fn uncomment<'a>(&self, line: &'a str) -> Cow<'a, str> {
		// Only the exact `prefix + space` form written by `comment` is
		// stripped. `//foo` stays as is.
		match line
			.strip_prefix(self.prefix)
			.and_then(|rest| rest.strip_prefix(' '))
		{
			Some(rest) => Cow::Borrowed(rest),
			None => Cow::Borrowed(line),
		}
	}
}

/// Comments delimited by an open and a close token, e.g. `<!-- ... -->`.
///
/// Commenting trims the line and wraps it on a single line. Leading
/// indentation is therefore not preserved through a comment/uncomment cycle.
#[derive(Debug, Clone, Copy)]
pub struct BracketCommentSyntax {
	pub open: &'static str,
	pub close: &'static str,
}

impl CommentSyntax for BracketCommentSyntax {
	fn is_commented(&self, line: &str) -> bool {
		line.trim().starts_with(self.open)
	}

	fn comment<'a>(&self, line: &'a str) -> Cow<'a, str> {
		if self.is_commented(line) {
			return Cow::Borrowed(line);
		}

		let (body, terminator) = split_terminator(line);
		Cow::Owned(format!(
			"{} {} {}{terminator}",
			self.open,
			body.trim(),
			self.close
		))
	}

	fn uncomment<'a>(&self, line: &'a str) -> Cow<'a, str> {
		let (body, terminator) = split_terminator(line);
		let trimmed = body.trim();
		let open = self.open.len() + 1;
		let close = self.close.len() + 1;

		let is_wrapped = trimmed.starts_with(self.open)
			&& trimmed[self.open.len()..].starts_with(' ')
			&& trimmed.ends_with(self.close)
			&& trimmed[..trimmed.len() - self.close.len()].ends_with(' ');

		if !is_wrapped {
			return Cow::Borrowed(line);
		}

		// `<!-- -->` shares its single space between both markers, so the
		// inner range can be empty or inverted.
		let inner = trimmed
			.get(open..trimmed.len().saturating_sub(close))
			.unwrap_or("");
		Cow::Owned(format!("{inner}{terminator}"))
	}
}

/// Split a line into its body and its line terminator (`\n`, `\r\n` or
/// nothing for the last line of a file).
pub(crate) fn split_terminator(line: &str) -> (&str, &str) {
	if let Some(body) = line.strip_suffix("\r\n") {
		(body, &line[body.len()..])
	} else if let Some(body) = line.strip_suffix('\n') {
		(body, &line[body.len()..])
	} else {
		(line, "")
	}
}

static SLASH_COMMENTS: LineCommentSyntax = LineCommentSyntax { prefix: "//" };
static MARKUP_COMMENTS: BracketCommentSyntax = BracketCommentSyntax {
	open: "<!--",
	close: "-->",
};

/// The kind of file being processed. Each kind selects a [`CommentSyntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FileKind {
	Java,
	C,
	Html,
	Xml,
}

impl FileKind {
	pub const ALL: [FileKind; 4] = [Self::Java, Self::C, Self::Html, Self::Xml];

	/// The comment syntax used for this kind of file.
	pub fn syntax(self) -> &'static dyn CommentSyntax {
		match self {
			Self::Java | Self::C => &SLASH_COMMENTS,
			Self::Html | Self::Xml => &MARKUP_COMMENTS,
		}
	}

	/// The lowercase tag used in config files and on the command line.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Java => "java",
			Self::C => "c",
			Self::Html => "html",
			Self::Xml => "xml",
		}
	}

	/// Default file name patterns searched for this kind.
	pub fn default_patterns(self) -> &'static [&'static str] {
		match self {
			Self::Java => &["*.java"],
			Self::C => &["*.c", "*.h"],
			Self::Html => &["*.html"],
			Self::Xml => &["*.xml"],
		}
	}

	/// Infer the kind of a file from its extension.
	pub fn from_path(path: &Path) -> VswResult<Self> {
		let ext = path
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or_default()
			.to_ascii_lowercase();

		match ext.as_str() {
			"java" => Ok(Self::Java),
			"c" | "h" => Ok(Self::C),
			"html" | "htm" => Ok(Self::Html),
			"xml" => Ok(Self::Xml),
			_ => Err(VswError::UnsupportedFileKind(path.display().to_string())),
		}
	}
}

impl FromStr for FileKind {
	type Err = VswError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
			.ok_or_else(|| VswError::UnsupportedFileKind(value.to_string()))
	}
}

impl fmt::Display for FileKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Comment out `line` using the syntax of `kind`.
pub fn comment(kind: FileKind, line: &str) -> Cow<'_, str> {
	kind.syntax().comment(line)
}

/// Restore a commented-out `line` using the syntax of `kind`.
pub fn uncomment(kind: FileKind, line: &str) -> Cow<'_, str> {
	kind.syntax().uncomment(line)
}
