use logos::Logos;

/// Raw tokens produced by logos for a single line of source text. Anything
/// that is not one of these tokens surfaces as a lexer error and simply
/// breaks a directive sequence.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	/// A run of slashes still ends in `//`, so `/// #ifdef` counts.
	#[regex("//+")]
	LineComment,
	#[token("<!--")]
	BracketComment,
	#[token("#ifdef")]
	Ifdef,
	#[token("#endif")]
	Endif,
	#[regex(r"[ \t\r\n\x0B\x0C]+")]
	Whitespace,
	#[regex(r"[a-zA-Z]+")]
	Name,
}

/// A directive marker recognized on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
	/// `// #ifdef NAME` or `<!-- #ifdef NAME -->`.
	Open(&'a str),
	/// `// #endif` or `<!-- #endif -->`.
	Close,
}

/// Position within the directive pattern while walking the token stream.
#[derive(Debug, Clone, Copy)]
enum State {
	Outside,
	/// Seen a comment token.
	Comment,
	/// Seen a comment token followed by whitespace.
	CommentSpace,
	/// Seen `#ifdef` after a comment token and whitespace.
	Ifdef,
	/// Seen whitespace after `#ifdef`.
	IfdefSpace,
}

/// Find the first opening directive on `line`.
///
/// The marker may appear anywhere in the line and the comment token does not
/// have to match the file's own comment syntax.
pub fn find_open_directive(line: &str) -> Option<&str> {
	let mut state = State::Outside;

	for (token, span) in RawToken::lexer(line).spanned() {
		state = match (state, token) {
			(_, Ok(RawToken::LineComment | RawToken::BracketComment)) => State::Comment,
			(State::Comment, Ok(RawToken::Whitespace)) => State::CommentSpace,
			(State::CommentSpace, Ok(RawToken::Ifdef)) => State::Ifdef,
			(State::Ifdef, Ok(RawToken::Whitespace)) => State::IfdefSpace,
			(State::IfdefSpace, Ok(RawToken::Name)) => return Some(&line[span]),
			_ => State::Outside,
		};
	}

	None
}

/// Returns true when `line` contains a closing directive.
pub fn has_close_directive(line: &str) -> bool {
	let mut state = State::Outside;

	for token in RawToken::lexer(line) {
		state = match (state, token) {
			(_, Ok(RawToken::LineComment | RawToken::BracketComment)) => State::Comment,
			(State::Comment, Ok(RawToken::Whitespace)) => State::CommentSpace,
			(State::CommentSpace, Ok(RawToken::Endif)) => return true,
			_ => State::Outside,
		};
	}

	false
}

/// Classify a line as an opening directive, a closing directive or neither.
/// Opening markers take precedence when a line carries both.
pub fn scan_directive(line: &str) -> Option<Directive<'_>> {
	if let Some(name) = find_open_directive(line) {
		return Some(Directive::Open(name));
	}

	has_close_directive(line).then_some(Directive::Close)
}
