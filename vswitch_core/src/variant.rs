use std::borrow::Borrow;
use std::collections::BTreeMap;

use derive_more::Deref;
use derive_more::Display;
use serde::Serialize;

use crate::VswError;
use crate::VswResult;

/// The name of a product variant, e.g. `lite` or `pro`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Display, Serialize)]
pub struct Variant(String);

impl Variant {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for Variant {
	fn borrow(&self) -> &str {
		&self.0
	}
}

/// The fixed set of variants known to a project. Names are kept sorted.
#[derive(Debug, Clone, Default)]
pub struct VariantSet(Vec<Variant>);

impl VariantSet {
	pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
		let mut variants: Vec<Variant> = names.into_iter().map(Variant::new).collect();
		variants.sort();
		variants.dedup();
		Self(variants)
	}

	/// Resolve a user supplied name to a known variant.
	pub fn resolve(&self, name: &str) -> VswResult<Variant> {
		self.0
			.iter()
			.find(|variant| variant.as_str() == name)
			.cloned()
			.ok_or_else(|| {
				VswError::UnknownVariant {
					name: name.to_string(),
					known: self.names().join(", "),
				}
			})
	}

	pub fn names(&self) -> Vec<&str> {
		self.0.iter().map(Variant::as_str).collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Variant> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Per-variant token lists, aligned by position: the token at index `i` of
/// one variant is the substitute for the token at index `i` of every other
/// variant.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
	tokens: BTreeMap<Variant, Vec<String>>,
	width: usize,
}

/// Two tokens of different variants where one contains the other. Switching
/// to the variant owning `outer` can then match `inner` again inside text that
/// was just substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenOverlap {
	pub outer_variant: Variant,
	pub outer: String,
	pub inner_variant: Variant,
	pub inner: String,
}

impl TokenTable {
	/// Build a table, checking that every variant declares the same number of
	/// tokens.
	pub fn new(tokens: BTreeMap<Variant, Vec<String>>) -> VswResult<Self> {
		let width = tokens.values().map(Vec::len).max().unwrap_or(0);

		for (variant, list) in &tokens {
			if list.len() != width {
				return Err(VswError::MisalignedTokens {
					variant: variant.to_string(),
					expected: width,
					got: list.len(),
				});
			}
		}

		Ok(Self { tokens, width })
	}

	/// Number of token positions.
	pub fn width(&self) -> usize {
		self.width
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0
	}

	/// Tokens declared for `variant`.
	pub fn tokens(&self, variant: &str) -> Option<&[String]> {
		self.tokens.get(variant).map(Vec::as_slice)
	}

	/// Find tokens that contain a different variant's token. These are not
	/// rejected, since the caller may know the text never lines up, but a
	/// switch involving them is not guaranteed to round-trip.
	pub fn overlaps(&self) -> Vec<TokenOverlap> {
		let mut overlaps = Vec::new();

		for (outer_variant, outer_tokens) in &self.tokens {
			for (inner_variant, inner_tokens) in &self.tokens {
				if outer_variant == inner_variant {
					continue;
				}

				for outer in outer_tokens {
					for inner in inner_tokens {
						if !inner.is_empty() && outer != inner && outer.contains(inner.as_str()) {
							overlaps.push(TokenOverlap {
								outer_variant: outer_variant.clone(),
								outer: outer.clone(),
								inner_variant: inner_variant.clone(),
								inner: inner.clone(),
							});
						}
					}
				}
			}
		}

		overlaps
	}

	/// The `(from, to)` replacement pairs that convert any other variant's
	/// tokens into `target`'s, in application order: token index first, then
	/// source variant name.
	pub fn replacements<'a>(&'a self, target: &str) -> Vec<(&'a str, &'a str)> {
		let Some(target_tokens) = self.tokens.get(target) else {
			return Vec::new();
		};

		let mut pairs = Vec::new();
		for (index, to) in target_tokens.iter().enumerate() {
			for (variant, source_tokens) in &self.tokens {
				if variant.as_str() == target {
					continue;
				}

				let from = source_tokens[index].as_str();
				if !from.is_empty() && from != to {
					pairs.push((from, to.as_str()));
				}
			}
		}

		pairs
	}
}

/// Replace every non-target variant's tokens in `lines` with the target's.
///
/// Replacements are applied in sequence, so later ones see the output of
/// earlier ones. Token lists must be chosen so that a target token never
/// contains a source token; see [`TokenTable::overlaps`].
pub fn substitute_tokens<S: AsRef<str>>(
	target: &str,
	table: &TokenTable,
	lines: &[S],
) -> Vec<String> {
	let pairs = table.replacements(target);

	lines
		.iter()
		.map(|line| {
			let mut line = line.as_ref().to_string();
			for &(from, to) in &pairs {
				if line.contains(from) {
					line = line.replace(from, to);
				}
			}
			line
		})
		.collect()
}
