use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::FileKind;
use crate::TokenTable;
use crate::Variant;
use crate::VariantSet;
use crate::VswError;
use crate::VswResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["vswitch.toml", ".vswitch.toml", ".config/vswitch.toml"];

/// Configuration loaded from a `vswitch.toml` file.
///
/// ```toml
/// anchor = "AndroidManifest.xml"
///
/// [variants.lite]
/// tokens = ["cx.hell.android.pdfview.", "package cx.hell.android.pdfview;"]
/// package_dirs = ["src/cx/hell/android/pdfview"]
///
/// [variants.pro]
/// tokens = ["cx.hell.android.pdfviewpro.", "package cx.hell.android.pdfviewpro;"]
/// package_dirs = ["src/cx/hell/android/pdfviewpro"]
///
/// [[targets]]
/// kind = "java"
/// root = "src"
/// patterns = ["*.java"]
///
/// [exclude]
/// patterns = ["build/"]
/// ```
#[derive(Debug, Deserialize)]
pub struct VswitchConfig {
	/// A file that must exist at the project root before anything is touched.
	/// Guards against running the switch from the wrong directory.
	#[serde(default)]
	pub anchor: Option<PathBuf>,
	/// Variant definitions keyed by variant name.
	#[serde(default)]
	pub variants: BTreeMap<String, VariantConfig>,
	/// Which files to process and how to comment them. When absent, every
	/// supported kind is searched from the project root.
	#[serde(default)]
	pub targets: Option<Vec<TargetConfig>>,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

/// Settings for a single `[variants.NAME]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantConfig {
	/// Variant specific strings, aligned by position with every other
	/// variant's list.
	#[serde(default)]
	pub tokens: Vec<String>,
	/// Source directories that are named differently per variant, aligned by
	/// position with every other variant's list.
	#[serde(default)]
	pub package_dirs: Vec<PathBuf>,
}

/// A set of files processed with one comment syntax.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
	/// File kind tag: `java`, `c`, `html` or `xml`. Kept as a string so an
	/// unknown tag only fails the files it applies to.
	pub kind: String,
	/// Directory to search, relative to the project root.
	#[serde(default)]
	pub root: PathBuf,
	/// File name globs. Defaults to the kind's usual extensions.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl TargetConfig {
	/// The default target for a file kind, rooted at the project root.
	pub fn for_kind(kind: FileKind) -> Self {
		Self {
			kind: kind.as_str().to_string(),
			root: PathBuf::new(),
			patterns: Vec::new(),
		}
	}

	/// File name patterns, falling back to the kind's defaults when none are
	/// configured and the kind is known.
	pub fn effective_patterns(&self) -> Vec<String> {
		if !self.patterns.is_empty() {
			return self.patterns.clone();
		}

		self.kind
			.parse::<FileKind>()
			.map(|kind| {
				kind.default_patterns()
					.iter()
					.map(ToString::to_string)
					.collect()
			})
			.unwrap_or_default()
	}
}

/// Configuration for excluding files and directories from scanning.
///
/// Patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl VswitchConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no file exists.
	pub fn load(root: &Path) -> VswResult<Option<VswitchConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)
			.map_err(|e| VswError::file_io(&config_path, e))?;

		Self::parse(&content).map(Some)
	}

	/// Parse config from TOML text.
	pub fn parse(content: &str) -> VswResult<VswitchConfig> {
		toml::from_str(content).map_err(|e| VswError::ConfigParse(e.to_string()))
	}

	/// Like [`VswitchConfig::load`], but a missing file is an error.
	pub fn load_required(root: &Path) -> VswResult<VswitchConfig> {
		Self::load(root)?.ok_or_else(|| VswError::MissingConfig(root.display().to_string()))
	}

	/// The configured targets, or one default target per supported kind.
	pub fn effective_targets(&self) -> Vec<TargetConfig> {
		match &self.targets {
			Some(targets) => targets.clone(),
			None => FileKind::ALL.into_iter().map(TargetConfig::for_kind).collect(),
		}
	}

	/// Validate the variant tables once and build the context that the switch
	/// engine runs with.
	pub fn validate(&self) -> VswResult<VariantContext> {
		if self.variants.is_empty() {
			return Err(VswError::NoVariants);
		}

		let variants = VariantSet::new(self.variants.keys().cloned());
		let tokens = TokenTable::new(
			self.variants
				.iter()
				.map(|(name, variant)| (Variant::new(name.clone()), variant.tokens.clone()))
				.collect(),
		)?;

		let dir_width = self
			.variants
			.values()
			.map(|variant| variant.package_dirs.len())
			.max()
			.unwrap_or(0);
		for (name, variant) in &self.variants {
			if variant.package_dirs.len() != dir_width {
				return Err(VswError::MisalignedPackageDirs {
					variant: name.clone(),
					expected: dir_width,
					got: variant.package_dirs.len(),
				});
			}
		}

		let package_dirs = self
			.variants
			.iter()
			.map(|(name, variant)| (Variant::new(name.clone()), variant.package_dirs.clone()))
			.collect();

		Ok(VariantContext {
			variants,
			tokens,
			package_dirs,
		})
	}
}

/// Validated variant configuration passed into the switch engine.
#[derive(Debug, Clone, Default)]
pub struct VariantContext {
	pub variants: VariantSet,
	pub tokens: TokenTable,
	pub package_dirs: BTreeMap<Variant, Vec<PathBuf>>,
}

impl VariantContext {
	/// Resolve the target variant, failing before any file is touched when the
	/// name is not configured.
	pub fn resolve(&self, name: &str) -> VswResult<Variant> {
		self.variants.resolve(name)
	}
}
