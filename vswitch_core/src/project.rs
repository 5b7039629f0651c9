use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Serialize;

use crate::Variant;
use crate::VswError;
use crate::VswResult;
use crate::config::TargetConfig;
use crate::config::VariantContext;
use crate::config::VswitchConfig;

/// A loaded and validated project, ready to be switched.
#[derive(Debug)]
pub struct ProjectContext {
	/// The project root every relative path is resolved against.
	pub root: PathBuf,
	/// The parsed config file.
	pub config: VswitchConfig,
	/// Validated variant set, token table and package dirs.
	pub variants: VariantContext,
}

impl ProjectContext {
	/// Resolve the target variant name against the configured set.
	pub fn resolve_variant(&self, name: &str) -> VswResult<Variant> {
		self.variants.resolve(name)
	}

	/// Collect every file the configured targets select.
	pub fn collect_files(&self) -> VswResult<Vec<TargetFile>> {
		collect_target_files(
			&self.root,
			&self.config.effective_targets(),
			&self.config.exclude.patterns,
			self.config.exclude.disable_gitignore,
		)
	}
}

/// Load `vswitch.toml` from `root`, validate it and check the anchor file.
/// Any failure here aborts the run before a single file is read.
pub fn load_project(root: &Path) -> VswResult<ProjectContext> {
	let config = VswitchConfig::load_required(root)?;
	let variants = config.validate()?;

	if let Some(anchor) = &config.anchor {
		let anchor_path = root.join(anchor);
		if !anchor_path.exists() {
			return Err(VswError::MissingAnchor(anchor.display().to_string()));
		}
	}

	for overlap in variants.tokens.overlaps() {
		tracing::warn!(
			outer = %overlap.outer,
			outer_variant = %overlap.outer_variant,
			inner = %overlap.inner,
			inner_variant = %overlap.inner_variant,
			"token contains another variant's token, switching may substitute twice"
		);
	}

	Ok(ProjectContext {
		root: root.to_path_buf(),
		config,
		variants,
	})
}

/// A file selected for processing together with the kind tag of the target
/// that selected it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TargetFile {
	pub path: PathBuf,
	pub kind: String,
}

/// Walk each target's root and collect files whose name matches one of its
/// patterns. The result is sorted and free of duplicates.
pub fn collect_target_files(
	root: &Path,
	targets: &[TargetConfig],
	exclude_patterns: &[String],
	disable_gitignore: bool,
) -> VswResult<Vec<TargetFile>> {
	let gitignore = if disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, exclude_patterns)?;
	let mut selected = BTreeSet::new();

	for target in targets {
		let patterns = build_glob_set(&target.effective_patterns())?;
		let target_root = root.join(&target.root);
		let mut files = Vec::new();
		let mut visited_dirs = HashSet::new();

		walk_dir(
			&target_root,
			&mut files,
			&gitignore,
			&custom_exclude,
			&mut visited_dirs,
		)?;

		for path in files {
			let matches = path
				.file_name()
				.is_some_and(|name| patterns.is_match(Path::new(name)));
			if matches {
				selected.insert(TargetFile {
					path,
					kind: target.kind.clone(),
				});
			}
		}
	}

	Ok(selected.into_iter().collect())
}

/// Build a `GlobSet` from file name patterns.
fn build_glob_set(patterns: &[String]) -> VswResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			VswError::ConfigParse(format!("invalid target pattern `{pattern}`: {e}"))
		})?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| VswError::ConfigParse(format!("failed to build target patterns: {e}")))
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> VswResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			VswError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| VswError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	gitignore: &Gitignore,
	custom_exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
) -> VswResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Symlinked directories can loop back on themselves.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Ok(());
	}

	let entries = std::fs::read_dir(dir).map_err(|e| VswError::file_io(dir, e))?;

	for entry in entries {
		let entry = entry.map_err(|e| VswError::file_io(dir, e))?;
		let path = entry.path();
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|n| n.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if gitignore.matched(&path, is_dir).is_ignore()
			|| custom_exclude.matched(&path, is_dir).is_ignore()
		{
			continue;
		}

		if is_dir {
			walk_dir(&path, files, gitignore, custom_exclude, visited_dirs)?;
		} else {
			files.push(path);
		}
	}

	Ok(())
}

/// A directory rename needed to bring a package directory to the target
/// variant's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirRename {
	pub from: PathBuf,
	pub to: PathBuf,
}

/// Work out which package directories must be renamed for `target`.
///
/// For every position of the target's `package_dirs`, exactly one other
/// variant's directory at the same position must exist when the target's
/// own directory is absent. A path that exists but is not a directory is
/// skipped with a warning.
pub fn plan_package_dirs(
	root: &Path,
	variants: &VariantContext,
	target: &Variant,
) -> VswResult<Vec<DirRename>> {
	let Some(target_dirs) = variants.package_dirs.get(target) else {
		return Ok(Vec::new());
	};

	let mut renames = Vec::new();

	for (index, dir) in target_dirs.iter().enumerate() {
		let target_path = root.join(dir);

		if target_path.exists() {
			if target_path.is_dir() {
				tracing::debug!(dir = %dir.display(), "package dir already in place");
			} else {
				tracing::warn!(dir = %dir.display(), "package dir exists but is not a directory");
			}
			continue;
		}

		let mut found: Option<PathBuf> = None;
		for (variant, other_dirs) in &variants.package_dirs {
			if variant == target {
				continue;
			}

			let Some(other) = other_dirs.get(index) else {
				continue;
			};
			let other_path = root.join(other);
			if !other_path.is_dir() {
				continue;
			}

			if let Some(first) = &found {
				return Err(VswError::AmbiguousPackageDir {
					target: dir.display().to_string(),
					first: first.display().to_string(),
					second: other.display().to_string(),
				});
			}
			found = Some(other.clone());
		}

		let Some(from) = found else {
			return Err(VswError::MissingPackageDir(dir.display().to_string()));
		};

		renames.push(DirRename {
			from: root.join(from),
			to: target_path,
		});
	}

	Ok(renames)
}

/// Perform planned package directory renames.
pub fn apply_package_dirs(renames: &[DirRename]) -> VswResult<()> {
	for rename in renames {
		std::fs::rename(&rename.from, &rename.to).map_err(|e| VswError::file_io(&rename.from, e))?;
		tracing::debug!(
			from = %rename.from.display(),
			to = %rename.to.display(),
			"renamed package dir"
		);
	}

	Ok(())
}
