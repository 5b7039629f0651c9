use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use rayon::prelude::*;
use serde::Serialize;

use crate::FileKind;
use crate::TokenTable;
use crate::Variant;
use crate::VswError;
use crate::VswResult;
use crate::project::TargetFile;
use crate::substitute_tokens;
use crate::toggler::split_lines;
use crate::toggle_comments;

/// Run token substitution and then comment toggling over file content.
///
/// Returns the rewritten content; it equals `content` when the file is
/// already in the target variant.
pub fn process_content(
	target: &str,
	tokens: &TokenTable,
	kind: FileKind,
	content: &str,
	source: &str,
) -> VswResult<String> {
	let lines = split_lines(content);
	let substituted = substitute_tokens(target, tokens, &lines);
	let toggled = toggle_comments(target, kind, &substituted, source)?;
	Ok(toggled.concat())
}

/// Overwrite `path` with `new_content`, but only when the bytes differ.
///
/// The content is written to a temporary sibling first and then renamed
/// over the original, so an interrupted write leaves the old file intact.
/// Returns `true` when the file was written.
pub fn rewrite_file_if_changed(path: &Path, new_content: &str) -> VswResult<bool> {
	let current = std::fs::read(path).map_err(|e| VswError::file_io(path, e))?;
	if current == new_content.as_bytes() {
		tracing::debug!(file = %path.display(), "file didn't change, no need to rewrite");
		return Ok(false);
	}

	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let temp_path = path.with_file_name(format!(
		".{file_name}.vswitch-{}-{}",
		std::process::id(),
		std::time::SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	if let Err(e) = std::fs::write(&temp_path, new_content) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(VswError::file_io(&temp_path, e));
	}

	copy_permissions(path, &temp_path);

	if let Err(e) = std::fs::rename(&temp_path, path) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(VswError::file_io(path, e));
	}

	tracing::debug!(file = %path.display(), "file changed, rewritten");
	Ok(true)
}

/// Give `to` the permissions of `from`. A failure leaves the default
/// permissions of a new file in place.
pub(crate) fn copy_permissions(from: &Path, to: &Path) {
	let result = std::fs::metadata(from)
		.and_then(|metadata| std::fs::set_permissions(to, metadata.permissions()));

	if let Err(error) = result {
		tracing::warn!(
			file = %from.display(),
			%error,
			"failed to copy file permissions to the rewritten file"
		);
	}
}

/// A file whose content differs from what the target variant needs.
#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
	pub path: PathBuf,
	pub kind: FileKind,
	/// Current on-disk content.
	pub original: String,
	/// Content after switching to the target variant.
	pub updated: String,
}

impl FileChange {
	/// Number of lines that differ between the original and updated content.
	pub fn changed_lines(&self) -> usize {
		split_lines(&self.original)
			.iter()
			.zip(split_lines(&self.updated))
			.filter(|(before, after)| *before != after)
			.count()
	}
}

/// A file that could not be processed. The file is never written.
#[derive(Debug)]
pub struct FileFailure {
	pub path: PathBuf,
	pub error: VswError,
}

/// Everything a switch would do, computed without touching the disk.
#[derive(Debug)]
pub struct SwitchPlan {
	/// The variant being switched to.
	pub variant: Variant,
	/// Files whose content must change.
	pub changes: Vec<FileChange>,
	/// Number of files already in the target variant.
	pub unchanged: usize,
	/// Files that failed to process.
	pub failures: Vec<FileFailure>,
}

impl SwitchPlan {
	/// Returns true when every file is already in the target variant and no
	/// file failed.
	pub fn is_clean(&self) -> bool {
		self.changes.is_empty() && self.failures.is_empty()
	}

	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

/// What to do with successful files when some files failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
	/// Write every file that processed cleanly.
	#[default]
	Continue,
	/// Write nothing if any file failed.
	Abort,
}

/// Outcome of applying a [`SwitchPlan`].
#[derive(Debug, Default)]
pub struct ApplyResult {
	/// Files that were rewritten.
	pub written: Vec<PathBuf>,
	/// Files whose planned change could not be written.
	pub failures: Vec<FileFailure>,
	/// True when writing stopped early because of failures under
	/// [`ErrorPolicy::Abort`]. Files in `written` were already switched.
	pub aborted: bool,
}

impl ApplyResult {
	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

/// Process every file for `target` in parallel and collect the result.
pub fn plan_switch(target: &Variant, tokens: &TokenTable, files: &[TargetFile]) -> SwitchPlan {
	let outcomes: Vec<(PathBuf, VswResult<Option<FileChange>>)> = files
		.par_iter()
		.map(|file| (file.path.clone(), plan_file(target, tokens, file)))
		.collect();

	let mut changes = Vec::new();
	let mut failures = Vec::new();
	let mut unchanged = 0;

	for (path, outcome) in outcomes {
		match outcome {
			Ok(Some(change)) => changes.push(change),
			Ok(None) => unchanged += 1,
			Err(error) => failures.push(FileFailure { path, error }),
		}
	}

	SwitchPlan {
		variant: target.clone(),
		changes,
		unchanged,
		failures,
	}
}

/// Plan a switch for an explicit list of paths sharing one kind tag.
pub fn plan_switch_paths(
	target: &Variant,
	tokens: &TokenTable,
	kind: &str,
	paths: &[PathBuf],
) -> SwitchPlan {
	let files: Vec<TargetFile> = paths
		.iter()
		.map(|path| TargetFile {
			path: path.clone(),
			kind: kind.to_string(),
		})
		.collect();
	plan_switch(target, tokens, &files)
}

fn plan_file(
	target: &Variant,
	tokens: &TokenTable,
	file: &TargetFile,
) -> VswResult<Option<FileChange>> {
	let kind: FileKind = file.kind.parse()?;
	let bytes = std::fs::read(&file.path).map_err(|e| VswError::file_io(&file.path, e))?;
	let original = String::from_utf8(bytes).map_err(|e| {
		VswError::InvalidEncoding {
			path: file.path.clone(),
			offset: e.utf8_error().valid_up_to(),
		}
	})?;
	let source = file.path.display().to_string();
	let updated = process_content(target, tokens, kind, &original, &source)?;

	if updated == original {
		return Ok(None);
	}

	tracing::debug!(file = %source, "file needs switching");
	Ok(Some(FileChange {
		path: file.path.clone(),
		kind,
		original,
		updated,
	}))
}

/// Write the changes of a plan to disk according to `policy`.
///
/// Write errors never abandon the result: under [`ErrorPolicy::Continue`]
/// they are collected and the remaining files are still written, under
/// [`ErrorPolicy::Abort`] writing stops at the first one.
pub fn apply_plan(plan: &SwitchPlan, policy: ErrorPolicy) -> ApplyResult {
	let mut result = ApplyResult::default();

	if policy == ErrorPolicy::Abort && plan.has_failures() {
		tracing::debug!(
			failures = plan.failures.len(),
			"aborting switch, no files written"
		);
		result.aborted = true;
		return result;
	}

	for change in &plan.changes {
		match rewrite_file_if_changed(&change.path, &change.updated) {
			Ok(true) => result.written.push(change.path.clone()),
			Ok(false) => {}
			Err(error) => {
				tracing::warn!(file = %change.path.display(), %error, "failed to write file");
				result.failures.push(FileFailure {
					path: change.path.clone(),
					error,
				});

				if policy == ErrorPolicy::Abort {
					result.aborted = true;
					break;
				}
			}
		}
	}

	result
}
