use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum VswError {
	#[error(transparent)]
	#[diagnostic(code(vswitch::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to access `{path}`: {source}")]
	#[diagnostic(code(vswitch::file_io))]
	FileIo {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("`{path}` is not valid UTF-8 (first invalid byte at offset {offset})")]
	#[diagnostic(
		code(vswitch::invalid_encoding),
		help(
			"only UTF-8 sources are rewritten; convert the file first, e.g. `iconv -f latin1 -t \
			 utf-8`, or exclude it"
		)
	)]
	InvalidEncoding { path: PathBuf, offset: usize },

	#[error("unsupported file kind: `{0}`")]
	#[diagnostic(
		code(vswitch::unsupported_file_kind),
		help("supported file kinds: java, c, html, xml")
	)]
	UnsupportedFileKind(String),

	#[error("unbalanced directive in {file} at line {line}")]
	#[diagnostic(
		code(vswitch::unbalanced_directive),
		help("every `#ifdef NAME` marker needs a matching `#endif` marker")
	)]
	UnbalancedDirective { file: String, line: usize },

	#[error("unknown variant: `{name}`")]
	#[diagnostic(
		code(vswitch::unknown_variant),
		help("known variants: {known}")
	)]
	UnknownVariant { name: String, known: String },

	#[error("no variants configured")]
	#[diagnostic(
		code(vswitch::no_variants),
		help("declare at least one `[variants.NAME]` table in vswitch.toml")
	)]
	NoVariants,

	#[error("variant `{variant}` declares {got} token(s), expected {expected}")]
	#[diagnostic(
		code(vswitch::misaligned_tokens),
		help("token lists are matched by position, so every variant needs the same number of tokens")
	)]
	MisalignedTokens {
		variant: String,
		expected: usize,
		got: usize,
	},

	#[error("variant `{variant}` declares {got} package dir(s), expected {expected}")]
	#[diagnostic(
		code(vswitch::misaligned_package_dirs),
		help("package dirs are matched by position, so every variant needs the same number of entries")
	)]
	MisalignedPackageDirs {
		variant: String,
		expected: usize,
		got: usize,
	},

	#[error("no config file found in `{0}`")]
	#[diagnostic(
		code(vswitch::missing_config),
		help("run `vswitch init` to create a vswitch.toml")
	)]
	MissingConfig(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(vswitch::config_parse),
		help("check that vswitch.toml is valid TOML with [variants.NAME] tables")
	)]
	ConfigParse(String),

	#[error("anchor file not found: `{0}`")]
	#[diagnostic(
		code(vswitch::missing_anchor),
		help("run vswitch from the project root, or pass `--path`")
	)]
	MissingAnchor(String),

	#[error("package directory `{0}` not found under any variant name")]
	#[diagnostic(code(vswitch::missing_package_dir))]
	MissingPackageDir(String),

	#[error("too many candidates for package directory `{target}`: `{first}` and `{second}`")]
	#[diagnostic(
		code(vswitch::ambiguous_package_dir),
		help("remove the stale copy so only one variant's directory exists")
	)]
	AmbiguousPackageDir {
		target: String,
		first: String,
		second: String,
	},
}

impl VswError {
	/// Wrap an I/O error with the path it relates to.
	pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::FileIo {
			path: path.into(),
			source,
		}
	}
}

pub type VswResult<T> = Result<T, VswError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
