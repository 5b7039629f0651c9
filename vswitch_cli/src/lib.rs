use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Switch a source tree between product variants.",
	long_about = "vswitch rewrites a source tree in place so that exactly one product variant is \
	              live.\n\nCode for each variant lives between `// #ifdef NAME` and `// #endif` \
	              markers (or `<!-- #ifdef NAME -->` in markup). Switching uncomments the target's \
	              blocks, comments out every other block, swaps variant specific tokens and \
	              renames per-variant package directories.\n\nQuick start:\n  vswitch init         \
	              Create a vswitch.toml\n  vswitch switch pro   Make `pro` the live variant\n  \
	              vswitch check pro    Verify the tree is already in `pro`\n  vswitch status       \
	              Show which variant the tree is in"
)]
pub struct VswitchCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `vswitch.toml` in the project root.
	///
	/// If a config file already exists this command is a no-op and exits
	/// successfully.
	Init,
	/// Switch the project to a variant.
	///
	/// Restores the variant's package directories, replaces other variants'
	/// tokens and toggles `#ifdef` blocks. Only files whose content changes
	/// are written.
	Switch {
		/// Name of the variant to switch to.
		variant: String,

		/// Preview changes without renaming directories or writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Write nothing when any file fails to process. By default files
		/// that processed cleanly are still written.
		#[arg(long, default_value_t = false)]
		strict: bool,
	},
	/// Check that the project is already switched to a variant.
	///
	/// Exits with a non-zero status code when a file or package directory
	/// would change. Ideal for CI.
	Check {
		/// Name of the variant the project should be in.
		variant: String,

		/// Show a unified diff for each file that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Show how far the project is from each configured variant.
	Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
	/// GitHub Actions annotation format.
	Github,
}
