use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use vswitch_cli::Commands;
use vswitch_cli::OutputFormat;
use vswitch_cli::VswitchCli;
use vswitch_core::ErrorPolicy;
use vswitch_core::FileFailure;
use vswitch_core::SwitchPlan;
use vswitch_core::VswError;
use vswitch_core::apply_plan;
use vswitch_core::config::VswitchConfig;
use vswitch_core::plan_switch;
use vswitch_core::project::DirRename;
use vswitch_core::project::ProjectContext;
use vswitch_core::project::apply_package_dirs;
use vswitch_core::project::load_project;
use vswitch_core::project::plan_package_dirs;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = "# vswitch configuration\n#\n# Mark variant specific code in your \
                             sources with directive comments:\n#\n#   // #ifdef pro\n#   \
                             enablePremium();\n#   // #endif\n#\n# and run `vswitch switch pro` \
                             to make that block live.\n\n# A file that must exist at the project \
                             root before anything is rewritten.\n# anchor = \
                             \"AndroidManifest.xml\"\n\n[variants.lite]\n# Tokens are matched by \
                             position across variants.\ntokens = []\n# package_dirs = \
                             [\"src/com/example/app\"]\n\n[variants.pro]\ntokens = []\n# \
                             package_dirs = [\"src/com/example/apppro\"]\n\n# Without [[targets]] \
                             every java, c, html and xml file is processed.\n# [[targets]]\n# \
                             kind = \"java\"\n# root = \"src\"\n# patterns = \
                             [\"*.java\"]\n\n# [exclude]\n# patterns = [\"build/\"]\n";

fn main() {
	let args = VswitchCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminal support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Switch {
			variant,
			dry_run,
			strict,
		}) => run_switch(&args, variant, *dry_run, *strict),
		Some(Commands::Check {
			variant,
			diff,
			format,
		}) => run_check(&args, variant, *diff, *format),
		Some(Commands::Status) => run_status(&args),
		None => {
			eprintln!("No subcommand specified. Run `vswitch --help` for usage.");
			process::exit(2);
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			match e.downcast::<VswError>() {
				Ok(vsw_err) => {
					let report: miette::Report = (*vsw_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `VSWITCH_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose {
		"vswitch_core=debug"
	} else {
		"warn"
	};
	let filter = EnvFilter::try_from_env("VSWITCH_LOG")
		.unwrap_or_else(|_| EnvFilter::new(default_directive));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init();
}

type CmdResult = Result<bool, Box<dyn std::error::Error>>;

fn resolve_root(args: &VswitchCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_init(args: &VswitchCli) -> CmdResult {
	let root = resolve_root(args);

	if let Some(existing) = VswitchConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(true);
	}

	let config_path = root.join("vswitch.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)
		.map_err(|e| VswError::file_io(&config_path, e))?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Declare your variants and their tokens in vswitch.toml");
	println!("  2. Wrap variant specific code in directive comments:");
	println!("     // #ifdef pro");
	println!("     // #endif");
	println!("  3. Run `vswitch switch pro`");

	Ok(true)
}

/// Everything a switch to one variant would do.
struct Preview {
	renames: Vec<DirRename>,
	plan: SwitchPlan,
}

impl Preview {
	fn is_clean(&self) -> bool {
		self.renames.is_empty() && self.plan.is_clean()
	}
}

fn preview(ctx: &ProjectContext, variant: &str) -> Result<Preview, VswError> {
	let target = ctx.resolve_variant(variant)?;
	let renames = plan_package_dirs(&ctx.root, &ctx.variants, &target)?;
	let files = ctx.collect_files()?;
	let plan = plan_switch(&target, &ctx.variants.tokens, &files);

	Ok(Preview { renames, plan })
}

fn run_switch(args: &VswitchCli, variant: &str, dry_run: bool, strict: bool) -> CmdResult {
	let root = resolve_root(args);
	let ctx = load_project(&root)?;
	let target = ctx.resolve_variant(variant)?;
	let renames = plan_package_dirs(&root, &ctx.variants, &target)?;

	if dry_run {
		let files = ctx.collect_files()?;
		let plan = plan_switch(&target, &ctx.variants.tokens, &files);
		print_failures(&plan.failures, &root);

		if renames.is_empty() && plan.changes.is_empty() {
			println!("Already switched to `{variant}`.");
			return Ok(!plan.has_failures());
		}

		println!(
			"Dry run: would rename {} dir(s) and rewrite {} file(s) for `{variant}`:",
			renames.len(),
			plan.changes.len()
		);
		for rename in &renames {
			println!(
				"  {} -> {}",
				make_relative(&rename.from, &root),
				make_relative(&rename.to, &root)
			);
		}
		for change in &plan.changes {
			println!("  {}", make_relative(&change.path, &root));
		}

		return Ok(!plan.has_failures());
	}

	apply_package_dirs(&renames)?;
	for rename in &renames {
		println!(
			"Renamed {} -> {}",
			make_relative(&rename.from, &root),
			make_relative(&rename.to, &root)
		);
	}

	// Discover files after the renames so paths point at the new dirs.
	let files = ctx.collect_files()?;
	let plan = plan_switch(&target, &ctx.variants.tokens, &files);
	let policy = if strict {
		ErrorPolicy::Abort
	} else {
		ErrorPolicy::Continue
	};
	tracing::debug!(
		variant,
		?policy,
		changes = plan.changes.len(),
		failures = plan.failures.len(),
		"applying switch plan"
	);
	let result = apply_plan(&plan, policy);
	print_failures(&plan.failures, &root);
	print_failures(&result.failures, &root);

	if result.aborted {
		if result.written.is_empty() {
			eprintln!(
				"{} {} file(s) failed, nothing written.",
				colored!("error:", red),
				plan.failures.len() + result.failures.len()
			);
		} else {
			eprintln!(
				"{} write failed, stopped after switching {} file(s):",
				colored!("error:", red),
				result.written.len()
			);
			for path in &result.written {
				eprintln!("  {}", make_relative(path, &root));
			}
		}
		return Ok(false);
	}

	let ok = !plan.has_failures() && !result.has_failures();
	if !result.written.is_empty() {
		println!(
			"Switched {} file(s) to `{variant}`.",
			result.written.len()
		);
		if args.verbose {
			for path in &result.written {
				println!("  {}", make_relative(path, &root));
			}
		}
	} else if ok {
		println!("All files are already switched to `{variant}`.");
	}

	Ok(ok)
}

fn run_check(args: &VswitchCli, variant: &str, show_diff: bool, format: OutputFormat) -> CmdResult {
	let root = resolve_root(args);
	let ctx = load_project(&root)?;
	let preview = preview(&ctx, variant)?;
	let plan = &preview.plan;

	match format {
		OutputFormat::Json => {
			let renames: Vec<serde_json::Value> = preview
				.renames
				.iter()
				.map(|rename| {
					serde_json::json!({
						"from": make_relative(&rename.from, &root),
						"to": make_relative(&rename.to, &root),
					})
				})
				.collect();
			let changes: Vec<serde_json::Value> = plan
				.changes
				.iter()
				.map(|change| {
					serde_json::json!({
						"file": make_relative(&change.path, &root),
						"kind": change.kind.as_str(),
						"changed_lines": change.changed_lines(),
					})
				})
				.collect();
			let failures: Vec<serde_json::Value> = plan
				.failures
				.iter()
				.map(|failure| {
					serde_json::json!({
						"file": make_relative(&failure.path, &root),
						"message": failure.error.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": preview.is_clean(),
				"variant": variant,
				"renames": renames,
				"changes": changes,
				"errors": failures,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for failure in &plan.failures {
				let rel = make_relative(&failure.path, &root);
				match &failure.error {
					VswError::UnbalancedDirective { line, .. } => {
						println!("::error file={rel},line={line}::{}", failure.error);
					}
					error => println!("::error file={rel}::{error}"),
				}
			}
			for rename in &preview.renames {
				println!(
					"::warning file={}::Package directory should be renamed to {}",
					make_relative(&rename.from, &root),
					make_relative(&rename.to, &root)
				);
			}
			for change in &plan.changes {
				println!(
					"::warning file={}::File is not switched to variant `{variant}` ({} line(s) \
					 differ)",
					make_relative(&change.path, &root),
					change.changed_lines()
				);
			}
			if preview.is_clean() {
				println!("Project is switched to `{variant}`.");
			} else {
				eprintln!("{}", check_summary(&preview, variant));
			}
		}
		OutputFormat::Text => {
			if preview.is_clean() {
				println!("Check passed: project is switched to `{variant}`.");
				return Ok(true);
			}

			eprintln!("Check failed.");
			print_failures(&plan.failures, &root);

			if !preview.renames.is_empty() {
				eprintln!();
				eprintln!("Package dirs to rename:");
				for rename in &preview.renames {
					eprintln!(
						"  {} -> {}",
						make_relative(&rename.from, &root),
						make_relative(&rename.to, &root)
					);
				}
			}

			if !plan.changes.is_empty() {
				eprintln!();
				eprintln!("Files to rewrite:");
				for change in &plan.changes {
					eprintln!(
						"  {} ({} line(s))",
						make_relative(&change.path, &root),
						change.changed_lines()
					);
					if show_diff {
						print_diff(&change.original, &change.updated);
					}
				}
			}

			eprintln!();
			eprintln!("{}", check_summary(&preview, variant));
		}
	}

	Ok(preview.is_clean())
}

fn check_summary(preview: &Preview, variant: &str) -> String {
	let mut parts = Vec::new();
	if !preview.plan.failures.is_empty() {
		parts.push(format!("{} file(s) failed", preview.plan.failures.len()));
	}
	if !preview.renames.is_empty() {
		parts.push(format!("{} dir(s) need renaming", preview.renames.len()));
	}
	if !preview.plan.changes.is_empty() {
		parts.push(format!(
			"{} file(s) are not switched",
			preview.plan.changes.len()
		));
	}
	format!(
		"{}. Run `vswitch switch {variant}` to fix.",
		parts.join(" and ")
	)
}

fn run_status(args: &VswitchCli) -> CmdResult {
	let root = resolve_root(args);
	let ctx = load_project(&root)?;
	let mut current = Vec::new();

	println!("{}", colored!("Variants", bold));
	for variant in ctx.variants.variants.iter() {
		match preview(&ctx, variant) {
			Ok(preview) => {
				let state = if preview.is_clean() {
					current.push(variant.to_string());
					colored!("current", green)
				} else {
					colored!(
						format!(
							"{} file(s), {} dir(s) to switch",
							preview.plan.changes.len(),
							preview.renames.len()
						),
						yellow
					)
				};
				let failures = if preview.plan.has_failures() {
					format!(", {} failed", preview.plan.failures.len())
				} else {
					String::new()
				};
				println!("  {:<16} {state}{failures}", variant.as_str());
			}
			Err(error) => {
				println!(
					"  {:<16} {}",
					variant.as_str(),
					colored!(error.to_string(), red)
				);
			}
		}
	}

	println!();
	if current.is_empty() {
		println!("The project is not fully switched to any variant.");
	} else {
		println!("Current variant(s): {}", current.join(", "));
	}

	Ok(true)
}

fn print_failures(failures: &[FileFailure], root: &Path) {
	for failure in failures {
		let rel = make_relative(&failure.path, root);
		eprintln!(
			"{} {rel}: {}",
			colored!("error:", red),
			failure.error
		);
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
