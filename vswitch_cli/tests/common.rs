#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;
use vswitch_core::AnyEmptyResult;

pub fn vswitch_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("vswitch"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("VSWITCH_LOG");
	cmd
}

pub const CONFIG: &str = r#"anchor = "AndroidManifest.xml"

[variants.lite]
tokens = ["com.example.app.", "package com.example.app;"]
package_dirs = ["src/com/example/app"]

[variants.pro]
tokens = ["com.example.apppro.", "package com.example.apppro;"]
package_dirs = ["src/com/example/apppro"]

[[targets]]
kind = "java"
root = "src"
patterns = ["*.java"]

[[targets]]
kind = "xml"
patterns = ["*.xml"]
"#;

pub const LITE_MAIN: &str = concat!(
	"package com.example.app;\n",
	"\n",
	"import com.example.app.Options;\n",
	"\n",
	"public class Main {\n",
	"\t// #ifdef pro\n",
	"// \tunlock();\n",
	"\t// #endif\n",
	"\t// #ifdef lite\n",
	"\tshowAds();\n",
	"\t// #endif\n",
	"}\n",
);

pub const PRO_MAIN: &str = concat!(
	"package com.example.apppro;\n",
	"\n",
	"import com.example.apppro.Options;\n",
	"\n",
	"public class Main {\n",
	"\t// #ifdef pro\n",
	"\tunlock();\n",
	"\t// #endif\n",
	"\t// #ifdef lite\n",
	"// \tshowAds();\n",
	"\t// #endif\n",
	"}\n",
);

pub const LITE_MANIFEST: &str = concat!(
	"<manifest>\n",
	"<!-- #ifdef pro -->\n",
	"<!-- <activity android:name=\".Purchase\" /> -->\n",
	"<!-- #endif -->\n",
	"</manifest>\n",
);

pub const PRO_MANIFEST: &str = concat!(
	"<manifest>\n",
	"<!-- #ifdef pro -->\n",
	"<activity android:name=\".Purchase\" />\n",
	"<!-- #endif -->\n",
	"</manifest>\n",
);

/// Write a project that is currently switched to `lite`.
pub fn write_lite_project(root: &Path) -> AnyEmptyResult {
	let package = root.join("src/com/example/app");
	std::fs::create_dir_all(&package)?;
	std::fs::write(root.join("vswitch.toml"), CONFIG)?;
	std::fs::write(root.join("AndroidManifest.xml"), LITE_MANIFEST)?;
	std::fs::write(package.join("Main.java"), LITE_MAIN)?;

	Ok(())
}
