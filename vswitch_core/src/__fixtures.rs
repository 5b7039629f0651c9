use std::collections::BTreeMap;
use std::path::Path;

use crate::AnyEmptyResult;
use crate::TokenTable;
use crate::Variant;

pub const PDFVIEW_CONFIG: &str = r#"anchor = "AndroidManifest.xml"

[variants.lite]
tokens = [
	"cx.hell.android.pdfview.",
	"\"cx.hell.android.pdfview\"",
	"package cx.hell.android.pdfview;",
	"android:icon=\"@drawable/pdfviewer\"",
]
package_dirs = ["src/cx/hell/android/pdfview"]

[variants.pro]
tokens = [
	"cx.hell.android.pdfviewpro.",
	"\"cx.hell.android.pdfviewpro\"",
	"package cx.hell.android.pdfviewpro;",
	"android:icon=\"@drawable/apvpro_icon\"",
]
package_dirs = ["src/cx/hell/android/pdfviewpro"]

[[targets]]
kind = "java"
root = "src"
patterns = ["*.java"]

[[targets]]
kind = "xml"
patterns = ["*.xml"]
"#;

pub const LITE_ACTIVITY: &str = concat!(
	"package cx.hell.android.pdfview;\n",
	"\n",
	"import cx.hell.android.pdfview.Options;\n",
	"\n",
	"public class Main {\n",
	"\t// #ifdef pro\n",
	"// \tshowPurchaseDialog();\n",
	"\t// #endif\n",
	"\t// #ifdef lite\n",
	"\tshowAds();\n",
	"\t// #endif\n",
	"}\n",
);

pub const PRO_ACTIVITY: &str = concat!(
	"package cx.hell.android.pdfviewpro;\n",
	"\n",
	"import cx.hell.android.pdfviewpro.Options;\n",
	"\n",
	"public class Main {\n",
	"\t// #ifdef pro\n",
	"\tshowPurchaseDialog();\n",
	"\t// #endif\n",
	"\t// #ifdef lite\n",
	"// \tshowAds();\n",
	"\t// #endif\n",
	"}\n",
);

pub const LITE_MANIFEST: &str = concat!(
	"<manifest package=\"cx.hell.android.pdfview\">\n",
	"<application android:icon=\"@drawable/pdfviewer\">\n",
	"<!-- #ifdef pro -->\n",
	"<!-- <activity android:name=\".Purchase\" /> -->\n",
	"<!-- #endif -->\n",
	"</application>\n",
	"</manifest>\n",
);

pub const PRO_MANIFEST: &str = concat!(
	"<manifest package=\"cx.hell.android.pdfviewpro\">\n",
	"<application android:icon=\"@drawable/apvpro_icon\">\n",
	"<!-- #ifdef pro -->\n",
	"<activity android:name=\".Purchase\" />\n",
	"<!-- #endif -->\n",
	"</application>\n",
	"</manifest>\n",
);

/// The token table used by the pdfview project.
pub fn pdfview_tokens() -> TokenTable {
	let mut tokens = BTreeMap::new();
	tokens.insert(
		Variant::new("lite"),
		vec![
			"cx.hell.android.pdfview.".to_string(),
			"\"cx.hell.android.pdfview\"".to_string(),
			"package cx.hell.android.pdfview;".to_string(),
			"android:icon=\"@drawable/pdfviewer\"".to_string(),
		],
	);
	tokens.insert(
		Variant::new("pro"),
		vec![
			"cx.hell.android.pdfviewpro.".to_string(),
			"\"cx.hell.android.pdfviewpro\"".to_string(),
			"package cx.hell.android.pdfviewpro;".to_string(),
			"android:icon=\"@drawable/apvpro_icon\"".to_string(),
		],
	);

	TokenTable::new(tokens).unwrap_or_else(|e| panic!("fixture tokens are aligned: {e}"))
}

/// Write a small lite-variant pdfview project into `root`.
pub fn write_pdfview_project(root: &Path) -> AnyEmptyResult {
	let package = root.join("src/cx/hell/android/pdfview");
	std::fs::create_dir_all(&package)?;
	std::fs::write(root.join("vswitch.toml"), PDFVIEW_CONFIG)?;
	std::fs::write(root.join("AndroidManifest.xml"), LITE_MANIFEST)?;
	std::fs::write(package.join("Main.java"), LITE_ACTIVITY)?;
	std::fs::write(
		package.join("Plain.java"),
		"public class Plain {\n\tint x = 1;\n}\n",
	)?;

	Ok(())
}

/// Lines of `content`, each keeping its terminator.
pub fn lines(content: &str) -> Vec<String> {
	content.split_inclusive('\n').map(ToString::to_string).collect()
}
