use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use minijinja::{context, Environment};
use regex::Regex;

use crate::error::DocumentError;
use crate::schema::Schema;

pub const MANIFEST_TEMPLATE_NAME: &str = "index.ts.tpl";
const MANIFEST_TEMPLATE: &str = include_str!("../templates/index.ts.tpl");

static HUMP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_](\w)").unwrap());

/// Write `<output_dir>/<name>.json`. The JSON goes to a temporary sibling first
/// and is renamed into place, so a failed write never leaves a partial file.
pub fn persist_schema(schema: &Schema, output_dir: &Path) -> Result<PathBuf, DocumentError> {
    let json = serde_json::to_string(schema)?;
    let path = output_dir.join(format!("{}.json", schema.name));
    let tmp = output_dir.join(format!("{}.json.tmp", schema.name));

    fs::write(&tmp, json).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        DocumentError::Write {
            path: tmp.clone(),
            source,
        }
    })?;
    fs::rename(&tmp, &path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        DocumentError::Write {
            path: path.clone(),
            source,
        }
    })?;
    Ok(path)
}

/// `dual-axes` -> `dualAxes`, `bidirectional_bar` -> `bidirectionalBar`.
pub fn var_hump_filter(value: &str) -> String {
    HUMP_RE
        .replace_all(value, |caps: &regex::Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Render the manifest listing every persisted schema. Uses `index.ts.tpl`
/// from `template_dir` when given, the built-in template otherwise.
pub fn render_manifest(names: &[String], template_dir: Option<&Path>) -> Result<String> {
    let mut env = Environment::new();
    env.add_filter("var_hump_filter", var_hump_filter);
    match template_dir {
        Some(dir) => env.set_loader(minijinja::path_loader(dir.to_path_buf())),
        None => env.add_template(MANIFEST_TEMPLATE_NAME, MANIFEST_TEMPLATE)?,
    }

    let template = env
        .get_template(MANIFEST_TEMPLATE_NAME)
        .context("Failed to load manifest template")?;
    let rendered = template
        .render(context! { data => names })
        .context("Failed to render manifest")?;
    Ok(rendered)
}

pub fn write_manifest(contents: &str, output_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = output_dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeDescriptor;

    #[test]
    fn hump_filter() {
        assert_eq!(var_hump_filter("dual-axes"), "dualAxes");
        assert_eq!(var_hump_filter("bidirectional_bar"), "bidirectionalBar");
        assert_eq!(var_hump_filter("radial-bar-chart"), "radialBarChart");
        assert_eq!(var_hump_filter("line"), "line");
    }

    #[test]
    fn persist_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pie.json"), "stale").unwrap();

        let mut schema = Schema::new("Pie", "pie");
        schema.properties.insert(AttributeDescriptor::new("angleField"));
        let path = persist_schema(&schema, dir.path()).unwrap();

        assert_eq!(path, dir.path().join("pie.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["name"], "pie");
        assert_eq!(written["required"], serde_json::json!([]));
        assert!(!dir.path().join("pie.json.tmp").exists());
    }

    #[test]
    fn persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Schema::new("Pie", "pie");
        let err = persist_schema(&schema, &dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), "write");
    }

    #[test]
    fn failed_rename_keeps_old_output_and_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pie.json")).unwrap();
        std::fs::write(dir.path().join("pie.json/keep"), "").unwrap();

        let err = persist_schema(&Schema::new("Pie", "pie"), dir.path()).unwrap_err();
        assert_eq!(err.kind(), "write");
        assert!(dir.path().join("pie.json/keep").exists());
        assert!(!dir.path().join("pie.json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_stale_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pie.json"), "stale").unwrap();
        std::fs::create_dir(dir.path().join("pie.json.tmp")).unwrap();

        let err = persist_schema(&Schema::new("Pie", "pie"), dir.path()).unwrap_err();
        assert_eq!(err.kind(), "write");
        assert_eq!(std::fs::read_to_string(dir.path().join("pie.json")).unwrap(), "stale");
    }

    #[test]
    fn builtin_manifest_lists_names() {
        let names = vec!["bidirectional-bar".to_string(), "line".to_string()];
        let ts = render_manifest(&names, None).unwrap();
        assert!(ts.contains("import bidirectionalBarSchema from './bidirectional-bar.json';"));
        assert!(ts.contains("import lineSchema from './line.json';"));
        assert!(ts.contains("  'line': lineSchema,"));
        assert!(ts.find("bidirectionalBarSchema from").unwrap() < ts.find("lineSchema from").unwrap());
    }

    #[test]
    fn empty_manifest_renders() {
        let ts = render_manifest(&[], None).unwrap();
        assert!(ts.contains("export const schemas = {\n};"));
    }

    #[test]
    fn manifest_from_template_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_TEMPLATE_NAME),
            "{{ data | join(',') }}",
        )
        .unwrap();
        let names = vec!["area".to_string(), "column".to_string()];
        assert_eq!(render_manifest(&names, Some(dir.path())).unwrap(), "area,column");
    }

    #[test]
    fn manifest_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest("export {};", dir.path(), "index.ts").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "export {};");
    }
}
