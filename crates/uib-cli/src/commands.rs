//! Subcommand implementations. Each command reads JSON, transforms it
//! through the core, and writes pretty JSON to `--out` or stdout.

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use uib_core::project::{
    bundle_entries, data_mapping_from_project_json, parse_project_json, project_to_json,
};
use uib_core::to_canonical_json;
use uib_editor::document::{DocumentStore, EditorConfig};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project file (single-file project JSON)
    pub project: PathBuf,

    /// Screen id to export (default: first screen)
    #[arg(short, long)]
    pub screen: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Canonical document, or a bare View tree
    pub document: PathBuf,

    /// Name for the new project
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Project file to normalize
    pub project: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Project file to bundle
    pub project: PathBuf,

    /// Directory to write project.json and screens/ into
    pub dir: PathBuf,
}

// ─── Commands ────────────────────────────────────────────────────────────

pub fn export(args: ExportArgs) -> Result<()> {
    let raw = read_json(&args.project)?;
    let doc = export_screen(&raw, args.screen.as_deref())
        .with_context(|| format!("exporting {}", args.project.display()))?;
    write_json(args.out.as_deref(), &doc)
}

pub fn import(args: ImportArgs) -> Result<()> {
    let raw = read_json(&args.document)?;
    let project = import_document(&raw, args.name.as_deref())
        .with_context(|| format!("importing {}", args.document.display()))?;
    write_json(args.out.as_deref(), &project)
}

pub fn normalize(args: NormalizeArgs) -> Result<()> {
    let raw = read_json(&args.project)?;
    let project = normalize_project_file(&raw)
        .with_context(|| format!("normalizing {}", args.project.display()))?;
    write_json(args.out.as_deref(), &project)
}

pub fn bundle(args: BundleArgs) -> Result<()> {
    let raw = read_json(&args.project)?;
    let project = parse_project_json(&raw).ok_or_else(|| {
        anyhow!("{} is not a recognized project file", args.project.display())
    })?;
    let data_mapping = data_mapping_from_project_json(&raw);
    for entry in bundle_entries(&project, data_mapping.as_ref()) {
        let relative = Path::new(&entry.path);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            bail!("bundle entry {} would leave {}", entry.path, args.dir.display());
        }
        let path = args.dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        write_json(Some(&path), &entry.contents)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

// ─── Transformations ─────────────────────────────────────────────────────

/// Canonical document for one screen of a stored project.
pub fn export_screen(raw: &Value, screen_id: Option<&str>) -> Result<Value> {
    let project =
        parse_project_json(raw).ok_or_else(|| anyhow!("not a recognized project file"))?;
    let screen = match screen_id {
        Some(id) => project
            .screen(id)
            .ok_or_else(|| anyhow!("project has no screen `{id}`"))?,
        None => project
            .screens
            .first()
            .ok_or_else(|| anyhow!("project has no screens"))?,
    };
    let data_mapping = data_mapping_from_project_json(raw).unwrap_or_default();
    Ok(to_canonical_json(&screen.tree, &data_mapping).to_value())
}

/// New single-screen project holding an imported document.
pub fn import_document(raw: &Value, name: Option<&str>) -> Result<Value> {
    let mut store = DocumentStore::new(EditorConfig {
        history_depth: 0,
        autosave: false,
    });
    store.new_project(name);
    store.import_value(raw)?;
    Ok(store.project_json())
}

/// A stored project rewritten through normalization.
pub fn normalize_project_file(raw: &Value) -> Result<Value> {
    let Some(project) = parse_project_json(raw) else {
        bail!("not a recognized project file");
    };
    let data_mapping = data_mapping_from_project_json(raw);
    Ok(project_to_json(&project, data_mapping.as_ref()))
}

// ─── I/O ─────────────────────────────────────────────────────────────────

fn read_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn write_json(out: Option<&Path>, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stored_project() -> Value {
        json!({
            "id": "p1",
            "name": "Shop",
            "screens": [
                {
                    "id": "home",
                    "name": "Home",
                    "tree": {
                        "id": "root",
                        "type": "View",
                        "children": [{"id": "hello", "type": "Text", "text": "Hello"}]
                    }
                },
                {
                    "id": "cart",
                    "name": "Cart",
                    "tree": {"id": "root", "type": "View", "children": []}
                }
            ],
            "dataMapping": {"dataModel": [{"id": "d1", "name": "total"}]}
        })
    }

    #[test]
    fn export_defaults_to_first_screen() {
        let doc = export_screen(&stored_project(), None).unwrap();
        assert_eq!(doc["root"]["id"], json!("hello"));
        assert_eq!(doc["dataMapping"]["dataModel"][0]["name"], json!("total"));

        let doc = export_screen(&stored_project(), Some("cart")).unwrap();
        assert_eq!(doc["root"]["id"], json!("screen"));
        assert!(export_screen(&stored_project(), Some("ghost")).is_err());
    }

    #[test]
    fn import_wraps_document_in_project() {
        let doc = export_screen(&stored_project(), None).unwrap();
        let project = import_document(&doc, Some("Imported")).unwrap();
        assert_eq!(project["name"], json!("Imported"));
        assert_eq!(project["screens"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            project["screens"][0]["tree"]["children"][0]["id"],
            json!("hello")
        );
        assert!(import_document(&json!({"nope": true}), None).is_err());
    }

    #[test]
    fn bundle_stays_inside_its_directory() {
        let base = std::env::temp_dir().join(format!("uib-cli-bundle-{}", std::process::id()));
        let dir = base.join("out");
        let mut raw = stored_project();
        raw["screens"][1]["id"] = json!("../../escaped");
        let project = base.join("project.json");
        fs::create_dir_all(&base).unwrap();
        fs::write(&project, raw.to_string()).unwrap();

        bundle(BundleArgs {
            project,
            dir: dir.clone(),
        })
        .unwrap();
        assert!(dir.join("project.json").is_file());
        assert!(dir.join("screens/home.json").is_file());
        assert!(!base.join("escaped.json").exists());
        assert!(!dir.join("escaped.json").exists());
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn normalize_rejects_non_projects() {
        assert!(normalize_project_file(&json!([1, 2])).is_err());
        let out = normalize_project_file(&stored_project()).unwrap();
        assert_eq!(out["screens"][1]["order"], json!(1));
        assert_eq!(out["dataMapping"]["dataModel"][0]["id"], json!("d1"));
    }
}
