//! Optimization template catalog
//!
//! Templates are YAML documents bundled into the binary. They describe
//! recurring inference issues and their fixes; the analysis engine and
//! humans both consume them.

use rust_embed::RustEmbed;
use serde::Serialize;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateAssets;

/// Template category, mirroring the on-disk layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Insights,
    Optimizations,
}

impl TemplateCategory {
    fn dir(self) -> &'static str {
        match self {
            TemplateCategory::Insights => "insights",
            TemplateCategory::Optimizations => "optimizations",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub category: TemplateCategory,
}

/// List bundled templates, optionally filtered by category.
/// Returned in embedded-asset order (alphabetical per directory).
pub fn list(category: Option<TemplateCategory>) -> Vec<TemplateInfo> {
    let mut templates: Vec<TemplateInfo> = Vec::new();
    for cat in [TemplateCategory::Insights, TemplateCategory::Optimizations] {
        if category.is_some_and(|c| c != cat) {
            continue;
        }
        let prefix = format!("{}/", cat.dir());
        for path in TemplateAssets::iter() {
            if let Some(file) = path.strip_prefix(&prefix)
                && let Some(name) = file.strip_suffix(".yaml")
            {
                templates.push(TemplateInfo {
                    name: name.to_string(),
                    category: cat,
                });
            }
        }
    }
    templates
}

/// Fetch a template's raw YAML by name, searching both categories
pub fn get(name: &str) -> Option<String> {
    for cat in [TemplateCategory::Insights, TemplateCategory::Optimizations] {
        let path = format!("{}/{}.yaml", cat.dir(), name);
        if let Some(file) = TemplateAssets::get(&path) {
            return Some(String::from_utf8_lossy(&file.data).into_owned());
        }
    }
    None
}

/// Parse a category filter string ("all" or empty means no filter)
pub fn parse_category(s: &str) -> Option<TemplateCategory> {
    match s.to_lowercase().as_str() {
        "insights" => Some(TemplateCategory::Insights),
        "optimizations" => Some(TemplateCategory::Optimizations),
        _ => None,
    }
}
