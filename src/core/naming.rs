use crate::config::build_config::OutputNames;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Entry,
    Chunk,
    Asset,
}

/// Fill a file name pattern. `ext` is the extension without its dot.
pub fn render(pattern: &str, name: &str, ext: Option<&str>) -> String {
    let ext = ext.unwrap_or("");
    let extname = if ext.is_empty() {
        String::new()
    } else {
        format!(".{}", ext)
    };

    pattern
        .replace("[name]", name)
        .replace("[extname]", &extname)
        .replace("[ext]", ext)
}

impl OutputNames {
    pub fn pattern(&self, kind: OutputKind) -> &str {
        match kind {
            OutputKind::Entry => &self.entry_file_names,
            OutputKind::Chunk => &self.chunk_file_names,
            OutputKind::Asset => &self.asset_file_names,
        }
    }

    /// Output file name for `source`; `name` overrides the file stem (entries
    /// are named by their key).
    pub fn file_name(&self, kind: OutputKind, source: &Path, name: Option<&str>) -> String {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let ext = source.extension().and_then(|e| e.to_str());
        render(self.pattern(kind), name.unwrap_or(stem), ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        assert_eq!(render("[name].js", "vendor", Some("js")), "vendor.js");
        assert_eq!(render("[name][extname]", "logo", Some("svg")), "logo.svg");
        assert_eq!(render("[name].[ext]", "style", Some("css")), "style.css");
        assert_eq!(render("[name][extname]", "LICENSE", None), "LICENSE");
        assert_eq!(render("main.js", "main", Some("js")), "main.js");
    }

    #[test]
    fn test_default_names_are_not_hashed() {
        let names = OutputNames::default();
        assert_eq!(
            names.file_name(OutputKind::Entry, Path::new("src/main.js"), Some("main")),
            "main.js"
        );
        assert_eq!(
            names.file_name(OutputKind::Chunk, Path::new("src/components/chart.js"), None),
            "chart.js"
        );
        assert_eq!(
            names.file_name(OutputKind::Asset, Path::new("src/assets/app.css"), None),
            "app.css"
        );
    }
}
