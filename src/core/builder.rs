use crate::config::build_config::BuildConfig;
use crate::core::naming::OutputKind;
use crate::domain::ports::Storage;
use crate::utils::error::{DashError, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};

const SCRIPT_EXTENSIONS: [&str; 2] = ["js", "mjs"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub kind: OutputKind,
    pub source: PathBuf,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildManifest {
    pub files: Vec<OutputFile>,
}

impl BuildManifest {
    pub fn of_kind(&self, kind: OutputKind) -> impl Iterator<Item = &OutputFile> {
        self.files.iter().filter(move |f| f.kind == kind)
    }
}

/// Copies entries, chunks and assets into the output directory under their
/// configured names. Sources are not transformed.
pub struct StaticBuilder<S: Storage> {
    config: BuildConfig,
    storage: S,
}

impl<S: Storage> StaticBuilder<S> {
    pub fn new(config: BuildConfig, storage: S) -> Self {
        Self { config, storage }
    }

    /// Work out every output file without writing anything.
    pub fn plan(&self) -> Result<BuildManifest> {
        let names = &self.config.build.output;
        let mut files = Vec::new();
        let mut entry_sources = BTreeSet::new();
        let mut source_dirs = BTreeSet::new();

        for (name, source) in self.config.entries() {
            if !source.is_file() {
                return Err(DashError::BuildError {
                    message: format!("Entry '{}' not found at {}", name, source.display()),
                });
            }
            files.push(OutputFile {
                kind: OutputKind::Entry,
                file_name: names.file_name(OutputKind::Entry, &source, Some(name)),
                source: source.clone(),
            });
            if let Some(dir) = source.parent() {
                source_dirs.insert(dir.to_path_buf());
            }
            entry_sources.insert(source);
        }

        let out_dir = self.config.out_dir();
        let mut seen_dirs = BTreeSet::new();
        for dir in source_dirs {
            for source in collect_files(&dir, &out_dir)? {
                if entry_sources.contains(&source) || !seen_dirs.insert(source.clone()) {
                    continue;
                }
                let is_script = source
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e));
                let kind = if is_script {
                    OutputKind::Chunk
                } else {
                    OutputKind::Asset
                };
                files.push(OutputFile {
                    kind,
                    file_name: names.file_name(kind, &source, None),
                    source,
                });
            }
        }

        let mut claimed: HashMap<&str, &Path> = HashMap::new();
        for file in &files {
            if let Some(previous) = claimed.insert(&file.file_name, &file.source) {
                return Err(DashError::BuildError {
                    message: format!(
                        "{} and {} would both be written to {}",
                        previous.display(),
                        file.source.display(),
                        file.file_name
                    ),
                });
            }
        }

        Ok(BuildManifest { files })
    }

    pub async fn build(&self) -> Result<BuildManifest> {
        let manifest = self.plan()?;
        self.emit(&manifest).await?;

        tracing::info!(
            "Built {} entries, {} chunks, {} assets into {}",
            manifest.of_kind(OutputKind::Entry).count(),
            manifest.of_kind(OutputKind::Chunk).count(),
            manifest.of_kind(OutputKind::Asset).count(),
            self.config.out_dir().display()
        );
        Ok(manifest)
    }

    /// Every source is read before the output directory is touched, so a
    /// failed read leaves the previous output in place.
    async fn emit(&self, manifest: &BuildManifest) -> Result<()> {
        let mut contents = Vec::with_capacity(manifest.files.len());
        for file in &manifest.files {
            let data = tokio::fs::read(&file.source)
                .await
                .map_err(|e| DashError::BuildError {
                    message: format!("Cannot read {}: {}", file.source.display(), e),
                })?;
            contents.push((file, data));
        }

        if self.out_dir_inside_root() {
            self.storage.clear().await?;
        } else {
            tracing::warn!(
                "{} is outside the project root, not emptying it",
                self.config.out_dir().display()
            );
        }

        for (file, data) in contents {
            self.storage.write_file(&file.file_name, &data).await?;
            tracing::debug!("{:?} {} -> {}", file.kind, file.source.display(), file.file_name);
        }
        Ok(())
    }

    fn out_dir_inside_root(&self) -> bool {
        let out_dir = &self.config.build.out_dir;
        out_dir.is_relative()
            && out_dir
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && out_dir.components().any(|c| matches!(c, Component::Normal(_)))
    }
}

/// Regular files below `dir` in a stable order, skipping dot-files and the
/// output directory.
fn collect_files(dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        if current == out_dir {
            continue;
        }
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
