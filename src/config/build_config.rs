use crate::utils::error::{DashError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "stock-dash.toml";

/// Build and dev-server settings. Loaded once at start-up and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Project root; relative paths below are resolved against it.
    pub root: PathBuf,
    pub build: BuildSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub out_dir: PathBuf,
    /// Entry name -> source file.
    pub input: BTreeMap<String, String>,
    pub output: OutputNames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNames {
    pub entry_file_names: String,
    pub chunk_file_names: String,
    pub asset_file_names: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
    /// Path prefix -> rule.
    pub proxy: BTreeMap<String, ProxyRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRule {
    pub target: String,
    #[serde(default)]
    pub change_origin: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            build: BuildSection::default(),
            server: ServerSection::default(),
        }
    }
}

impl Default for BuildSection {
    fn default() -> Self {
        let mut input = BTreeMap::new();
        input.insert("main".to_string(), "src/main.js".to_string());
        Self {
            out_dir: PathBuf::from("dist"),
            input,
            output: OutputNames::default(),
        }
    }
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            entry_file_names: "main.js".to_string(),
            chunk_file_names: "[name].js".to_string(),
            asset_file_names: "[name][extname]".to_string(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        let mut proxy = BTreeMap::new();
        proxy.insert(
            "/api".to_string(),
            ProxyRule {
                target: "http://localhost:8000".to_string(),
                change_origin: true,
            },
        );
        Self { port: 5173, proxy }
    }
}

impl BuildConfig {
    /// Load from `path`, or from `stock-dash.toml` in the working directory
    /// when present, falling back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. A relative `root` is taken relative to the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(DashError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;

        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }

        tracing::debug!("Loaded build configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DashError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown names stay as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var regex is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.build.out_dir)
    }

    /// Entry name and absolute source path, in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, PathBuf)> + '_ {
        self.build
            .input
            .iter()
            .map(|(name, path)| (name.as_str(), self.root.join(path)))
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("root", &self.root.to_string_lossy())?;
        validation::validate_path("build.out_dir", &self.build.out_dir.to_string_lossy())?;

        if self.build.input.is_empty() {
            return Err(DashError::ConfigValidationError {
                field: "build.input".to_string(),
                message: "At least one entry point is required".to_string(),
            });
        }
        for (name, path) in &self.build.input {
            validation::validate_non_empty_string("build.input", name)?;
            validation::validate_path(&format!("build.input.{}", name), path)?;
        }

        let output = &self.build.output;
        validation::validate_file_pattern("build.output.entry_file_names", &output.entry_file_names)?;
        validation::validate_file_pattern("build.output.chunk_file_names", &output.chunk_file_names)?;
        validation::validate_file_pattern("build.output.asset_file_names", &output.asset_file_names)?;

        if self.build.input.len() > 1 && !output.entry_file_names.contains("[name]") {
            return Err(DashError::InvalidConfigValueError {
                field: "build.output.entry_file_names".to_string(),
                value: output.entry_file_names.clone(),
                reason: format!(
                    "{} entries would all be written to the same file; use [name]",
                    self.build.input.len()
                ),
            });
        }

        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;

        for (prefix, rule) in &self.server.proxy {
            if !prefix.starts_with('/') {
                return Err(DashError::InvalidConfigValueError {
                    field: "server.proxy".to_string(),
                    value: prefix.clone(),
                    reason: "Proxy prefixes must start with '/'".to_string(),
                });
            }
            validation::validate_url(&format!("server.proxy.\"{}\".target", prefix), &rule.target)?;
        }

        Ok(())
    }
}

impl Validate for BuildConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
