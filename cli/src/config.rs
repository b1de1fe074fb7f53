use anyhow::{Context, Result};
use idlgen_generator::{ClientConfig, GenOptions};
use idlgen_idl::search::suggest_similar;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for idlgen.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlgenConfig {
    pub project: ProjectConfig,

    #[serde(default)]
    pub apis: Vec<ApiConfig>,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

/// One generated client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub name: String,

    /// Parser output files (`*.ast.json`), relative to the config file
    pub ast: Vec<String>,

    /// Directory the IDL paths are relative to
    #[serde(default = "default_idl_root")]
    pub idl_root: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub mock: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_seed: Option<u64>,

    #[serde(default)]
    pub i64_as_string: bool,

    /// Also emit JSON schemas next to the declarations
    #[serde(default)]
    pub schema: bool,

    /// Module exporting `createAPI`, without extension. Defaults to
    /// `<output_dir>/api/config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_module: Option<String>,

    /// Service name -> functions to generate. Empty generates everything.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: BTreeMap<String, Vec<String>>,

    /// Absolute IDL path -> service name to use instead
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alias: BTreeMap<String, String>,
}

fn default_idl_root() -> String {
    ".".to_string()
}

fn default_output_dir() -> String {
    "./generated".to_string()
}

impl IdlgenConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: IdlgenConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.project.name.is_empty() {
            anyhow::bail!("Project name cannot be empty");
        }

        let mut names = HashSet::new();
        for api in &self.apis {
            if api.name.is_empty() {
                anyhow::bail!("API name cannot be empty");
            }
            if !names.insert(api.name.as_str()) {
                anyhow::bail!("Duplicate API name: {}", api.name);
            }
            if api.ast.is_empty() {
                anyhow::bail!("API '{}' lists no AST files", api.name);
            }
            for (service, functions) in &api.methods {
                if functions.is_empty() {
                    anyhow::bail!(
                        "API '{}': method list for service '{}' is empty",
                        api.name,
                        service
                    );
                }
            }
        }

        Ok(())
    }

    /// Find an API by name
    pub fn find_api(&self, name: &str) -> Option<&ApiConfig> {
        self.apis.iter().find(|a| a.name == name)
    }

    /// The named API, or every API when no name is given.
    pub fn select_apis(&self, name: Option<&str>) -> Result<Vec<&ApiConfig>> {
        let Some(name) = name else {
            return Ok(self.apis.iter().collect());
        };
        if let Some(api) = self.find_api(name) {
            return Ok(vec![api]);
        }

        let candidates: Vec<&str> = self.apis.iter().map(|a| a.name.as_str()).collect();
        match suggest_similar(name, &candidates, 3).first() {
            Some(suggestion) => anyhow::bail!(
                "API '{}' not found, did you mean: {}?",
                name,
                suggestion.candidate
            ),
            None => anyhow::bail!("API '{}' not found", name),
        }
    }
}

impl ApiConfig {
    /// AST file paths resolved against `base_dir`.
    pub fn ast_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.ast.iter().map(|p| base_dir.join(p)).collect()
    }

    pub fn to_client_config(&self, base_dir: &Path, dry_run: bool) -> ClientConfig {
        ClientConfig {
            ast_files: self.ast_paths(base_dir),
            options: GenOptions {
                name: self.name.clone(),
                idl_root: base_dir.join(&self.idl_root),
                output_dir: base_dir.join(&self.output_dir),
                methods: self.methods.clone().into_iter().collect(),
                alias: self.alias.clone().into_iter().collect(),
                mock: self.mock,
                mock_seed: self.mock_seed,
                i64_as_string: self.i64_as_string,
                schema: self.schema,
                request_module: self.request_module.as_ref().map(|m| base_dir.join(m)),
                dry_run,
            },
        }
    }
}

/// Absolute directory relative paths in the config file are resolved
/// against. The AST dumps carry absolute IDL paths, so the IDL root must be
/// absolute too for generated files to keep their layout.
pub fn config_dir(config_path: &str) -> Result<PathBuf> {
    let parent = Path::new(config_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty());
    match parent {
        Some(dir) if dir.is_absolute() => Ok(dir.to_path_buf()),
        _ => {
            let cwd = std::env::current_dir().context("Failed to resolve the current directory")?;
            Ok(parent.map(|dir| cwd.join(dir)).unwrap_or(cwd))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
name = "my-app"

[[apis]]
name = "user"
ast = ["./ast/user.ast.json"]
idl_root = "./idl"
output_dir = "./src/api"
mock = true
mock_seed = 7
schema = true
request_module = "./src/http/config"

[apis.methods]
UserService = ["GetUser"]

[apis.alias]
"/abs/idl/user.thrift" = "UserApi"

[[apis]]
name = "order"
ast = ["./ast/order.ast.json"]
"#;

    fn sample() -> IdlgenConfig {
        toml::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let config = sample();
        config.validate().unwrap();

        let user = config.find_api("user").unwrap();
        assert!(user.mock);
        assert_eq!(user.mock_seed, Some(7));
        assert_eq!(user.methods["UserService"], vec!["GetUser".to_string()]);
        assert_eq!(user.alias["/abs/idl/user.thrift"], "UserApi");

        let order = config.find_api("order").unwrap();
        assert_eq!(order.output_dir, "./generated");
        assert!(order.methods.is_empty());
        assert!(!order.i64_as_string);
    }

    #[test]
    fn test_client_config_resolves_paths() {
        let config = sample();
        let client = config
            .find_api("user")
            .unwrap()
            .to_client_config(Path::new("/project"), true);

        assert_eq!(client.ast_files, vec![PathBuf::from("/project/./ast/user.ast.json")]);
        assert_eq!(client.options.idl_root, PathBuf::from("/project/./idl"));
        assert_eq!(client.options.output_dir, PathBuf::from("/project/./src/api"));
        assert!(client.options.dry_run);
        assert!(client.options.schema);
        assert_eq!(
            client.options.request_module,
            Some(PathBuf::from("/project/./src/http/config"))
        );
        assert_eq!(client.options.methods.len(), 1);

        let order = config
            .find_api("order")
            .unwrap()
            .to_client_config(Path::new("/project"), false);
        assert!(!order.options.schema);
        assert_eq!(order.options.request_module, None);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = sample();
        config.apis[1].name = "user".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("Duplicate API name"));

        let mut config = sample();
        config.apis[1].ast.clear();
        assert!(config.validate().unwrap_err().to_string().contains("no AST files"));

        let mut config = sample();
        config.project.name.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_apis() {
        let config = sample();
        assert_eq!(config.select_apis(None).unwrap().len(), 2);
        assert_eq!(config.select_apis(Some("order")).unwrap()[0].name, "order");

        let err = config.select_apis(Some("usr")).unwrap_err();
        assert!(err.to_string().contains("did you mean: user?"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idlgen.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = IdlgenConfig::load(&path).unwrap();
        assert_eq!(config.project.name, "my-app");
        assert_eq!(config.apis.len(), 2);

        assert!(IdlgenConfig::load(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_config_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config_dir("idlgen.toml").unwrap(), cwd);
        assert_eq!(config_dir("conf/idlgen.toml").unwrap(), cwd.join("conf"));
        assert_eq!(config_dir("/etc/app/idlgen.toml").unwrap(), PathBuf::from("/etc/app"));
    }

    #[test]
    fn test_relative_config_gives_absolute_roots() {
        let config = sample();
        let base_dir = config_dir("conf/idlgen.toml").unwrap();
        let client = config.find_api("user").unwrap().to_client_config(&base_dir, true);

        assert!(client.options.idl_root.is_absolute());
        assert!(client.options.output_dir.is_absolute());
        assert!(client.ast_files.iter().all(|p| p.is_absolute()));
    }
}
