//! @ai:module:intent Session configuration: benchmarks, VMs with variants, and skip rules
//! @ai:module:layer infrastructure
//! @ai:module:public_api SessionConfig, BenchmarkConfig, VmConfig, VariantConfig, results_path
//! @ai:module:stateless true

use crate::error::{HarnessError, Result};
use crate::key::{Key, SkipRule};
use crate::skip::SkipMatcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONFIG_EXTENSION: &str = "toml";
const RESULTS_SUFFIX: &str = "_results.json";

/// Placeholders understood by VM command templates.
const RUNNER_PLACEHOLDERS: [&str; 3] = ["{benchmark}", "{iterations}", "{param}"];

/// @ai:intent Whole benchmark session, read-only once loaded
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default number of process executions per key
    #[serde(default = "default_n_executions")]
    pub n_executions: u32,
    /// Default number of in-process iterations per execution
    #[serde(default = "default_n_iterations")]
    pub n_iterations: u32,
    #[serde(default)]
    pub skip: Vec<String>,
    /// Harness-internal commands whose output is recorded with the results
    #[serde(default)]
    pub audit: BTreeMap<String, String>,
    #[serde(default)]
    pub benchmarks: BTreeMap<String, BenchmarkConfig>,
    #[serde(default)]
    pub vms: BTreeMap<String, VmConfig>,
}

/// @ai:intent Per-benchmark parameters
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Workload size passed to the iterations runner
    #[serde(default)]
    pub param: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_executions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_iterations: Option<u32>,
}

/// @ai:intent A virtual machine and the variants it supports
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmConfig {
    /// Command template, e.g. "python3 iterations_runner.py {benchmark} {iterations} {param}"
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_iterations: Option<u32>,
    #[serde(default)]
    pub variants: BTreeMap<String, VariantConfig>,
}

/// @ai:intent One VM variant, usually an environment tweak
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_iterations: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

fn default_n_executions() -> u32 {
    1
}

fn default_n_iterations() -> u32 {
    1
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            n_executions: default_n_executions(),
            n_iterations: default_n_iterations(),
            skip: Vec::new(),
            audit: BTreeMap::new(),
            benchmarks: BTreeMap::new(),
            vms: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// @ai:intent Load and validate configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// @ai:intent Parse and validate configuration from TOML text
    /// @ai:effects pure
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Reject names and rules the key format cannot represent
    /// @ai:post Ok implies every skip rule has 3 components and every VM has a variant
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        for name in self.benchmarks.keys() {
            validate_component("benchmark", name)?;
        }

        for (vm_name, vm) in &self.vms {
            validate_component("vm", vm_name)?;

            if vm.command.trim().is_empty() {
                return Err(HarnessError::InvalidConfig(format!(
                    "vm '{vm_name}' has an empty command"
                )));
            }

            if vm.variants.is_empty() {
                return Err(HarnessError::InvalidConfig(format!(
                    "vm '{vm_name}' declares no variants"
                )));
            }

            for (variant_name, variant) in &vm.variants {
                validate_component("variant", variant_name)?;

                for env_name in variant.env.keys() {
                    if !is_env_name(env_name) {
                        return Err(HarnessError::InvalidConfig(format!(
                            "variant '{vm_name}:{variant_name}' sets invalid environment variable '{env_name}'"
                        )));
                    }
                }
            }
        }

        for rule in &self.skip {
            SkipRule::parse(rule)?;
        }

        Ok(())
    }

    /// @ai:intent Build the skip matcher for this session's rules
    /// @ai:effects pure
    pub fn skip_matcher(&self) -> Result<SkipMatcher> {
        SkipMatcher::from_strs(&self.skip)
    }

    /// @ai:intent Look up a benchmark definition
    /// @ai:effects pure
    pub fn benchmark(&self, name: &str) -> Result<&BenchmarkConfig> {
        self.benchmarks
            .get(name)
            .ok_or_else(|| HarnessError::InvalidConfig(format!("unknown benchmark '{name}'")))
    }

    /// @ai:intent Look up a VM definition
    /// @ai:effects pure
    pub fn vm(&self, name: &str) -> Result<&VmConfig> {
        self.vms
            .get(name)
            .ok_or_else(|| HarnessError::InvalidConfig(format!("unknown vm '{name}'")))
    }

    /// @ai:intent Look up the variant a key refers to
    /// @ai:effects pure
    pub fn variant(&self, key: &Key) -> Result<&VariantConfig> {
        self.vm(key.vm())?.variants.get(key.variant()).ok_or_else(|| {
            HarnessError::InvalidConfig(format!(
                "vm '{}' has no variant '{}'",
                key.vm(),
                key.variant()
            ))
        })
    }

    /// @ai:intent Process executions for a benchmark (its override, else the session default)
    /// @ai:effects pure
    pub fn executions_for(&self, benchmark: &str) -> Result<u32> {
        Ok(self
            .benchmark(benchmark)?
            .n_executions
            .unwrap_or(self.n_executions))
    }

    /// @ai:intent In-process iterations for a key: variant, then VM, then benchmark, then session
    /// @ai:effects pure
    pub fn iterations_for(&self, key: &Key) -> Result<u32> {
        let bench = self.benchmark(key.benchmark())?;
        let vm = self.vm(key.vm())?;
        let variant = self.variant(key)?;

        Ok(variant
            .n_iterations
            .or(vm.n_iterations)
            .or(bench.n_iterations)
            .unwrap_or(self.n_iterations))
    }

    /// @ai:intent Render the shell command for one process execution of a key
    /// @ai:post placeholders substituted, variant environment prefixed
    /// @ai:example ("nbody:CPython:default-python", 5) -> "python3 runner.py nbody 5 1000"
    /// @ai:effects pure
    pub fn render_command(&self, key: &Key, iterations: u32) -> Result<String> {
        let bench = self.benchmark(key.benchmark())?;
        let vm = self.vm(key.vm())?;
        let variant = self.variant(key)?;

        let iterations = iterations.to_string();
        let param = bench.param.to_string();

        let uses_runner_placeholders = RUNNER_PLACEHOLDERS
            .iter()
            .any(|placeholder| vm.command.contains(placeholder));

        let mut command = vm
            .command
            .replace("{benchmark}", key.benchmark())
            .replace("{vm}", key.vm())
            .replace("{variant}", key.variant())
            .replace("{iterations}", &iterations)
            .replace("{param}", &param);

        // iterations runner calling convention: <benchmark> <#iterations> <param>
        if !uses_runner_placeholders {
            command = format!("{command} {} {iterations} {param}", key.benchmark());
        }

        let env_prefix: String = variant
            .env
            .iter()
            .map(|(name, value)| format!("{name}={} ", shell_quote(value)))
            .collect();

        Ok(format!("{env_prefix}{command}"))
    }

    /// @ai:intent Sample configuration written by `vmbench init`
    /// @ai:effects pure
    pub fn example() -> Self {
        let mut benchmarks = BTreeMap::new();
        for name in ["dummy", "nbody"] {
            benchmarks.insert(
                name.to_string(),
                BenchmarkConfig {
                    param: 1000,
                    ..Default::default()
                },
            );
        }

        let mut vms = BTreeMap::new();
        vms.insert(
            "CPython".to_string(),
            VmConfig {
                command: "python3 iterations_runners/iterations_runner.py {benchmark} {iterations} {param}"
                    .to_string(),
                n_iterations: None,
                variants: BTreeMap::from([("default-python".to_string(), VariantConfig::default())]),
            },
        );
        vms.insert(
            "Java".to_string(),
            VmConfig {
                command: "java -cp iterations_runners IterationsRunner {benchmark} {iterations} {param}"
                    .to_string(),
                n_iterations: None,
                variants: BTreeMap::from([("default-java".to_string(), VariantConfig::default())]),
            },
        );

        Self {
            n_executions: 2,
            n_iterations: 5,
            skip: Vec::new(),
            audit: BTreeMap::from([("uname".to_string(), "uname -a".to_string())]),
            benchmarks,
            vms,
        }
    }
}

/// @ai:intent Results file name derived from a config path ("x.toml" -> "x_results.json")
/// @ai:pre path ends in .toml
/// @ai:effects pure
pub fn results_path(config_path: &Path) -> Result<PathBuf> {
    let is_toml = config_path
        .extension()
        .map(|ext| ext == CONFIG_EXTENSION)
        .unwrap_or(false);

    let stem = config_path.file_stem().and_then(|s| s.to_str());

    match (is_toml, stem) {
        (true, Some(stem)) => Ok(config_path.with_file_name(format!("{stem}{RESULTS_SUFFIX}"))),
        _ => Err(HarnessError::UnsupportedConfigPath(config_path.to_path_buf())),
    }
}

/// @ai:intent Ensure a name can be used as one key component and as a bare shell word
/// @ai:post only [A-Za-z0-9_.-] is accepted, so ':' and '*' never appear
/// @ai:effects pure
fn validate_component(kind: &str, name: &str) -> Result<()> {
    let shell_safe = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if name.is_empty() || !shell_safe {
        return Err(HarnessError::InvalidConfig(format!(
            "{kind} name '{name}' must be non-empty and contain only letters, digits, '_', '.' or '-'"
        )));
    }
    Ok(())
}

/// @ai:effects pure
fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// @ai:effects pure
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
n_executions = 3
skip = ["nbody:*:*"]

[benchmarks.nbody]
param = 1000

[benchmarks.fasta]
param = 50
n_executions = 1
n_iterations = 7

[vms.CPython]
command = "python3 runner.py"
n_iterations = 20

[vms.CPython.variants.default-python]

[vms.CPython.variants.hashseed]
n_iterations = 4
env = { PYTHONHASHSEED = "0", LABEL = "it's" }
"#;

    fn key(s: &str) -> Key {
        Key::parse(s).unwrap()
    }

    #[test]
    fn test_parse_applies_defaults() {
        let config = SessionConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.n_executions, 3);
        assert_eq!(config.n_iterations, 1);
        assert!(config.audit.is_empty());
        assert_eq!(config.benchmarks["nbody"].n_executions, None);
        assert_eq!(config.vms["CPython"].variants.len(), 2);
    }

    #[test]
    fn test_executions_fall_back_to_session_default() {
        let config = SessionConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.executions_for("nbody").unwrap(), 3);
        assert_eq!(config.executions_for("fasta").unwrap(), 1);
        assert!(config.executions_for("richards").is_err());
    }

    #[test]
    fn test_iterations_resolution_order() {
        let config = SessionConfig::from_toml_str(MINIMAL).unwrap();
        // variant override wins
        assert_eq!(config.iterations_for(&key("fasta:CPython:hashseed")).unwrap(), 4);
        // then the VM override, even over a benchmark default
        assert_eq!(config.iterations_for(&key("fasta:CPython:default-python")).unwrap(), 20);

        let mut no_vm_override = config.clone();
        no_vm_override.vms.get_mut("CPython").unwrap().n_iterations = None;
        assert_eq!(
            no_vm_override.iterations_for(&key("fasta:CPython:default-python")).unwrap(),
            7
        );
        assert_eq!(
            no_vm_override.iterations_for(&key("nbody:CPython:default-python")).unwrap(),
            1
        );
    }

    #[test]
    fn test_render_command_appends_runner_arguments() {
        let config = SessionConfig::from_toml_str(MINIMAL).unwrap();
        let command = config
            .render_command(&key("nbody:CPython:default-python"), 20)
            .unwrap();
        assert_eq!(command, "python3 runner.py nbody 20 1000");
    }

    #[test]
    fn test_render_command_substitutes_placeholders_and_env() {
        let mut config = SessionConfig::from_toml_str(MINIMAL).unwrap();
        config.vms.get_mut("CPython").unwrap().command =
            "cd {vm} && python3 {benchmark}.py --iters {iterations} --n {param} # {variant}".to_string();

        let command = config.render_command(&key("fasta:CPython:hashseed"), 4).unwrap();
        assert_eq!(
            command,
            "LABEL='it'\\''s' PYTHONHASHSEED='0' cd CPython && python3 fasta.py --iters 4 --n 50 # hashseed"
        );
    }

    #[test]
    fn test_malformed_skip_rule_is_rejected() {
        let content = MINIMAL.replace("nbody:*:*", "nbody:*");
        let err = SessionConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, HarnessError::MalformedKey { components: 2, .. }));
    }

    #[test]
    fn test_vm_without_variants_is_rejected() {
        let content = r#"
[vms.C]
command = "./run"
"#;
        let err = SessionConfig::from_toml_str(content).unwrap_err();
        assert!(err.to_string().contains("declares no variants"));
    }

    #[test]
    fn test_names_with_separator_or_wildcard_are_rejected() {
        for bad in ["\"a:b\"", "\"*\""] {
            let content = format!("[benchmarks.{bad}]\nparam = 1\n");
            let err = SessionConfig::from_toml_str(&content).unwrap_err();
            assert!(matches!(err, HarnessError::InvalidConfig(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn test_names_with_shell_metacharacters_are_rejected() {
        for bad in ["\"n body\"", "\"nbody;rm\"", "\"$(id)\"", "\"a'b\""] {
            let content = format!(
                "[benchmarks.{bad}]\nparam = 1\n\n[vms.C]\ncommand = \"./run\"\n[vms.C.variants.default-c]\n"
            );
            let err = SessionConfig::from_toml_str(&content).unwrap_err();
            assert!(matches!(err, HarnessError::InvalidConfig(_)), "{bad}: {err}");
        }

        let content = MINIMAL.replace("[vms.CPython.variants.hashseed]", "[vms.CPython.variants.\"hash seed\"]");
        let err = SessionConfig::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("hash seed"));
    }

    #[test]
    fn test_invalid_env_name_is_rejected() {
        let content = MINIMAL.replace("PYTHONHASHSEED", "\"1BAD\"");
        let err = SessionConfig::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("1BAD"));
    }

    #[test]
    fn test_wrong_field_type_fails_to_parse() {
        let err = SessionConfig::from_toml_str("n_executions = \"two\"").unwrap_err();
        assert!(matches!(err, HarnessError::Toml(_)));
    }

    #[test]
    fn test_save_and_load_example() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.toml");

        let config = SessionConfig::example();
        config.save(&path).unwrap();

        let loaded = SessionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = SessionConfig::load(Path::new("/nonexistent/session.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/session.toml"));
    }

    #[test]
    fn test_results_path() {
        assert_eq!(
            results_path(Path::new("configs/example.toml")).unwrap(),
            PathBuf::from("configs/example_results.json")
        );
        assert!(matches!(
            results_path(Path::new("example.krun")),
            Err(HarnessError::UnsupportedConfigPath(_))
        ));
        assert!(results_path(Path::new("toml")).is_err());
    }
}
