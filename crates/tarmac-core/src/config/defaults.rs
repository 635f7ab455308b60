//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tarmac.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tarmac.yaml";

/// Default external unzip program
pub const DEFAULT_UNZIP_PROGRAM: &str = "unzip";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".tarmac.toml",
        ".tarmac.yaml",
    ]
}

/// Generate default configuration TOML
pub fn default_config_toml() -> String {
    toml::to_string_pretty(&Config::default())
        .unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Tarmac Configuration

[packages]
unzip_program = "unzip"
"#;
