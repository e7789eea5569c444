use crate::error::{HviError, Result};
use crate::types::config::HviConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "hvi.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".hvi/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/hvi/config.toml";

pub fn load_config(root: &Path) -> Result<Option<HviConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

/// Loads and validates the workspace config; a missing `hvi.toml` is an error.
pub fn require_config(root: &Path) -> Result<HviConfig> {
    if !root.exists() {
        return Err(HviError::PathNotFound(root.display().to_string()));
    }
    let config = load_config(root)?
        .ok_or_else(|| HviError::NotInitialized(root.display().to_string()))?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<HviConfig>> {
    let workspace_path = root.join(DEFAULT_CONFIG_FILE);
    if !workspace_path.exists() {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &workspace_path)?;
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let cfg: HviConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| HviError::ConfigParse(e.to_string()))?;
    Ok(Some(cfg))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| HviError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dimension::DimensionScheme;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_config_returns_none_when_workspace_file_missing() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg = load_config_with_global(dir.path(), None).expect("load should not fail");
        assert!(cfg.is_none());
    }

    #[test]
    fn require_config_reports_uninitialized_workspace() {
        let dir = TempDir::new().expect("temp dir should be created");
        let err = require_config(dir.path()).expect_err("should fail");
        assert!(matches!(err, HviError::NotInitialized(_)));
    }

    #[test]
    fn load_config_merges_global_workspace_and_local_in_order() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");

        fs::write(
            &global_path,
            r#"
[server]
port = 9100

[recommendations]
threshold = 70.0
"#,
        )
        .expect("global config should write");

        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            r#"
[workspace]
name = "acme"
dimension_scheme = "capability"

[recommendations]
max_items = 4
"#,
        )
        .expect("workspace config should write");

        fs::create_dir_all(root.path().join(".hvi")).expect("local dir should create");
        fs::write(
            root.path().join(DEFAULT_LOCAL_FILE),
            r#"
[workspace]
dimension_scheme = "exposure"
"#,
        )
        .expect("local override should write");

        let cfg = load_config_with_global(root.path(), Some(&global_path))
            .expect("load should succeed")
            .expect("merged config should exist");

        assert_eq!(cfg.workspace.name, "acme");
        assert_eq!(cfg.workspace.dimension_scheme, DimensionScheme::Exposure);
        assert_eq!(cfg.port(), 9100);
        assert_eq!(cfg.recommendation_threshold(), 70.0);
        assert_eq!(cfg.max_recommendations(), 4);
    }

    #[test]
    fn malformed_workspace_file_names_the_path() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[workspace\nname=").expect("write");
        let err = load_config_with_global(root.path(), None).expect_err("should fail");
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }
}
