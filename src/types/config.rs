use crate::error::HviError;
use crate::types::dimension::{Dimension, DimensionNames, DimensionScheme};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HviConfig {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    pub scoring: Option<ScoringConfig>,
    pub levels: Option<LevelsConfig>,
    pub recommendations: Option<RecommendationsConfig>,
    pub store: Option<StoreConfig>,
    pub server: Option<ServerConfig>,
    pub journal: Option<JournalConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_name")]
    pub name: String,
    #[serde(default)]
    pub dimension_scheme: DimensionScheme,
    pub dimension_names: Option<Vec<String>>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: default_workspace_name(),
            dimension_scheme: DimensionScheme::default(),
            dimension_names: None,
        }
    }
}

fn default_workspace_name() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub weights: Option<HashMap<String, f64>>,
    pub min_completion: Option<f64>,
    pub trend_epsilon: Option<f64>,
}

/// One row of a threshold table: scores `>= min` get `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBand {
    pub min: f64,
    pub label: String,
}

impl LevelBand {
    pub fn new(min: f64, label: &str) -> Self {
        Self {
            min,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelsConfig {
    pub maturity: Option<Vec<LevelBand>>,
    pub risk: Option<Vec<LevelBand>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsConfig {
    pub threshold: Option<f64>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSampling {
    Milestones,
    All,
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    pub file: Option<String>,
    pub log_sampling: Option<LogSampling>,
}

pub const DEFAULT_DATA_DIR: &str = ".hvi/data";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

impl HviConfig {
    pub fn default_weights() -> [f64; 4] {
        [0.25, 0.25, 0.25, 0.25]
    }

    pub fn weights(&self) -> [f64; 4] {
        let defaults = Self::default_weights();
        match self
            .scoring
            .as_ref()
            .and_then(|scoring| scoring.weights.as_ref())
        {
            Some(weights) => Dimension::ALL.map(|dimension| {
                *weights
                    .get(dimension.key())
                    .unwrap_or(&defaults[dimension.index()])
            }),
            None => defaults,
        }
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        self.weights()[dimension.index()]
    }

    pub fn min_completion(&self) -> f64 {
        self.scoring
            .as_ref()
            .and_then(|scoring| scoring.min_completion)
            .unwrap_or(0.5)
    }

    pub fn trend_epsilon(&self) -> f64 {
        self.scoring
            .as_ref()
            .and_then(|scoring| scoring.trend_epsilon)
            .unwrap_or(2.0)
    }

    pub fn default_maturity_levels() -> Vec<LevelBand> {
        vec![
            LevelBand::new(80.0, "Advanced"),
            LevelBand::new(60.0, "Proficient"),
            LevelBand::new(40.0, "Developing"),
            LevelBand::new(0.0, "Beginning"),
        ]
    }

    pub fn default_risk_levels() -> Vec<LevelBand> {
        vec![
            LevelBand::new(75.0, "Critical"),
            LevelBand::new(50.0, "High"),
            LevelBand::new(25.0, "Medium"),
            LevelBand::new(0.0, "Low"),
        ]
    }

    pub fn maturity_levels(&self) -> Vec<LevelBand> {
        self.levels
            .as_ref()
            .and_then(|levels| levels.maturity.clone())
            .unwrap_or_else(Self::default_maturity_levels)
    }

    pub fn risk_levels(&self) -> Vec<LevelBand> {
        self.levels
            .as_ref()
            .and_then(|levels| levels.risk.clone())
            .unwrap_or_else(Self::default_risk_levels)
    }

    pub fn recommendation_threshold(&self) -> f64 {
        self.recommendations
            .as_ref()
            .and_then(|recommendations| recommendations.threshold)
            .unwrap_or(60.0)
    }

    pub fn max_recommendations(&self) -> usize {
        self.recommendations
            .as_ref()
            .and_then(|recommendations| recommendations.max_items)
            .unwrap_or(5)
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        let configured = self
            .store
            .as_ref()
            .and_then(|store| store.data_dir.as_deref())
            .unwrap_or(DEFAULT_DATA_DIR);
        let candidate = PathBuf::from(configured);
        if candidate.is_absolute() {
            candidate
        } else {
            root.join(candidate)
        }
    }

    pub fn bind_address(&self) -> String {
        self.server
            .as_ref()
            .and_then(|server| server.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|server| server.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn dimension_names(&self) -> DimensionNames {
        match &self.workspace.dimension_names {
            Some(names) if names.len() == 4 => DimensionNames::custom([
                names[0].clone(),
                names[1].clone(),
                names[2].clone(),
                names[3].clone(),
            ]),
            _ => DimensionNames::from_scheme(self.workspace.dimension_scheme),
        }
    }

    pub fn validate(&self) -> Result<(), HviError> {
        if let Some(names) = &self.workspace.dimension_names {
            if names.len() != 4 {
                return Err(HviError::ConfigParse(format!(
                    "workspace.dimension_names must list exactly 4 names (found {})",
                    names.len()
                )));
            }
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(HviError::ConfigParse(
                    "workspace.dimension_names entries must be non-empty".to_string(),
                ));
            }
        }

        if let Some(weights) = self
            .scoring
            .as_ref()
            .and_then(|scoring| scoring.weights.as_ref())
        {
            let unknown = weights
                .keys()
                .filter(|key| !Dimension::ALL.iter().any(|d| d.key() == key.as_str()))
                .cloned()
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                return Err(HviError::ConfigParse(format!(
                    "scoring.weights contains unknown key(s): {}",
                    unknown.join(", ")
                )));
            }
        }

        let weights = self.weights();
        if weights.iter().any(|weight| !(0.0..=1.0).contains(weight)) {
            return Err(HviError::ConfigParse(
                "scoring.weights values must be between 0.0 and 1.0".to_string(),
            ));
        }
        let weight_sum: f64 = weights.iter().sum();
        if (weight_sum - 1.0).abs() > 0.001 {
            return Err(HviError::ConfigParse(format!(
                "scoring.weights must sum to 1.0 (found {:.3})",
                weight_sum
            )));
        }

        if !(0.0..=1.0).contains(&self.min_completion()) {
            return Err(HviError::ConfigParse(
                "scoring.min_completion must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.trend_epsilon() < 0.0 {
            return Err(HviError::ConfigParse(
                "scoring.trend_epsilon must not be negative".to_string(),
            ));
        }

        validate_levels("levels.maturity", &self.maturity_levels())?;
        validate_levels("levels.risk", &self.risk_levels())?;

        if !(0.0..=100.0).contains(&self.recommendation_threshold()) {
            return Err(HviError::ConfigParse(
                "recommendations.threshold must be between 0 and 100".to_string(),
            ));
        }
        if self.max_recommendations() == 0 {
            return Err(HviError::ConfigParse(
                "recommendations.max_items must be greater than 0".to_string(),
            ));
        }

        if self.port() == 0 {
            return Err(HviError::ConfigParse(
                "server.port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_levels(key: &str, bands: &[LevelBand]) -> Result<(), HviError> {
    if bands.is_empty() {
        return Err(HviError::ConfigParse(format!("{key} must not be empty")));
    }
    for band in bands {
        if !(0.0..=100.0).contains(&band.min) {
            return Err(HviError::ConfigParse(format!(
                "{key} thresholds must be between 0 and 100 (found {})",
                band.min
            )));
        }
        if band.label.trim().is_empty() {
            return Err(HviError::ConfigParse(format!(
                "{key} labels must be non-empty"
            )));
        }
    }
    if bands.windows(2).any(|pair| pair[0].min <= pair[1].min) {
        return Err(HviError::ConfigParse(format!(
            "{key} thresholds must be strictly descending"
        )));
    }
    if bands.last().map(|band| band.min) != Some(0.0) {
        return Err(HviError::ConfigParse(format!(
            "{key} must end with a band whose min is 0"
        )));
    }
    Ok(())
}
