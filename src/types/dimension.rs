use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four fixed assessment dimensions. Serialized as `d1`..`d4`;
/// deserialized with the same rules as [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dimension {
    D1,
    D2,
    D3,
    D4,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [Dimension::D1, Dimension::D2, Dimension::D3, Dimension::D4];

    pub fn index(self) -> usize {
        match self {
            Self::D1 => 0,
            Self::D2 => 1,
            Self::D3 => 2,
            Self::D4 => 3,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::D1 => "d1",
            Self::D2 => "d2",
            Self::D3 => "d3",
            Self::D4 => "d4",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    /// Accepts `d1`..`d4` or any name from either naming scheme.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        for dimension in Self::ALL {
            if normalized == dimension.key() {
                return Ok(dimension);
            }
            for scheme in [DimensionScheme::Capability, DimensionScheme::Exposure] {
                if normalized == scheme.name(dimension).to_lowercase() {
                    return Ok(dimension);
                }
            }
        }
        Err(format!("unknown dimension: {value}"))
    }
}

impl TryFrom<String> for Dimension {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Naming scheme for the dimensions. Both schemes describe the same D1..D4
/// slots; only the labels differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionScheme {
    #[default]
    Capability,
    Exposure,
}

impl DimensionScheme {
    pub fn name(self, dimension: Dimension) -> &'static str {
        match (self, dimension) {
            (Self::Capability, Dimension::D1) => "Leadership",
            (Self::Capability, Dimension::D2) => "Technology",
            (Self::Capability, Dimension::D3) => "Process",
            (Self::Capability, Dimension::D4) => "People",
            (Self::Exposure, Dimension::D1) => "Behavioral",
            (Self::Exposure, Dimension::D2) => "Technical",
            (Self::Exposure, Dimension::D3) => "Organizational",
            (Self::Exposure, Dimension::D4) => "Environmental",
        }
    }
}

/// Resolved display names for D1..D4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionNames([String; 4]);

impl DimensionNames {
    pub fn from_scheme(scheme: DimensionScheme) -> Self {
        Self(Dimension::ALL.map(|dimension| scheme.name(dimension).to_string()))
    }

    pub fn custom(names: [String; 4]) -> Self {
        Self(names)
    }

    pub fn get(&self, dimension: Dimension) -> &str {
        &self.0[dimension.index()]
    }

    pub fn into_array(self) -> [String; 4] {
        self.0
    }
}

impl Default for DimensionNames {
    fn default() -> Self {
        Self::from_scheme(DimensionScheme::default())
    }
}
