use crate::error::{Result, SketchError};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumString, IntoStaticStr};

pub const DEFAULT_K: usize = 3;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;
pub const MAX_GRID_SIDE: u32 = 1024;

fn default_grid_side() -> u32 {
    crate::features::DEFAULT_GRID_SIDE
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_rotations() -> Vec<f64> {
    vec![-5.0, 5.0]
}

fn default_scales() -> Vec<f64> {
    vec![0.9, 1.1]
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JitterParameters {
    #[schemars(
        title = "Copies",
        description = "Number of shifted copies per taught sketch"
    )]
    pub count: u32,

    #[schemars(
        title = "Max Shift",
        description = "Largest shift along either axis, in pixels"
    )]
    pub max_shift: u32,

    #[schemars(title = "Seed", description = "PRNG seed for the shift offsets")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AugmentationParameters {
    #[schemars(
        title = "Enabled",
        description = "Store perturbed copies next to every taught sketch",
        default = "default_enabled"
    )]
    pub enabled: bool,

    #[schemars(
        title = "Rotations",
        description = "Rotation angles in degrees",
        default = "default_rotations"
    )]
    pub rotations_deg: Vec<f64>,

    #[schemars(
        title = "Scales",
        description = "Uniform scale factors",
        default = "default_scales"
    )]
    pub scales: Vec<f64>,

    #[schemars(
        title = "Jitter",
        description = "Optional seeded translation copies (empty = off)"
    )]
    pub jitter: Option<JitterParameters>,
}

impl Default for AugmentationParameters {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            rotations_deg: default_rotations(),
            scales: default_scales(),
            jitter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CentroidParameters {
    #[schemars(
        title = "Model Path",
        description = "Centroid model file (JSON) produced by export-centroids",
        extend("format" = "path", "x-file" = true, "x-must-exist" = true)
    )]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq, Default)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(ScorerKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum ScorerChoice {
    /// Nearest-neighbor voting only.
    #[default]
    Disabled,
    /// Pre-trained nearest-centroid model in front of the k-NN fallback.
    Centroid(CentroidParameters),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    #[schemars(
        title = "Grid Side",
        description = "Sketches are resampled to a side x side grid",
        range(min = 1, max = 1024),
        default = "default_grid_side"
    )]
    pub grid_side: u32,

    #[schemars(
        title = "Neighbors",
        description = "Number of nearest neighbors that vote",
        range(min = 1),
        default = "default_k"
    )]
    pub k: usize,

    #[schemars(
        title = "Confidence Threshold",
        description = "Scorer answers at or below this confidence fall back to k-NN",
        range(min = 0.0, max = 1.0),
        default = "default_confidence_threshold"
    )]
    pub confidence_threshold: f64,

    pub augmentation: AugmentationParameters,

    #[schemars(
        title = "Store Path",
        description = "Where taught examples are kept (empty = memory only)"
    )]
    pub store_path: Option<PathBuf>,

    pub scorer: ScorerChoice,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_side: default_grid_side(),
            k: default_k(),
            confidence_threshold: default_confidence_threshold(),
            augmentation: AugmentationParameters::default(),
            store_path: None,
            scorer: ScorerChoice::Disabled,
        }
    }
}

impl EngineConfig {
    pub fn schema() -> Schema {
        schema_for!(EngineConfig)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `key=value` overrides; dotted keys reach into nested tables.
    pub fn with_overrides<'a, I>(self, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut tree = serde_json::to_value(&self)?;
        for (key, value) in overrides {
            set_path(&mut tree, key, value.clone())?;
        }
        let config: EngineConfig = serde_json::from_value(tree)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_side == 0 || self.grid_side > MAX_GRID_SIDE {
            return Err(SketchError::InvalidConfiguration(format!(
                "grid_side must be in 1..={MAX_GRID_SIDE}, got {}",
                self.grid_side
            )));
        }
        if self.k == 0 {
            return Err(SketchError::InvalidConfiguration(
                "k must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(SketchError::InvalidConfiguration(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if let Some(bad) = self
            .augmentation
            .scales
            .iter()
            .find(|f| !f.is_finite() || **f <= 0.0)
        {
            return Err(SketchError::InvalidConfiguration(format!(
                "scale factors must be positive, got {bad}"
            )));
        }
        if let Some(bad) = self
            .augmentation
            .rotations_deg
            .iter()
            .find(|d| !d.is_finite())
        {
            return Err(SketchError::InvalidConfiguration(format!(
                "rotation angles must be finite, got {bad}"
            )));
        }
        Ok(())
    }

    pub fn scorer_kind(&self) -> ScorerKind {
        ScorerKind::from(&self.scorer)
    }
}

fn set_path(target: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(SketchError::InvalidConfiguration(
            "empty key is not allowed".to_string(),
        ));
    };

    let mut current = target;
    for seg in parents {
        current = ensure_object(current, path)?
            .entry((*seg).to_string())
            .or_insert(Value::Null);
    }

    ensure_object(current, path)?.insert((*last).to_string(), new_value);
    Ok(())
}

fn ensure_object<'v>(value: &'v mut Value, path: &str) -> Result<&'v mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SketchError::InvalidConfiguration(format!(
            "cannot set '{path}': {other} is not a table"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use strum::IntoEnumIterator;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_reference_behavior() {
        let c = EngineConfig::default();
        assert_eq!(c.grid_side, 16);
        assert_eq!(c.k, 3);
        assert_eq!(c.confidence_threshold, 0.4);
        assert_eq!(c.augmentation.rotations_deg, vec![-5.0, 5.0]);
        assert_eq!(c.augmentation.scales, vec![0.9, 1.1]);
        assert!(c.augmentation.jitter.is_none());
        assert_eq!(c.scorer_kind(), ScorerKind::Disabled);
        c.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{"k": 5, "augmentation": {{"scales": [0.8]}}}}"#).unwrap();
        f.flush().unwrap();

        let c = EngineConfig::from_file(f.path()).unwrap();
        assert_eq!(c.k, 5);
        assert_eq!(c.grid_side, 16);
        assert_eq!(c.augmentation.scales, vec![0.8]);
        assert_eq!(c.augmentation.rotations_deg, vec![-5.0, 5.0]);
    }

    #[test]
    fn overrides_reach_nested_keys() {
        let k = json!(1);
        let enabled = json!(false);
        let scorer = json!({"type": "centroid", "params": {"path": "m.json"}});
        let c = EngineConfig::default()
            .with_overrides([
                ("k", &k),
                ("augmentation.enabled", &enabled),
                ("scorer", &scorer),
            ])
            .unwrap();
        assert_eq!(c.k, 1);
        assert!(!c.augmentation.enabled);
        assert_eq!(c.scorer_kind(), ScorerKind::Centroid);
    }

    #[test]
    fn overrides_are_validated() {
        let zero = json!(0);
        let err = EngineConfig::default()
            .with_overrides([("k", &zero)])
            .unwrap_err();
        assert!(matches!(err, SketchError::InvalidConfiguration(_)));

        let v = json!(1);
        let err = EngineConfig::default()
            .with_overrides([("k.inner", &v)])
            .unwrap_err();
        assert!(matches!(err, SketchError::InvalidConfiguration(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut c = EngineConfig::default();
        c.grid_side = 0;
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.confidence_threshold = 1.5;
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.augmentation.scales = vec![1.0, -0.5];
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.augmentation.rotations_deg = vec![f64::NAN];
        assert!(c.validate().is_err());
    }

    #[test]
    fn scorer_choice_is_tagged() {
        let v = serde_json::to_value(ScorerChoice::Centroid(CentroidParameters {
            path: "model.json".into(),
        }))
        .unwrap();
        assert_eq!(v["type"], "centroid");
        assert_eq!(v["params"]["path"], "model.json");

        let kind: ScorerKind = "centroid".parse().unwrap();
        assert_eq!(kind, ScorerKind::Centroid);
        assert_eq!(ScorerKind::Disabled.to_string(), "disabled");
    }

    #[test]
    fn every_scorer_kind_parses_back() {
        for kind in ScorerKind::iter() {
            let name: &'static str = kind.into();
            assert_eq!(name.parse::<ScorerKind>().unwrap(), kind);
        }
        assert_eq!(ScorerKind::iter().count(), 2);
    }

    #[test]
    fn schema_exposes_ranges() {
        let schema = serde_json::to_value(EngineConfig::schema()).unwrap();
        let k = &schema["properties"]["k"];
        assert_eq!(k["minimum"], 1);
        assert_eq!(k["title"], "Neighbors");
        assert!(schema["properties"].get("scorer").is_some());
    }
}
