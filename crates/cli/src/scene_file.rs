use anyhow::{anyhow, Context, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use sightline::api::{
    calculate_from_viewpoints, viewpoints_for, CalculatorConfig, PercentVisibleResult, Scene,
};
use std::fs;
use std::path::Path;

/// One viewer → target evaluation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default)]
    pub viewer: Option<u64>,
    pub target: u64,
    /// Explicit eyes; when absent they come from the viewer token.
    #[serde(default)]
    pub viewpoints: Option<Vec<Point3<f64>>>,
    #[serde(default)]
    pub target_location: Option<Point3<f64>>,
}

/// Scene plus configuration plus queries, as read from disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub scene: Scene,
    pub config: CalculatorConfig,
    pub queries: Vec<QuerySpec>,
}

/// Printed per query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub viewer: Option<u64>,
    pub target: u64,
    pub kind: &'static str,
    pub percent_visible: f64,
}

impl SceneFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading scene {}", path.display()))?;
        let file: SceneFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing scene {}", path.display()))?;
        file.scene
            .validate()
            .with_context(|| format!("validating scene {}", path.display()))?;
        Ok(file)
    }

    /// Effective configuration: repaired values, scene grid size if given.
    pub fn effective_config(&self) -> CalculatorConfig {
        let mut cfg = self.config.clone().sanitized();
        if let Some(g) = self.scene.grid_size {
            cfg.grid_size = g;
        }
        cfg.sanitized()
    }

    pub fn evaluate(&self, query: &QuerySpec, config: &CalculatorConfig) -> Result<QueryOutcome> {
        let target = self
            .scene
            .token(query.target)
            .ok_or_else(|| anyhow!("unknown target token {}", query.target))?;
        let viewer = match query.viewer {
            Some(id) => Some(
                self.scene
                    .token(id)
                    .ok_or_else(|| anyhow!("unknown viewer token {id}"))?,
            ),
            None => None,
        };
        let eyes = match (&query.viewpoints, viewer) {
            (Some(v), _) => v.clone(),
            (None, Some(v)) => viewpoints_for(v, &config.viewpoints, config.prone_height_multiplier),
            (None, None) => {
                return Err(anyhow!(
                    "query for target {} has neither viewer nor viewpoints",
                    query.target
                ))
            }
        };
        let result: PercentVisibleResult = calculate_from_viewpoints(
            &self.scene,
            viewer,
            target,
            &eyes,
            query.target_location,
            config,
        );
        tracing::debug!(target = query.target, eyes = eyes.len(), kind = result.kind(), "query");
        Ok(QueryOutcome {
            viewer: query.viewer,
            target: query.target,
            kind: result.kind(),
            percent_visible: result.percent_visible(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;
    use sightline::api::{Token, Wall};
    use tempfile::tempdir;

    fn sample() -> SceneFile {
        SceneFile {
            scene: Scene {
                tokens: vec![
                    Token::square(1, point![0.0, 0.0], 100.0, 0.0, 100.0),
                    Token::square(2, point![1000.0, 0.0], 100.0, 0.0, 100.0),
                ],
                ..Scene::default()
            },
            config: CalculatorConfig::default(),
            queries: vec![QuerySpec {
                viewer: Some(1),
                target: 2,
                viewpoints: None,
                target_location: None,
            }],
        }
    }

    #[test]
    fn load_reads_what_was_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let file = sample();
        fs::write(&path, serde_json::to_vec_pretty(&file).unwrap()).unwrap();
        let loaded = SceneFile::load(&path).unwrap();
        assert_eq!(loaded.queries, file.queries);
        assert_eq!(loaded.scene.tokens.len(), 2);
    }

    #[test]
    fn load_rejects_duplicate_tokens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.json");
        let mut file = sample();
        file.scene.tokens.push(file.scene.tokens[0].clone());
        fs::write(&path, serde_json::to_vec(&file).unwrap()).unwrap();
        let err = SceneFile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate"), "{err:#}");
    }

    #[test]
    fn partial_config_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"config": {"algorithm": "points"}}"#).unwrap();
        let loaded = SceneFile::load(&path).unwrap();
        assert!(loaded.queries.is_empty());
        assert_eq!(loaded.config.grid_size, CalculatorConfig::default().grid_size);
        assert!(SceneFile::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn evaluate_open_and_walled() {
        let mut file = sample();
        let cfg = file.effective_config();
        let open = file.evaluate(&file.queries[0], &cfg).unwrap();
        assert_eq!(open.percent_visible, 1.0);
        assert_eq!(open.kind, "fully-visible");

        file.scene.walls.push(Wall::new(point![500.0, -1000.0], point![500.0, 1000.0]));
        let walled = file.evaluate(&file.queries[0], &cfg).unwrap();
        assert_eq!(walled.percent_visible, 0.0);

        let bad = QuerySpec {
            viewer: None,
            target: 2,
            viewpoints: None,
            target_location: None,
        };
        assert!(file.evaluate(&bad, &cfg).is_err());
    }
}
