// ============================================================
// Layer 5 — Model Artifact
// ============================================================
// The artifact is produced by an external training pipeline and
// exported as JSON. Three model families are understood:
//
//   nearest_centroid → label of the closest class centre
//   linear           → argmax over one linear score per class
//   decision_tree    → walk split nodes until a leaf
//
// Example:
//   {"kind": "nearest_centroid",
//    "centroids": [{"label": 0, "center": [5.0, 3.4, 1.5, 0.2]}, ...]}
//
// Parsing and shape validation both happen in `from_slice`, so an
// artifact that loads is guaranteed to predict without indexing
// out of bounds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::errors::PredictError;
use crate::domain::features::{FeatureVector, FEATURE_COUNT};
use crate::domain::label::RawLabel;
use crate::domain::traits::Classifier;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {kind} artifact: {reason}")]
    Shape { kind: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub label: RawLabel,
    pub center: [f64; FEATURE_COUNT],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when `features[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: RawLabel,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    NearestCentroid {
        centroids: Vec<Centroid>,
    },
    Linear {
        classes: Vec<RawLabel>,
        /// One row of FEATURE_COUNT weights per class
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    DecisionTree {
        /// nodes[0] is the root; children always have a higher index
        nodes: Vec<TreeNode>,
    },
}

impl ModelArtifact {
    /// Deserialise and validate artifact bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    #[cfg(test)]
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ModelArtifact::NearestCentroid { .. } => "nearest_centroid",
            ModelArtifact::Linear { .. } => "linear",
            ModelArtifact::DecisionTree { .. } => "decision_tree",
        }
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let kind = self.kind_name();
        let shape = |reason: String| ArtifactError::Shape { kind, reason };

        match self {
            ModelArtifact::NearestCentroid { centroids } => {
                if centroids.is_empty() {
                    return Err(shape("no centroids".into()));
                }
                if centroids.iter().any(|c| c.center.iter().any(|v| !v.is_finite())) {
                    return Err(shape("centroid has a non-finite coordinate".into()));
                }
            }
            ModelArtifact::Linear { classes, weights, intercepts } => {
                if classes.is_empty() {
                    return Err(shape("no classes".into()));
                }
                if weights.len() != classes.len() || intercepts.len() != classes.len() {
                    return Err(shape(format!(
                        "{} classes but {} weight rows and {} intercepts",
                        classes.len(),
                        weights.len(),
                        intercepts.len()
                    )));
                }
                if let Some(row) = weights.iter().find(|r| r.len() != FEATURE_COUNT) {
                    return Err(shape(format!(
                        "weight row has {} values, expected {FEATURE_COUNT}",
                        row.len()
                    )));
                }
            }
            ModelArtifact::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return Err(shape("empty tree".into()));
                }
                for (i, node) in nodes.iter().enumerate() {
                    if let TreeNode::Split { feature, left, right, .. } = node {
                        if *feature >= FEATURE_COUNT {
                            return Err(shape(format!("node {i} splits on feature {feature}")));
                        }
                        // Forward-only edges rule out cycles
                        for child in [left, right] {
                            if *child <= i || *child >= nodes.len() {
                                return Err(shape(format!("node {i} has bad child {child}")));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_one(&self, x: &FeatureVector) -> Result<RawLabel, PredictError> {
        match self {
            ModelArtifact::NearestCentroid { centroids } => {
                let mut best: Option<(&Centroid, f64)> = None;
                for c in centroids {
                    let d: f64 = c
                        .center
                        .iter()
                        .zip(x.values())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum();
                    // Strict < keeps the first centroid on ties
                    if best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((c, d));
                    }
                }
                best.map(|(c, _)| c.label.clone()).ok_or(PredictError::EmptyOutput)
            }
            ModelArtifact::Linear { classes, weights, intercepts } => {
                let mut best: Option<(usize, f64)> = None;
                for (k, (row, b)) in weights.iter().zip(intercepts).enumerate() {
                    let score = b + row.iter().zip(x.values()).map(|(w, v)| w * v).sum::<f64>();
                    if score.is_nan() {
                        return Err(PredictError::Model(format!("class {k} scored NaN")));
                    }
                    if best.map_or(true, |(_, bs)| score > bs) {
                        best = Some((k, score));
                    }
                }
                best.map(|(k, _)| classes[k].clone()).ok_or(PredictError::EmptyOutput)
            }
            ModelArtifact::DecisionTree { nodes } => {
                let mut i = 0;
                loop {
                    match nodes.get(i) {
                        Some(TreeNode::Leaf { label }) => return Ok(label.clone()),
                        Some(TreeNode::Split { feature, threshold, left, right }) => {
                            let v = x.get(*feature).ok_or_else(|| {
                                PredictError::Model(format!("feature index {feature} out of range"))
                            })?;
                            i = if v <= *threshold { *left } else { *right };
                        }
                        None => {
                            return Err(PredictError::Model(format!("dangling node index {i}")))
                        }
                    }
                }
            }
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<RawLabel>, PredictError> {
        batch.iter().map(|x| self.predict_one(x)).collect()
    }

    fn kind(&self) -> &'static str {
        self.kind_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::Species;
    use crate::ml::fixtures;

    fn fv(v: [f64; 4]) -> FeatureVector {
        FeatureVector::new(v).unwrap()
    }

    #[test]
    fn test_nearest_centroid_classifies_reference_flowers() {
        let model = ModelArtifact::from_slice(fixtures::IRIS_CENTROIDS_JSON.as_bytes()).unwrap();
        let out = model
            .predict(&[
                fv([5.1, 3.5, 1.4, 0.2]),
                fv([6.0, 2.8, 4.4, 1.3]),
                fv([6.7, 3.0, 5.6, 2.2]),
            ])
            .unwrap();
        assert_eq!(out, vec![RawLabel::Index(0), RawLabel::Index(1), RawLabel::Index(2)]);
    }

    #[test]
    fn test_float_class_labels_load_as_indexes() {
        let json = r#"{
            "kind": "nearest_centroid",
            "centroids": [
                {"label": 0.0, "center": [5.006, 3.428, 1.462, 0.246]},
                {"label": 1.0, "center": [5.936, 2.770, 4.260, 1.326]}
            ]
        }"#;
        let model = ModelArtifact::from_slice(json.as_bytes()).unwrap();
        let out = model.predict(&[fv([5.1, 3.5, 1.4, 0.2])]).unwrap();
        assert_eq!(out, vec![RawLabel::Index(0)]);
        assert_eq!(Species::from_raw(&out[0]), Species::Setosa);

        let fractional = json.replace("1.0,", "1.5,");
        assert!(matches!(
            ModelArtifact::from_slice(fractional.as_bytes()),
            Err(ArtifactError::Json(_))
        ));
    }

    #[test]
    fn test_linear_argmax_with_string_classes() {
        let json = r#"{
            "kind": "linear",
            "classes": ["setosa", "virginica"],
            "weights": [[0, 0, -1, 0], [0, 0, 1, 0]],
            "intercepts": [2.5, -2.5]
        }"#;
        let model = ModelArtifact::from_slice(json.as_bytes()).unwrap();
        let out = model.predict(&[fv([5.0, 3.0, 1.0, 0.2]), fv([6.0, 3.0, 5.0, 2.0])]).unwrap();
        assert_eq!(out, vec![RawLabel::from("setosa"), RawLabel::from("virginica")]);
    }

    #[test]
    fn test_decision_tree_walks_to_leaf() {
        let json = r#"{
            "kind": "decision_tree",
            "nodes": [
                {"feature": 2, "threshold": 2.45, "left": 1, "right": 2},
                {"label": 0},
                {"feature": 3, "threshold": 1.75, "left": 3, "right": 4},
                {"label": 1},
                {"label": 2}
            ]
        }"#;
        let model = ModelArtifact::from_slice(json.as_bytes()).unwrap();
        let out = model
            .predict(&[fv([5.0, 3.4, 1.5, 0.2]), fv([5.9, 2.8, 4.3, 1.3]), fv([6.5, 3.0, 5.5, 2.1])])
            .unwrap();
        assert_eq!(out, vec![RawLabel::Index(0), RawLabel::Index(1), RawLabel::Index(2)]);
    }

    #[test]
    fn test_rejects_garbage_and_unknown_kind() {
        assert!(matches!(
            ModelArtifact::from_slice(b"\x80\x04pickle"),
            Err(ArtifactError::Json(_))
        ));
        assert!(ModelArtifact::from_slice(br#"{"kind": "random_forest", "trees": []}"#).is_err());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let wrong_width = r#"{"kind": "linear", "classes": [0], "weights": [[1, 2]], "intercepts": [0]}"#;
        assert!(matches!(
            ModelArtifact::from_slice(wrong_width.as_bytes()),
            Err(ArtifactError::Shape { kind: "linear", .. })
        ));

        let cyclic = r#"{"kind": "decision_tree", "nodes": [{"feature": 0, "threshold": 1, "left": 0, "right": 1}, {"label": 0}]}"#;
        assert!(ModelArtifact::from_slice(cyclic.as_bytes()).is_err());

        let empty = r#"{"kind": "nearest_centroid", "centroids": []}"#;
        assert!(ModelArtifact::from_slice(empty.as_bytes()).is_err());
    }

    #[test]
    fn test_bytes_round_trip_predicts_identically() {
        let model = ModelArtifact::from_slice(fixtures::IRIS_CENTROIDS_JSON.as_bytes()).unwrap();
        let reloaded = ModelArtifact::from_slice(&model.to_bytes().unwrap()).unwrap();
        let x = [fv([6.1, 2.9, 4.7, 1.4])];
        assert_eq!(model.predict(&x).unwrap(), reloaded.predict(&x).unwrap());
    }
}
