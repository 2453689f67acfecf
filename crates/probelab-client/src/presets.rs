//! Steering presets: named bundles of (prompt, positive, negative) example
//! triples that seed a `POST /steering/calculate` request.

use std::path::Path;

use probelab_common::{ProbelabError, Result};
use serde::{Deserialize, Serialize};

use crate::schemas::SteeringVectorRequest;

/// The steering demo caps example pairs at ten.
pub const MAX_EXAMPLE_PAIRS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_prompts: Vec<String>,
    pub positive_responses: Vec<String>,
    pub negative_responses: Vec<String>,
}

impl SteeringPreset {
    /// The lists must be parallel and within the demo's bounds.
    pub fn validate(&self) -> Result<()> {
        let n = self.user_prompts.len();
        if n == 0 {
            return Err(ProbelabError::Preset(format!(
                "preset '{}' has no example pairs",
                self.id
            )));
        }
        if n > MAX_EXAMPLE_PAIRS {
            return Err(ProbelabError::Preset(format!(
                "preset '{}' has {} example pairs (max {})",
                self.id, n, MAX_EXAMPLE_PAIRS
            )));
        }
        if self.positive_responses.len() != n || self.negative_responses.len() != n {
            return Err(ProbelabError::Preset(format!(
                "preset '{}' has mismatched list lengths ({} prompts, {} positive, {} negative)",
                self.id,
                n,
                self.positive_responses.len(),
                self.negative_responses.len()
            )));
        }
        Ok(())
    }

    /// Build the calculate request for this preset, dropping blank entries the
    /// same way the demo form does before submitting.
    pub fn to_request(&self, model_name: impl Into<String>) -> SteeringVectorRequest {
        let keep: Vec<usize> = self
            .user_prompts
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.trim().is_empty())
            .map(|(i, _)| i)
            .collect();
        SteeringVectorRequest {
            model_name: model_name.into(),
            user_prompts: keep.iter().map(|&i| self.user_prompts[i].clone()).collect(),
            assistant_positive_responses: keep
                .iter()
                .map(|&i| self.positive_responses[i].clone())
                .collect(),
            assistant_negative_responses: keep
                .iter()
                .map(|&i| self.negative_responses[i].clone())
                .collect(),
        }
    }
}

/// The demo's built-in example: steering a model's sentiment about cats.
pub fn default_preset() -> SteeringPreset {
    SteeringPreset {
        id: "cats".to_string(),
        name: "Cat sentiment".to_string(),
        description: Some("Steer the model toward (or away from) liking cats.".to_string()),
        user_prompts: vec!["What do you think about cats?".to_string()],
        positive_responses: vec!["I love cats! They're wonderful companions.".to_string()],
        negative_responses: vec!["I hate cats. They're annoying animals.".to_string()],
    }
}

/// Load presets from a JSON array file. Every preset is validated; a single
/// bad entry fails the whole load so misconfigured files are caught early.
pub fn load_presets(path: impl AsRef<Path>) -> Result<Vec<SteeringPreset>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ProbelabError::Preset(format!("cannot read {}: {}", path.display(), e))
    })?;
    let presets: Vec<SteeringPreset> = serde_json::from_str(&raw)?;
    for preset in &presets {
        preset.validate()?;
    }
    Ok(presets)
}
