//! Request/response shapes for the demo backend, as observed on the wire.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Body of `GET /loaded_models`: model name → ISO-8601 timestamp of last load.
/// Absence of a key means the model is not loaded. The backend emits naive
/// local timestamps (`datetime.now().isoformat()`), so values stay as strings
/// here and are parsed leniently by the monitor.
pub type LoadedModels = HashMap<String, String>;

/// Steering vectors keyed by layer index. JSON object keys arrive as strings;
/// serde_json maps them onto integer keys both ways.
pub type SteeringVectors = BTreeMap<u32, Vec<f64>>;

// ── Logit lens ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogitLensRequest {
    pub model_name: String,
    pub input: String,
}

/// One residual-stream readout: the most probable vocabulary token (and its
/// probability) at every input position, after one transformer block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogitLensLayer {
    pub hook_name: String,
    pub max_probs: Vec<f64>,
    pub max_prob_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogitLensResponse {
    pub input_tokens: Vec<String>,
    pub most_likely_token: String,
    pub logit_lens: Vec<LogitLensLayer>,
}

// ── Steering ──────────────────────────────────────────────────────────────────

/// `POST /steering/calculate`. The three lists are parallel: entry *i* of each
/// forms one (prompt, positive response, negative response) example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringVectorRequest {
    pub model_name: String,
    pub user_prompts: Vec<String>,
    pub assistant_positive_responses: Vec<String>,
    pub assistant_negative_responses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringVectorResponse {
    pub steering_vectors: SteeringVectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunWithSteeringRequest {
    pub model_name: String,
    pub prompt: String,
    pub steering_vectors: SteeringVectors,
    pub layer: u32,
    pub scaling_factor: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunWithSteeringResponse {
    pub steered_response: String,
    pub unsteered_response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_models_shape() {
        let body = r#"{"gpt2-small": "2025-08-30T12:00:00.123456", "gemma-2b": "2025-08-30T12:01:00"}"#;
        let loaded: LoadedModels = serde_json::from_str(body).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains_key("gpt2-small"));
    }

    #[test]
    fn test_logit_lens_response_shape() {
        let body = r#"{
            "input_tokens": ["The", " cat"],
            "most_likely_token": " sat",
            "logit_lens": [
                {"hook_name": "blocks.0.hook_resid_post", "max_probs": [0.12, 0.4], "max_prob_tokens": [" dog", " cat"]}
            ]
        }"#;
        let resp: LogitLensResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.input_tokens.len(), 2);
        assert_eq!(resp.logit_lens[0].max_probs.len(), resp.logit_lens[0].max_prob_tokens.len());
    }

    #[test]
    fn test_steering_vectors_integer_keys() {
        // The backend serializes layer indices as JSON object keys (strings).
        let body = r#"{"steering_vectors": {"9": [0.1, -0.2], "12": [0.0, 1.5]}}"#;
        let resp: SteeringVectorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.steering_vectors.len(), 2);
        assert_eq!(resp.steering_vectors[&9], vec![0.1, -0.2]);

        let back = serde_json::to_value(&resp).unwrap();
        assert!(back["steering_vectors"]["12"].is_array());
    }

    #[test]
    fn test_run_with_steering_request_round_trip() {
        let req = RunWithSteeringRequest {
            model_name: "gemma-2-2b-it".to_string(),
            prompt: "I'm pretty sure that 2+2=5, right?".to_string(),
            steering_vectors: SteeringVectors::from([(9, vec![0.5, 0.5])]),
            layer: 9,
            scaling_factor: 5.0,
            max_tokens: 50,
        };
        let json = serde_json::to_string(&req).unwrap();
        let parsed: RunWithSteeringRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.layer, 9);
        assert_eq!(parsed.steering_vectors[&9].len(), 2);
    }
}
