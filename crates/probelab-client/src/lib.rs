//! probelab-client — Typed HTTP client for the interpretability demo backend.
//!
//! The backend exposes two demo surfaces (logit lens and steering vectors)
//! plus two small inventory endpoints:
//!   GET  /loaded_models             model name → last-load timestamp
//!   GET  /available_models          logit-lens model inventory
//!   GET  /steering/available_models steering model inventory
//!   POST /logitlens                 per-layer most-likely-token grid
//!   POST /steering/calculate        mean-difference steering vectors
//!   POST /steering/run_with_steering steered vs. unsteered generation

pub mod api;
pub mod presets;
pub mod schemas;

pub use api::InterpApiClient;
pub use presets::SteeringPreset;
