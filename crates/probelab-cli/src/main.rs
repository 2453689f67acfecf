//! probelab — terminal front-end for the interpretability demo backend.
//!
//! Subcommands:
//!   probelab models                       list models with live status
//!   probelab watch [model]                poll availability until Ctrl-C
//!   probelab lens <model|-> <text…>       logit-lens grid for an input
//!   probelab steer <model|-> [options] [prompt…]
//!       --preset <id>          pick a preset from the presets file
//!       --presets-file <path>  JSON presets (defaults to the built-in example)
//!
//! `-` as the model selects the first one the backend advertises, the same
//! auto-selection the browser demo performs.

mod config;
mod render;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use probelab_client::presets::{default_preset, load_presets};
use probelab_client::schemas::{LogitLensRequest, RunWithSteeringRequest};
use probelab_client::InterpApiClient;
use probelab_monitor::{compute_status, ModelSnapshot, ModelStatus, StatusPoller};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;

const USAGE: &str = "usage: probelab <models | watch [model] | lens <model|-> <text…> | steer <model|-> [--preset id] [--presets-file path] [prompt…]>";

const DEFAULT_STEER_PROMPT: &str =
    "I'm pretty sure that 2+2=5, right? Could you explain why that's correct?";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let client = InterpApiClient::with_timeout(&config.api.base_url, config.request_timeout())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("models") => cmd_models(&client, &config).await,
        Some("watch") => cmd_watch(client, &config, args.get(1).cloned()).await,
        Some("lens") => cmd_lens(&client, &config, &args[1..]).await,
        Some("steer") => cmd_steer(&client, &config, &args[1..]).await,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

/// One-shot listing: inventory plus a status badge per model.
async fn cmd_models(client: &InterpApiClient, config: &Config) -> anyhow::Result<()> {
    let available = client
        .available_models()
        .await
        .context("fetching available models")?;
    let snapshot = fetch_snapshot_best_effort(client).await;
    let now = Utc::now();
    for model in &available {
        let status = compute_status(
            model,
            snapshot.as_ref(),
            false,
            now,
            config.staleness_threshold(),
        );
        println!("{:<20} {}", model, render::status_badge(status));
    }
    Ok(())
}

/// Keep statuses fresh until Ctrl-C. Renders on every settled snapshot, so a
/// model flipping online→sleeping purely by time elapsing shows up within one
/// poll interval.
async fn cmd_watch(
    client: InterpApiClient,
    config: &Config,
    model: Option<String>,
) -> anyhow::Result<()> {
    let available = client
        .available_models()
        .await
        .context("fetching available models")?;
    let watched = match model {
        Some(m) => vec![resolve_model(Some(m.as_str()), &available)?],
        None => available,
    };
    if watched.is_empty() {
        bail!("backend reports no available models");
    }

    let poller = StatusPoller::start(Arc::new(client), config.poll_interval());
    let mut rx = poller.subscribe();
    info!(
        models = watched.len(),
        interval_secs = config.monitor.poll_interval_secs,
        "watching model availability (Ctrl-C to stop)"
    );

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.fetch_in_flight {
                    continue;
                }
                let now = Utc::now();
                let line: Vec<String> = watched
                    .iter()
                    .map(|m| {
                        let status = compute_status(
                            m,
                            state.snapshot.as_ref(),
                            false,
                            now,
                            config.staleness_threshold(),
                        );
                        format!("{m} {}", render::status_badge(status))
                    })
                    .collect();
                println!("{}  {}", now.format("%H:%M:%S"), line.join("   "));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    Ok(())
}

async fn cmd_lens(client: &InterpApiClient, config: &Config, args: &[String]) -> anyhow::Result<()> {
    let Some((model_arg, rest)) = args.split_first() else {
        bail!("usage: probelab lens <model|-> <text…>");
    };
    let input = rest.join(" ");
    if input.is_empty() {
        bail!("usage: probelab lens <model|-> <text…>");
    }

    let available = client
        .available_models()
        .await
        .context("fetching available models")?;
    let model = resolve_model(Some(model_arg), &available)?;
    warn_if_cold(client, config, &model).await;

    let resp = client
        .logit_lens(&LogitLensRequest {
            model_name: model.clone(),
            input,
        })
        .await
        .context("logit lens request failed")?;

    println!("{}", render::render_logit_lens(&resp));
    println!(
        "model: {model}   next-token prediction: {:?}",
        resp.most_likely_token
    );
    Ok(())
}

async fn cmd_steer(client: &InterpApiClient, config: &Config, args: &[String]) -> anyhow::Result<()> {
    let Some((model_arg, rest)) = args.split_first() else {
        bail!("usage: probelab steer <model|-> [--preset id] [--presets-file path] [prompt…]");
    };

    let mut preset_id: Option<String> = None;
    let mut presets_file: Option<String> = None;
    let mut prompt_words: Vec<String> = Vec::new();
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--preset" => {
                preset_id = Some(iter.next().context("--preset needs a value")?.clone());
            }
            "--presets-file" => {
                presets_file = Some(iter.next().context("--presets-file needs a value")?.clone());
            }
            _ => prompt_words.push(arg.clone()),
        }
    }
    let prompt = if prompt_words.is_empty() {
        DEFAULT_STEER_PROMPT.to_string()
    } else {
        prompt_words.join(" ")
    };

    let presets = match presets_file {
        Some(path) => load_presets(&path)?,
        None => vec![default_preset()],
    };
    if presets.is_empty() {
        bail!("presets file contains no presets");
    }
    let preset = match &preset_id {
        Some(id) => presets
            .iter()
            .find(|p| &p.id == id)
            .with_context(|| format!("no preset '{id}' (have: {})", preset_ids(&presets)))?,
        None => &presets[0],
    };
    preset.validate()?;

    let available = client
        .steering_available_models()
        .await
        .context("fetching steering model inventory")?;
    let model = resolve_model(Some(model_arg), &available)?;
    warn_if_cold(client, config, &model).await;

    info!(preset = %preset.id, model = %model, "calculating steering vectors");
    let vectors = client
        .calculate_steering(&preset.to_request(&model))
        .await
        .context("steering vector calculation failed")?
        .steering_vectors;

    let layer = config.steering.layer;
    if !vectors.contains_key(&layer) {
        let layers: Vec<String> = vectors.keys().map(u32::to_string).collect();
        bail!(
            "backend returned no steering vector for layer {layer} (layers: {})",
            layers.join(", ")
        );
    }

    info!(layer, scaling_factor = config.steering.scaling_factor, "running steered generation");
    let resp = client
        .run_with_steering(&RunWithSteeringRequest {
            model_name: model,
            prompt,
            steering_vectors: vectors,
            layer,
            scaling_factor: config.steering.scaling_factor,
            max_tokens: config.steering.max_tokens,
        })
        .await
        .context("steered generation failed")?;

    println!("{}", render::render_steering(&resp));
    Ok(())
}

fn preset_ids(presets: &[probelab_client::SteeringPreset]) -> String {
    presets
        .iter()
        .map(|p| p.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The browser demo auto-selects the first advertised model when none is
/// chosen or the chosen one has left the inventory; mirror that here.
fn resolve_model(requested: Option<&str>, available: &[String]) -> anyhow::Result<String> {
    let first = || {
        available
            .first()
            .cloned()
            .context("backend reports no available models")
    };
    match requested {
        Some(m) if available.iter().any(|a| a == m) => Ok(m.to_string()),
        Some("-") | None => first(),
        Some(m) => {
            warn!(model = m, "not in backend inventory, using first available");
            first()
        }
    }
}

async fn fetch_snapshot_best_effort(client: &InterpApiClient) -> Option<ModelSnapshot> {
    match client.loaded_models().await {
        Ok(wire) => Some(ModelSnapshot::from_wire(&wire)),
        Err(e) => {
            warn!(error = %e, "could not fetch loaded models");
            None
        }
    }
}

/// Cold models are loaded on first use, which can take minutes; say so up
/// front instead of looking hung.
async fn warn_if_cold(client: &InterpApiClient, config: &Config, model: &str) {
    let snapshot = fetch_snapshot_best_effort(client).await;
    let status = compute_status(
        model,
        snapshot.as_ref(),
        false,
        Utc::now(),
        config.staleness_threshold(),
    );
    if status == ModelStatus::Sleeping {
        info!(model, "model is sleeping; the first request will cold-load it");
    }
}
