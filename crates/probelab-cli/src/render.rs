//! Text rendering for the terminal front-end: the logit-lens grid, status
//! badges, and the steered/unsteered comparison.

use probelab_client::schemas::{LogitLensResponse, RunWithSteeringResponse};
use probelab_monitor::ModelStatus;

const MAX_TOKEN_WIDTH: usize = 12;

pub fn status_badge(status: ModelStatus) -> &'static str {
    match status {
        ModelStatus::Online => "● online",
        ModelStatus::Sleeping => "○ sleeping",
        ModelStatus::Loading => "◌ loading",
    }
}

/// Render the per-layer grid: one row per residual-stream readout, one column
/// per input token, each cell holding the most probable token at that position
/// with a probability shade.
pub fn render_logit_lens(resp: &LogitLensResponse) -> String {
    let headers: Vec<String> = resp.input_tokens.iter().map(|t| escape_token(t)).collect();

    let mut rows: Vec<(String, Vec<String>)> = Vec::with_capacity(resp.logit_lens.len());
    for layer in &resp.logit_lens {
        let cells: Vec<String> = layer
            .max_prob_tokens
            .iter()
            .zip(&layer.max_probs)
            .map(|(tok, p)| format!("{} {} {:>3.0}%", prob_shade(*p), escape_token(tok), p * 100.0))
            .collect();
        rows.push((layer_label(&layer.hook_name), cells));
    }

    let label_width = rows
        .iter()
        .map(|(label, _)| label.len())
        .chain(std::iter::once("layer".len()))
        .max()
        .unwrap_or(0);
    let mut col_widths: Vec<usize> = headers.iter().map(String::len).collect();
    for (_, cells) in &rows {
        for (i, cell) in cells.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{:<label_width$}", "layer"));
    for (header, width) in headers.iter().zip(&col_widths) {
        out.push_str(&format!(" | {:<width$}", header, width = *width));
    }
    out.push('\n');
    for (label, cells) in &rows {
        out.push_str(&format!("{:<label_width$}", label));
        for (i, width) in col_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.chars().count());
            out.push_str(" | ");
            out.push_str(cell);
            out.push_str(&" ".repeat(pad));
        }
        out.push('\n');
    }
    out
}

pub fn render_steering(resp: &RunWithSteeringResponse) -> String {
    format!(
        "steered response:\n{}\n\nunsteered response:\n{}\n",
        resp.steered_response.trim_end(),
        resp.unsteered_response.trim_end()
    )
}

/// "blocks.9.hook_resid_post" → "L9"; anything unexpected stays as-is.
fn layer_label(hook_name: &str) -> String {
    let mut parts = hook_name.split('.');
    match (parts.next(), parts.next()) {
        (Some("blocks"), Some(idx)) if idx.parse::<u32>().is_ok() => format!("L{idx}"),
        _ => hook_name.to_string(),
    }
}

fn escape_token(token: &str) -> String {
    let escaped = token.replace('\n', "\\n").replace('\t', "\\t");
    let mut shown: String = escaped.chars().take(MAX_TOKEN_WIDTH).collect();
    if escaped.chars().count() > MAX_TOKEN_WIDTH {
        shown.push('…');
    }
    format!("'{shown}'")
}

fn prob_shade(p: f64) -> char {
    match p {
        p if p >= 0.75 => '█',
        p if p >= 0.50 => '▓',
        p if p >= 0.25 => '▒',
        _ => '░',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probelab_client::schemas::LogitLensLayer;

    fn sample_response() -> LogitLensResponse {
        LogitLensResponse {
            input_tokens: vec!["The".to_string(), " cat".to_string()],
            most_likely_token: " sat".to_string(),
            logit_lens: vec![
                LogitLensLayer {
                    hook_name: "blocks.0.hook_resid_post".to_string(),
                    max_probs: vec![0.12, 0.81],
                    max_prob_tokens: vec![" dog".to_string(), " cat".to_string()],
                },
                LogitLensLayer {
                    hook_name: "blocks.1.hook_resid_post".to_string(),
                    max_probs: vec![0.33, 0.55],
                    max_prob_tokens: vec![" a".to_string(), "\n".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_grid_has_header_plus_layer_rows() {
        let grid = render_logit_lens(&sample_response());
        assert_eq!(grid.lines().count(), 3);
        assert!(grid.starts_with("layer"));
        assert!(grid.contains("L0"));
        assert!(grid.contains("L1"));
    }

    #[test]
    fn test_newline_tokens_escaped() {
        let grid = render_logit_lens(&sample_response());
        assert!(grid.contains("'\\n'"));
        assert!(!grid.trim_end().lines().any(|l| l.is_empty()));
    }

    #[test]
    fn test_probability_shading_buckets() {
        assert_eq!(prob_shade(0.9), '█');
        assert_eq!(prob_shade(0.6), '▓');
        assert_eq!(prob_shade(0.3), '▒');
        assert_eq!(prob_shade(0.05), '░');
    }

    #[test]
    fn test_layer_label_fallback() {
        assert_eq!(layer_label("blocks.9.hook_resid_post"), "L9");
        assert_eq!(layer_label("ln_final.hook_scale"), "ln_final.hook_scale");
    }

    #[test]
    fn test_long_token_truncated() {
        let long = "a".repeat(MAX_TOKEN_WIDTH + 5);
        let shown = escape_token(&long);
        assert!(shown.ends_with("…'") || shown.chars().count() <= MAX_TOKEN_WIDTH + 3);
        assert!(shown.chars().count() < long.len());
    }

    #[test]
    fn test_status_badges() {
        assert_eq!(status_badge(ModelStatus::Online), "● online");
        assert_eq!(status_badge(ModelStatus::Sleeping), "○ sleeping");
        assert_eq!(status_badge(ModelStatus::Loading), "◌ loading");
    }
}
