//! Ingot card markup
//!
//! Renders ingots as HTML card fragments, one per ingot, in input order.
//! Every text field is escaped before it is embedded.

use crate::ingot::{bool_token, Ingot};

/// Label of the disclosure region holding the proof command
pub const PROOF_LABEL: &str = ":proof";

/// Render all ingots as concatenated card fragments
///
/// Empty input yields an empty string. Ingots are neither reordered nor
/// deduplicated.
pub fn render_markup(ingots: &[Ingot]) -> String {
    ingots.iter().map(render_card).collect()
}

/// Render a single ingot card
pub fn render_card(ingot: &Ingot) -> String {
    format!(
        r#"<div class="ingot-card" box="square">
    <div class="ingot-header">
        <span class="ingot-id">{id}</span>
        <span is="badge" class="{status}">{status}</span>
    </div>
    <div class="ingot-work">{work}</div>
    <div class="ingot-meta">
        <span>solo: {solo}</span>
        <span>grade: {grade}</span>
        <span>skill: {skill}</span>
        <span>heat: {heat}/{max}</span>
    </div>
    <details class="ingot-proof">
        <summary>{label}</summary>
        <pre><code>{proof}</code></pre>
    </details>
</div>
"#,
        id = html_escape(&ingot.id),
        status = ingot.status,
        work = html_escape(&ingot.work),
        solo = bool_token(ingot.solo),
        grade = ingot.grade,
        skill = html_escape(&ingot.skill),
        heat = ingot.heat,
        max = ingot.max,
        label = PROOF_LABEL,
        proof = html_escape(&ingot.proof),
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
