//! Reader for canonical ingot lines and crucible files
//!
//! A crucible is plain text: `;;` comment lines followed by one
//! `(ingot ...)` line per ingot.

use super::INGOT_OPEN;
use crate::ingot::{Ingot, Status};
use anyhow::{anyhow, bail, Context, Result};

/// Parse a single canonical line into an ingot
///
/// Unknown keys are ignored; missing keys other than `:id` take defaults.
pub fn parse_ingot(line: &str) -> Result<Ingot> {
    let line = line.trim();
    let inner = line
        .strip_prefix(INGOT_OPEN)
        .ok_or_else(|| anyhow!("not an ingot line: {}", line))?;
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    let fields = parse_fields(inner);
    let get = |key: &str| -> Option<&str> {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let id = get("id")
        .ok_or_else(|| anyhow!("ingot is missing :id"))?
        .to_string();
    let status = match get("status") {
        Some(s) => Status::parse(s).ok_or_else(|| anyhow!("unknown status '{}' for {}", s, id))?,
        None => Status::Ore,
    };
    let solo = match get("solo") {
        None | Some("t") => true,
        Some("nil") => false,
        Some(other) => bail!("invalid :solo '{}' for {} (expected t or nil)", other, id),
    };
    let int = |key: &str, default: i64| -> Result<i64> {
        match get(key) {
            Some(s) => s
                .parse()
                .with_context(|| format!("invalid :{} '{}' for {}", key, s, id)),
            None => Ok(default),
        }
    };

    Ok(Ingot {
        grade: int("grade", 1)?,
        heat: int("heat", 0)?,
        max: int("max", 5)?,
        skill: get("skill").unwrap_or("default").to_string(),
        proof: get("proof").unwrap_or("true").to_string(),
        work: get("work").unwrap_or_default().to_string(),
        id,
        status,
        solo,
    })
}

/// Parse every ingot line in crucible content
///
/// Comment and header lines are skipped. Malformed ingot lines are skipped
/// with a warning.
pub fn parse_crucible(content: &str) -> Vec<Ingot> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with(INGOT_OPEN))
        .filter_map(|(idx, line)| match parse_ingot(line) {
            Ok(ingot) => Some(ingot),
            Err(e) => {
                log::warn!("skipping crucible line {}: {:#}", idx + 1, e);
                None
            }
        })
        .collect()
}

/// Parse `:key value` pairs from the inner content of an ingot line
fn parse_fields(s: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut chars = s.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(c) = chars.next() else {
            break;
        };
        if c != ':' {
            continue;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
            key.push(c);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' => match chars.next_if(|c| *c == '"' || *c == 'n') {
                        Some('n') => value.push('\n'),
                        Some(quote) => value.push(quote),
                        None => value.push('\\'),
                    },
                    _ => value.push(c),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != ')') {
                value.push(c);
            }
        }

        fields.push((key, value));
    }

    fields
}
