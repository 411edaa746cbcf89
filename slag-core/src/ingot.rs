//! Ingot model
//!
//! An ingot is a single work item: an id, a lifecycle status, a few metadata
//! fields and an opaque proof command. Values are immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an ingot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ore,
    Molten,
    Forged,
    Cracked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ore => "ore",
            Status::Molten => "molten",
            Status::Forged => "forged",
            Status::Cracked => "cracked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ore" => Some(Status::Ore),
            "molten" => Some(Status::Molten),
            "forged" => Some(Status::Forged),
            "cracked" => Some(Status::Cracked),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal token for a boolean in markup and canonical text (`t` / `nil`)
pub fn bool_token(value: bool) -> &'static str {
    if value {
        "t"
    } else {
        "nil"
    }
}

/// A single work item
///
/// Numeric fields are signed so out-of-range values (negative heat,
/// heat above max) pass through rendering unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingot {
    pub id: String,
    pub status: Status,
    pub solo: bool,
    pub grade: i64,
    pub skill: String,
    pub heat: i64,
    pub max: i64,
    pub proof: String,
    pub work: String,
}

impl Ingot {
    /// `heat/max` as displayed on cards
    pub fn heat_ratio(&self) -> String {
        format!("{}/{}", self.heat, self.max)
    }

    /// True when heat is within `0..=max` and max is positive
    pub fn heat_in_bounds(&self) -> bool {
        self.max > 0 && self.heat >= 0 && self.heat <= self.max
    }
}

/// Ingot tally by status
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngotCounts {
    pub total: usize,
    pub ore: usize,
    pub molten: usize,
    pub forged: usize,
    pub cracked: usize,
}

impl IngotCounts {
    pub fn tally(ingots: &[Ingot]) -> Self {
        let mut counts = IngotCounts::default();
        for ingot in ingots {
            match ingot.status {
                Status::Ore => counts.ore += 1,
                Status::Molten => counts.molten += 1,
                Status::Forged => counts.forged += 1,
                Status::Cracked => counts.cracked += 1,
            }
        }
        counts.total = ingots.len();
        counts
    }

    pub fn pct_forged(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            (self.forged * 100 / self.total) as u8
        }
    }
}

fn ingot(
    id: &str,
    status: Status,
    solo: bool,
    (grade, heat, max): (i64, i64, i64),
    skill: &str,
    proof: &str,
    work: &str,
) -> Ingot {
    Ingot {
        id: id.to_string(),
        status,
        solo,
        grade,
        skill: skill.to_string(),
        heat,
        max,
        proof: proof.to_string(),
        work: work.to_string(),
    }
}

/// The demo ingots shown on the showcase page when no config supplies a list
pub fn example_ingots() -> Vec<Ingot> {
    vec![
        ingot(
            "i1",
            Status::Ore,
            true,
            (1, 0, 5),
            "default",
            "test -f package.json",
            "Initialize project with package.json and git repo",
        ),
        ingot(
            "i2",
            Status::Molten,
            true,
            (2, 2, 5),
            "web",
            "test -f index.html && grep -q 'viewport' index.html",
            "Create mobile-first HTML structure with semantic markup",
        ),
        ingot(
            "i3",
            Status::Forged,
            true,
            (1, 1, 5),
            "cli",
            "test -f wrangler.toml && grep -q 'pages_build_output_dir' wrangler.toml",
            "Configure Cloudflare Pages deployment",
        ),
        ingot(
            "i4",
            Status::Forged,
            false,
            (3, 3, 8),
            "web",
            "npm run build && test -d dist",
            "Implement terminal-UI CSS theme with responsive breakpoints",
        ),
        ingot(
            "i5",
            Status::Cracked,
            false,
            (4, 8, 8),
            "web",
            "npx playwright test e2e/",
            "Add end-to-end browser tests with Playwright",
        ),
        ingot(
            "i6",
            Status::Ore,
            false,
            (2, 0, 5),
            "cli",
            "wrangler pages deploy dist --project-name=slag-dev --dry-run 2>&1 | grep -q 'Success'",
            "Deploy built site to Cloudflare Pages",
        ),
    ]
}
