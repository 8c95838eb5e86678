//! Cross-source matching: exact insurance-id lookup first, fuzzy name
//! fallback second.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::{ClientRecord, MatchResult, RowSet, StatusSourceEntry};
use crate::normalize::normalize_name;
use crate::aggregate::INSURANCE_ID;
use crate::consolidate::{CLIENT, STATUS};

/// Matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum token sort ratio (0–100) a fuzzy match must reach to be
    /// accepted. A score equal to the threshold is accepted.
    pub threshold: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig { threshold: 90 }
    }
}

/// Builds the read-only entry collection for one external status source.
/// Fails when the source is missing its required columns.
pub fn prepare_source(rows: &RowSet) -> Result<Vec<StatusSourceEntry>> {
    rows.require_columns(&[CLIENT, INSURANCE_ID])?;
    let entries = rows
        .rows
        .iter()
        .map(|row| {
            let name = RowSet::cell(row, CLIENT).as_text();
            StatusSourceEntry {
                normalized_name: normalize_name(name.as_deref()),
                name,
                insurance_id: RowSet::cell(row, INSURANCE_ID).as_text(),
                status: RowSet::cell(row, STATUS).as_text(),
            }
        })
        .collect();
    Ok(entries)
}

/// Resolves every client against one external source, producing one
/// [`MatchResult`] per client. Pure: no source entry is mutated and no
/// state is shared across clients, so sources can be matched independently.
///
/// Per client: a non-null insurance id with at least one exactly equal
/// entry returns the first such entry's status and skips name matching
/// entirely. Otherwise — including when the id is non-null but has no
/// exact hit, which deliberately falls through — the best token sort ratio
/// against every entry's normalized name decides, accepted only at or
/// above the threshold. First entry wins ties.
pub fn match_source(
    clients: &[ClientRecord],
    source: &[StatusSourceEntry],
    source_label: &str,
    config: &MatchConfig,
) -> Vec<MatchResult> {
    // First-occurrence index keeps the exact path O(1) per client while
    // preserving "first hit in source order".
    let mut by_insurance_id: HashMap<&str, &StatusSourceEntry> = HashMap::new();
    for entry in source {
        if let Some(insurance_id) = entry.insurance_id.as_deref() {
            by_insurance_id.entry(insurance_id).or_insert(entry);
        }
    }
    let sort_keys: Vec<String> = source
        .iter()
        .map(|entry| token_sort_key(&entry.normalized_name))
        .collect();

    let results: Vec<MatchResult> = clients
        .iter()
        .map(|client| MatchResult {
            client_id: client.client_id.clone(),
            source: source_label.to_string(),
            status: resolve(client, source, &by_insurance_id, &sort_keys, config),
        })
        .collect();

    debug!(
        source = source_label,
        matched = results.iter().filter(|r| r.status.is_some()).count(),
        clients = clients.len(),
        "matched clients against source"
    );
    results
}

fn resolve(
    client: &ClientRecord,
    source: &[StatusSourceEntry],
    by_insurance_id: &HashMap<&str, &StatusSourceEntry>,
    sort_keys: &[String],
    config: &MatchConfig,
) -> Option<String> {
    if let Some(insurance_id) = client.insurance_id.as_deref() {
        if let Some(entry) = by_insurance_id.get(insurance_id) {
            return entry.status.clone();
        }
        // No exact hit: fall through to the name comparison below.
    }

    let client_key = token_sort_key(&client.normalized_name);
    let mut best: Option<(f64, usize)> = None;
    for (index, entry_key) in sort_keys.iter().enumerate() {
        let score = edit_similarity(&client_key, entry_key);
        // Strict comparison keeps the first entry on ties.
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, index));
        }
    }

    let (score, index) = best?;
    if score >= config.threshold as f64 {
        source[index].status.clone()
    } else {
        None
    }
}

/// Token-order-independent similarity (0–100) between two names: both are
/// whitespace-tokenized, the tokens sorted lexicographically and rejoined,
/// and the rejoined strings compared by normalized edit distance.
pub fn token_sort_ratio(lhs: &str, rhs: &str) -> f64 {
    edit_similarity(&token_sort_key(lhs), &token_sort_key(rhs))
}

fn token_sort_key(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized Levenshtein similarity scaled to 0–100. Scaling stays in
/// integers until the final divide so a score of exactly 90 compares equal
/// to a threshold of 90. Two empty strings score 0: an absent name never
/// matches anything.
fn edit_similarity(lhs: &str, rhs: &str) -> f64 {
    let max_len = lhs.chars().count().max(rhs.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = strsim::levenshtein(lhs, rhs);
    ((max_len - distance) * 100) as f64 / max_len as f64
}
