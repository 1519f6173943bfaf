//! Batch planner — partitions a recipient snapshot into provider batches.
//!
//! Recipients are grouped by their exact provider URL first, then each group
//! is cut into contiguous slices of at most `BATCH_SIZE` tokens. A token is
//! only meaningful to the provider that minted it, so two different URLs are
//! never combined into one batch even when both groups are tiny.

use std::collections::HashMap;

use herald_common::types::DeliveryRecord;

/// Maximum number of tokens in one provider request.
pub const BATCH_SIZE: usize = 100;

/// One planned provider request: a provider URL and the tokens going to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub url: String,
    pub tokens: Vec<String>,
}

/// Partition a recipient snapshot into provider-grouped, size-bounded batches.
///
/// Groups are emitted in first-seen URL order and tokens keep their snapshot
/// order within a group, so the same snapshot always plans the same batches.
/// Duplicate tokens pass through untouched; dedup is the directory's concern.
pub fn plan_batches(records: &[DeliveryRecord]) -> Vec<Batch> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<String>> = HashMap::new();

    for record in records {
        match groups.get_mut(record.url.as_str()) {
            Some(tokens) => tokens.push(record.token.clone()),
            None => {
                order.push(record.url.as_str());
                groups.insert(record.url.as_str(), vec![record.token.clone()]);
            }
        }
    }

    let mut batches = Vec::new();
    for url in order {
        for chunk in groups[url].chunks(BATCH_SIZE) {
            batches.push(Batch {
                url: url.to_string(),
                tokens: chunk.to_vec(),
            });
        }
    }

    batches
}
