use serde::{Deserialize, Serialize};

/// A single recipient's delivery details, as stored in the directory.
///
/// `url` is the push provider endpoint the recipient's token belongs to;
/// `token` is an opaque credential minted by that provider. Tokens from
/// different URLs must never be sent to the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub url: String,
    pub token: String,
}

/// The logical message of one broadcast: what every recipient sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub title: String,
    pub body: String,
}

/// Aggregate result of one broadcast run, returned to the caller.
///
/// `successful + invalid + rate_limited` can be less than `total_users`:
/// a batch whose provider was unreachable contributes nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSummary {
    pub successful: usize,
    pub invalid: usize,
    pub rate_limited: usize,
    pub total_batches: usize,
    pub total_users: usize,
}
