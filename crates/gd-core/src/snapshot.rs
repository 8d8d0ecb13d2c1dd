//! Compact binary snapshots of feature lists (MessagePack).
//!
//! Used for the clipboard. Ids, geometry and style survive unchanged.

use crate::feature::Feature;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode features: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode features: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

pub fn encode_features(features: &[Feature]) -> Result<Vec<u8>, SnapshotError> {
    Ok(rmp_serde::to_vec_named(features)?)
}

pub fn decode_features(bytes: &[u8]) -> Result<Vec<Feature>, SnapshotError> {
    let features: Vec<Feature> = rmp_serde::from_slice(bytes)?;
    log::debug!("decoded {} feature(s) from snapshot", features.len());
    Ok(features)
}
