use gd_core::{FeatureId, LayerId, SnapshotError};
use thiserror::Error;

/// Faults surfaced at the controller boundary. None of them leave the map
/// or the history in an inconsistent state.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no active vector layer")]
    NoActiveLayer,

    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),

    #[error("layer {0} is not a vector layer")]
    NotVectorLayer(LayerId),

    #[error("nothing is selected")]
    EmptySelection,

    #[error("the clipboard is empty")]
    EmptyClipboard,

    #[error("geometry update for {0} arrived without its earlier state")]
    MissingBeforeState(FeatureId),

    #[error("clipboard data could not be processed: {0}")]
    Clipboard(#[from] SnapshotError),
}
