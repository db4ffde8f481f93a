//! Error types for the frame solver

use thiserror::Error;

/// Main error type for frame analysis
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("{entity} references node {node}, but the model has only {node_count} nodes")]
    NodeReference {
        entity: String,
        node: usize,
        node_count: usize,
    },

    #[error("{entity} references beam {beam}, but the model has only {beam_count} beams")]
    BeamReference {
        entity: String,
        beam: usize,
        beam_count: usize,
    },

    #[error("Inconsistent input: {0}")]
    InputConsistency(String),

    #[error("Load on beam {beam} lies outside [0, {length}]: {position}")]
    LoadRange {
        beam: usize,
        position: f64,
        length: f64,
    },

    #[error("Kinematically unstable model: {0}")]
    KinematicInstability(String),

    #[error("Load group '{0}' not found")]
    UnknownLoadGroup(String),

    #[error("Load combination '{0}' not found")]
    UnknownCombination(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FrameError {
    pub(crate) fn node_reference(
        entity: impl Into<String>,
        node: usize,
        node_count: usize,
    ) -> Self {
        Self::NodeReference {
            entity: entity.into(),
            node,
            node_count,
        }
    }

    pub(crate) fn beam_reference(
        entity: impl Into<String>,
        beam: usize,
        beam_count: usize,
    ) -> Self {
        Self::BeamReference {
            entity: entity.into(),
            beam,
            beam_count,
        }
    }

    /// True for the input-reference family of errors
    pub fn is_reference_error(&self) -> bool {
        matches!(self, Self::NodeReference { .. } | Self::BeamReference { .. })
    }
}

/// Result type for frame analysis
pub type FrameResult<T> = Result<T, FrameError>;
