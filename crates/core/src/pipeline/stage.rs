use serde::Serialize;
use std::fmt;

/// States a single request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Resolving,
    Materializing,
    Muxing,
    Delivering,
    Cleanup,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Materializing => "materializing",
            Self::Muxing => "muxing",
            Self::Delivering => "delivering",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
