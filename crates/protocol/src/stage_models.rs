//! Pipeline stage models.
//!
//! The engine executes a fixed sequence of five stages. Each stage is tracked
//! on the client as an [`AgentStep`] whose position in
//! [`PipelineState::steps`](crate::state_models::PipelineState::steps) equals
//! the stage's [`Stage::index`].

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// One of the five fixed pipeline stages, in execution order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Requirement analysis; produces the system architecture.
    Analyze,
    /// Per-role prompt generation.
    Generate,
    /// Per-role review and scoring.
    Review,
    /// Per-role optimization driven by review feedback.
    Optimize,
    /// Suite-wide testing.
    Test,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Analyze,
        Stage::Generate,
        Stage::Review,
        Stage::Optimize,
        Stage::Test,
    ];

    /// Zero-based position of this stage in the pipeline.
    pub fn index(self) -> usize {
        match self {
            Stage::Analyze => 0,
            Stage::Generate => 1,
            Stage::Review => 2,
            Stage::Optimize => 3,
            Stage::Test => 4,
        }
    }

    /// Canonical stage name (`analyze`, `generate`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Generate => "generate",
            Stage::Review => "review",
            Stage::Optimize => "optimize",
            Stage::Test => "test",
        }
    }

    /// Name of the engine agent that runs this stage (`analyzer`, ...).
    pub fn agent_name(self) -> &'static str {
        match self {
            Stage::Analyze => "analyzer",
            Stage::Generate => "generator",
            Stage::Review => "reviewer",
            Stage::Optimize => "optimizer",
            Stage::Test => "tester",
        }
    }

    /// Resolve a stage from its wire name.
    ///
    /// Both the stage spelling (`analyze`) and the agent spelling
    /// (`analyzer`) are accepted. Unknown names resolve to `None`.
    pub fn from_wire(name: &str) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == name || stage.agent_name() == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a single stage.
///
/// `Idle -> Running -> Completed | Error`. The terminal statuses are set
/// exactly once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl StepStatus {
    /// Returns true for `Completed` and `Error`.
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Error)
    }
}

/// Client-side view of one pipeline stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct AgentStep {
    /// Which stage this step tracks.
    pub kind: Stage,

    /// Current lifecycle status.
    pub status: StepStatus,

    /// Append-only accumulator of streamed output chunks.
    pub output: String,

    /// Ordered log of intermediate notes.
    pub thinking: Vec<String>,

    /// Highest output sequence number applied so far.
    ///
    /// Only populated when the engine numbers its chunks.
    #[serde(skip)]
    pub last_seq: Option<u64>,
}

impl AgentStep {
    /// Create an idle step for `kind`.
    pub fn idle(kind: Stage) -> Self {
        Self {
            kind,
            status: StepStatus::Idle,
            output: String::new(),
            thinking: Vec::new(),
            last_seq: None,
        }
    }
}
