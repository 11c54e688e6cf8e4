use serde::{Deserialize, Serialize};

use crate::event::SessionEvent;
use crate::evaluation::EvaluationResult;

/// Exit contract of a batch run: serializable to JSON without loss,
/// per `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub module_id: String,
    pub agent_id: String,
    pub events: Vec<SessionEvent>,
    pub evaluation: EvaluationResult,
}

impl RunResult {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
