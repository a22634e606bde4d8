use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CaselineError;

/// Metadata keys that survive the projection into [`CaseView`].
pub const META_PARSED_BEST_FIELDS: &str = "parsed_best_fields_v1";
pub const META_AGENT_QUEUE: &str = "agent_queue";

/// A supplier-communication case as stored by the workflow.
///
/// `state`, `status` and everything inside `meta` are owned by the upstream
/// workflow and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub po_number: String,
    pub line_id: String,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub state: String,
    pub status: String,
    #[serde(default)]
    pub missing_fields: Option<Vec<String>>,
    #[serde(default)]
    pub next_check_at: Option<i64>,
    pub updated_at: i64,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Case {
    /// The metadata as a mapping. Anything that is not a JSON object reads as empty.
    pub fn meta_map(&self) -> Map<String, Value> {
        match &self.meta {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Checks applied before a case is written.
    pub fn validate(&self) -> Result<(), CaselineError> {
        if self.case_id.is_empty() {
            return Err(CaselineError::InvalidInput("case_id must not be empty".into()));
        }
        Ok(())
    }
}

/// Read projection of a [`Case`] returned by `GET /cases/{case_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseView {
    pub case_id: String,
    pub po_number: String,
    pub line_id: String,
    pub supplier_name: Option<String>,
    pub state: String,
    pub status: String,
    pub missing_fields: Vec<String>,
    pub next_check_at: Option<i64>,
    pub updated_at: i64,
    pub meta: CaseMetaView,
}

/// The two recognised metadata entries. Missing keys serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseMetaView {
    #[serde(default)]
    pub parsed_best_fields_v1: Value,
    #[serde(default)]
    pub agent_queue: Value,
}

impl CaseMetaView {
    fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            parsed_best_fields_v1: map.remove(META_PARSED_BEST_FIELDS).unwrap_or(Value::Null),
            agent_queue: map.remove(META_AGENT_QUEUE).unwrap_or(Value::Null),
        }
    }
}

impl From<&Case> for CaseView {
    fn from(case: &Case) -> Self {
        CaseView {
            case_id: case.case_id.clone(),
            po_number: case.po_number.clone(),
            line_id: case.line_id.clone(),
            supplier_name: case.supplier_name.clone(),
            state: case.state.clone(),
            status: case.status.clone(),
            missing_fields: case.missing_fields.clone().unwrap_or_default(),
            next_check_at: case.next_check_at,
            updated_at: case.updated_at,
            meta: CaseMetaView::from_map(case.meta_map()),
        }
    }
}

impl From<Case> for CaseView {
    fn from(case: Case) -> Self {
        CaseView::from(&case)
    }
}
