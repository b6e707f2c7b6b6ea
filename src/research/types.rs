//! Research record types.
//!
//! Row types ([`ResearchSession`], [`ResearchTask`], [`ResearchLog`]) mirror the
//! tables in [`crate::db::schema`]. The `New*` types are insert payloads where
//! the store fills ids, defaults and timestamps. All types use camelCase keys
//! on the wire and epoch seconds for timestamps.

use serde::{Deserialize, Deserializer, Serialize};

/// Status a session is created with when the caller supplies none.
pub const DEFAULT_STATUS: &str = "in_progress";

/// One research run and its progressively written artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSession {
    pub id: String,
    pub original_prompt: String,
    pub clarification_questions: Option<String>,
    pub clarification_answers: Option<String>,
    pub plan: Option<String>,
    pub data_collection: Option<String>,
    pub verbose_log: Option<String>,
    pub final_report: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Insert payload for a session. `id` is generated when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResearchSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub original_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_questions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_answers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Partial update of a session.
///
/// For nullable columns the outer `Option` says whether the field was present
/// and the inner one carries the new value, so `{"plan": null}` clears the plan
/// while an absent `plan` leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub clarification_questions: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub clarification_answers: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub plan: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub data_collection: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub verbose_log: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub final_report: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.original_prompt.is_none()
            && self.clarification_questions.is_none()
            && self.clarification_answers.is_none()
            && self.plan.is_none()
            && self.data_collection.is_none()
            && self.verbose_log.is_none()
            && self.final_report.is_none()
            && self.status.is_none()
            && self.created_at.is_none()
            && self.updated_at.is_none()
    }
}

/// Marks a field as present, including an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One sub-task of a session's research plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchTask {
    pub id: String,
    pub session_id: String,
    /// Ordering/priority level within the plan.
    pub tier: i64,
    pub title: String,
    pub direction: String,
    pub target: String,
    pub learning: Option<String>,
    pub grounding_chunks: Option<String>,
    pub web_search_queries: Option<String>,
    pub urls_metadata: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResearchTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub session_id: String,
    pub tier: i64,
    pub title: String,
    pub direction: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_chunks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search_queries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// One timestamped event emitted while a session runs. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchLog {
    pub id: String,
    pub session_id: String,
    pub timestamp: i64,
    /// Event category.
    #[serde(rename = "type")]
    pub log_type: String,
    /// Severity.
    pub level: String,
    pub message: String,
    /// Emitting component.
    pub agent: Option<String>,
    /// Research phase the event belongs to.
    pub phase: Option<String>,
    pub metadata: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResearchLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub session_id: String,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub log_type: String,
    pub level: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// A session together with everything recorded against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: ResearchSession,
    pub tasks: Vec<ResearchTask>,
    pub logs: Vec<ResearchLog>,
}

/// Current time in epoch seconds.
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Generate a time-sortable record id.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: SessionUpdate =
            serde_json::from_str(r#"{"plan": null, "status": "done"}"#).unwrap();
        assert_eq!(update.plan, Some(None));
        assert_eq!(update.final_report, None);
        assert_eq!(update.status.as_deref(), Some("done"));
        assert!(!update.is_empty());
    }

    #[test]
    fn empty_update_is_empty() {
        let update: SessionUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn update_serializes_clears_as_null() {
        let update = SessionUpdate {
            verbose_log: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"verboseLog": null}));
    }

    #[test]
    fn log_type_uses_type_key() {
        let log: NewResearchLog = serde_json::from_value(serde_json::json!({
            "sessionId": "s1",
            "timestamp": 1700000000,
            "type": "phase_start",
            "level": "info",
            "message": "planning"
        }))
        .unwrap();
        assert_eq!(log.log_type, "phase_start");
        assert!(log.id.is_none());
    }

    #[test]
    fn new_session_requires_prompt() {
        let err = serde_json::from_str::<NewResearchSession>(r#"{"id": "s1"}"#);
        assert!(err.is_err());
    }
}
