use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ヘルプデスクからエスカレーションされた際に記録される監査テキスト
pub const ESCALATED_TEXT: &str =
    "Status has been updated from \"Needs-Info\" to \"Escalated from Helpdesk\".";

/// チケット監査証跡の1エントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "enteredDate")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entered_date: Option<DateTime<Utc>>,
    #[serde(rename = "enteredBy")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entered_by: Option<String>,
    #[serde(rename = "auditType")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_type: Option<String>,
    #[serde(rename = "auditSubType")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_sub_type: Option<String>,
    #[serde(rename = "auditSource")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_source: Option<String>,
}

impl AuditEntry {
    pub fn is_escalation(&self) -> bool {
        self.text.contains(ESCALATED_TEXT)
    }
}
