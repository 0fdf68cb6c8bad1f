use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Board;

/// サービスチケット（検索結果のスナップショット）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    #[serde(rename = "dateEntered")]
    pub date_entered: DateTime<Utc>,
    pub company: Company,
    pub board: Board,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "_info")]
    #[serde(default)]
    pub info: TicketInfo,
}

/// `_info` レコード
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TicketInfo {
    #[serde(rename = "lastUpdated")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(rename = "updatedBy")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(rename = "dateEntered")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_entered: Option<DateTime<Utc>>,
    #[serde(rename = "enteredBy")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entered_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    /// PSA上の会社識別子（RMMのサイトコードと一致する）
    #[serde(rename = "identifier")]
    pub site_code: String,
    pub name: String,
}

impl Ticket {
    /// リアクティブボード（"SD - Reactive" で始まるボード）のチケットかどうか
    pub fn is_reactive(&self) -> bool {
        self.board.name.starts_with(crate::REACTIVE_BOARD_PREFIX)
    }
}
