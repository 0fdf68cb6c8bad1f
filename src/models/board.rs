use serde::{Deserialize, Serialize};

/// サービスボード（チケットのキュー）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
}
