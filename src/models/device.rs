use serde::{Deserialize, Serialize};

/// RMMのサイト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(rename = "siteCode")]
    pub site_code: String,
}

/// RMMの管理対象デバイス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "machineID")]
    pub machine_id: String,
    #[serde(rename = "machineName")]
    #[serde(default)]
    pub machine_name: String,
    #[serde(rename = "friendlyName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(rename = "assetType")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(rename = "siteCode")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_code: Option<String>,
    #[serde(rename = "siteName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(rename = "lastSeenOnline")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_online: Option<String>,
    #[serde(rename = "operatingSystem")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
}
