use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::models::{Device, Site};
use crate::transport::{HttpTransport, Transport};

pub const SITES_ENDPOINT: &str = "/sites";

/// 管理契約サイトとそれ以外のデバイス数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStats {
    pub managed_devices: usize,
    pub other_devices: usize,
}

impl DeviceStats {
    pub fn total(&self) -> usize {
        self.managed_devices + self.other_devices
    }
}

/// RMM（デバイス管理）のレポートAPIクライアント。ページングなし
pub struct RmmClient<T: Transport = HttpTransport> {
    transport: T,
}

impl RmmClient<HttpTransport> {
    /// `api_key` は `user:password` 形式
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(base_url, api_key, &[])?))
    }
}

impl<T: Transport> RmmClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub async fn sites(&self) -> Result<Vec<Site>> {
        let value = self.transport.get_json(SITES_ENDPOINT).await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    pub async fn devices(&self, site_code: &str) -> Result<Vec<Device>> {
        let path = format!(
            "{}/{}/devices/",
            SITES_ENDPOINT,
            urlencoding::encode(site_code)
        );
        let value = self.transport.get_json(&path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// 全サイトのデバイス数を、サイト名が `managed_site_names` に含まれるかで振り分けて数える
    #[instrument(skip_all)]
    pub async fn device_stats<S: AsRef<str>>(&self, managed_site_names: &[S]) -> Result<DeviceStats> {
        let sites = self.sites().await?;
        debug!(count = sites.len(), "fetched RMM sites");

        let mut stats = DeviceStats::default();
        for site in &sites {
            let devices = self.devices(&site.site_code).await?;
            if managed_site_names.iter().any(|n| n.as_ref() == site.name) {
                stats.managed_devices += devices.len();
            } else {
                stats.other_devices += devices.len();
            }
        }

        Ok(stats)
    }
}
