use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use url::Url;

use crate::error::{Error, Result};

/// PSA API のデフォルトURL（EUクラウド）
pub const DEFAULT_PSA_URL: &str = "https://api-eu.myconnectwise.net/v2019_4/apis/3.0/";

/// RMM レポートAPI のデフォルトURL
pub const DEFAULT_RMM_URL: &str = "https://api.itsupport247.net/reporting/v1/";

/// 設定ファイル名
pub const CONFIG_FILE_NAME: &str = "scorecard.json";

/// 読み込むが適用しない旧形式のキー
pub const IGNORED_KEYS: &[&str] = &["psa_excludes"];

/// PSAのAPIキー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PsaCredentials {
    pub company: String,
    #[serde(rename = "public")]
    pub public_key: String,
    #[serde(rename = "private")]
    pub private_key: String,
    pub client_id: String,
}

impl PsaCredentials {
    /// Basic認証用のトークン `company+public:private`
    pub fn token(&self) -> String {
        format!("{}+{}:{}", self.company, self.public_key, self.private_key)
    }
}

#[derive(Debug, Clone)]
pub struct PsaConfig {
    pub base_url: String,
    pub credentials: PsaCredentials,
}

impl PsaConfig {
    pub fn new(base_url: impl Into<String>, credentials: PsaCredentials) -> Result<Self> {
        let base_url = base_url.into();

        let _ = Url::parse(&base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url,
            credentials,
        })
    }

    pub fn from_env() -> Result<Self> {
        use std::env;

        let base_url = env::var("PSA_URL").unwrap_or_else(|_| DEFAULT_PSA_URL.to_string());

        let var = |name: &str| {
            env::var(name).map_err(|_| {
                Error::ConfigurationMissing(format!("{} not found in environment", name))
            })
        };

        let credentials = PsaCredentials {
            company: var("PSA_COMPANY")?,
            public_key: var("PSA_PUBLIC_KEY")?,
            private_key: var("PSA_PRIVATE_KEY")?,
            client_id: var("PSA_CLIENT_ID")?,
        };

        Self::new(base_url, credentials)
    }
}

/// 統計を取るボード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardConfig {
    pub id: i64,
    pub name: String,
    pub worksheet: String,
}

/// 管理契約（MRR）対象のサイト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    pub name: String,
    pub site_code: String,
}

fn default_excluded_boards() -> Vec<String> {
    vec!["Planned Time Off".to_string()]
}

/// 実行設定（scorecard.json）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardConfig {
    #[serde(rename = "rmm_key")]
    pub rmm_key: String,
    /// 省略時は `PSA_*` 環境変数から読む
    #[serde(rename = "psa_key")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psa_key: Option<PsaCredentials>,
    #[serde(rename = "psa_boards")]
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
    #[serde(rename = "reactive_endpoints")]
    #[serde(default)]
    pub reactive_sites: Vec<SiteConfig>,
    #[serde(default)]
    pub stats_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psa_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmm_url: Option<String>,
    #[serde(default = "default_excluded_boards")]
    pub excluded_boards: Vec<String>,
}

impl ScorecardConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigurationMissing(format!("{} not found", path.display()))
            } else {
                Error::IoError(e)
            }
        })?;

        let invalid = |e: serde_json::Error| {
            Error::InvalidConfiguration(format!("{}: {}", path.display(), e))
        };
        let value: serde_json::Value = serde_json::from_str(&contents).map_err(invalid)?;
        for key in Self::ignored_keys(&value) {
            warn!(
                key,
                config = %path.display(),
                "configuration key is no longer supported and is ignored"
            );
        }

        let config: Self = serde_json::from_value(value).map_err(invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定JSONに含まれる、適用されない旧形式のキー
    pub fn ignored_keys(value: &serde_json::Value) -> Vec<&'static str> {
        IGNORED_KEYS
            .iter()
            .copied()
            .filter(|key| value.get(key).is_some())
            .collect()
    }

    /// カレントディレクトリ、次にユーザー設定ディレクトリの scorecard.json を探す
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .map(|dir| dir.join("scorecard").join(CONFIG_FILE_NAME))
            .unwrap_or(local)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.psa_url {
            Url::parse(url)
                .map_err(|_| Error::InvalidConfiguration(format!("Invalid psa_url: {}", url)))?;
        }
        if let Some(url) = &self.rmm_url {
            Url::parse(url)
                .map_err(|_| Error::InvalidConfiguration(format!("Invalid rmm_url: {}", url)))?;
        }
        if let Some(board) = self.boards.iter().find(|b| b.worksheet.trim().is_empty()) {
            return Err(Error::InvalidConfiguration(format!(
                "Board {} has no worksheet",
                board.name
            )));
        }
        Ok(())
    }

    /// `psa_key` が無ければ環境変数の認証情報を使う。`psa_url` は常に優先する
    pub fn psa_config(&self) -> Result<PsaConfig> {
        match (&self.psa_key, &self.psa_url) {
            (Some(credentials), url) => {
                PsaConfig::new(url.as_deref().unwrap_or(DEFAULT_PSA_URL), credentials.clone())
            }
            (None, Some(url)) => PsaConfig::new(url.as_str(), PsaConfig::from_env()?.credentials),
            (None, None) => PsaConfig::from_env(),
        }
    }

    /// 統計ファイルのパス（`--batch` で必須）
    pub fn stats_path(&self) -> Result<&Path> {
        if self.stats_file.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "stats_file is required to save stats".to_string(),
            ));
        }
        Ok(Path::new(&self.stats_file))
    }

    pub fn rmm_url(&self) -> &str {
        self.rmm_url.as_deref().unwrap_or(DEFAULT_RMM_URL)
    }
}
