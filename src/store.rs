use chrono::NaiveDate;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs::{File, create_dir_all};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::report::BoardStats;

/// 日付付きの統計1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub stats: BoardStats,
}

/// ワークシート（ボード）ごとの統計履歴
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsHistory {
    #[serde(default)]
    pub worksheets: BTreeMap<String, Vec<StatsRow>>,
}

impl StatsHistory {
    /// 最終行が同じ日付なら上書き、そうでなければ追加する
    pub fn record(&mut self, worksheet: &str, date: NaiveDate, stats: BoardStats) {
        let rows = self.worksheets.entry(worksheet.to_string()).or_default();
        match rows.last_mut() {
            Some(last) if last.date == date => last.stats = stats,
            _ => rows.push(StatsRow { date, stats }),
        }
    }

    pub fn rows(&self, worksheet: &str) -> &[StatsRow] {
        self.worksheets
            .get(worksheet)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn latest(&self, worksheet: &str) -> Option<&StatsRow> {
        self.rows(worksheet).last()
    }
}

/// 統計履歴のJSONファイルストア（拡張子 `.gz` の場合はgzip圧縮）
pub struct StatsStore {
    path: PathBuf,
    use_compression: bool,
}

impl StatsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let use_compression = path.extension().is_some_and(|ext| ext == "gz");
        Self {
            path,
            use_compression,
        }
    }

    pub fn with_compression(mut self, use_compression: bool) -> Self {
        self.use_compression = use_compression;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルが無い場合は空の履歴
    pub async fn load(&self) -> Result<StatsHistory> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StatsHistory::default());
            }
            Err(e) => return Err(Error::IoError(e)),
        };

        let mut raw_data = Vec::new();
        file.read_to_end(&mut raw_data).await?;

        let json_data = if self.use_compression {
            let mut decoder = GzDecoder::new(&raw_data[..]);
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            decompressed
        } else {
            raw_data
        };

        if json_data.iter().all(u8::is_ascii_whitespace) {
            return Ok(StatsHistory::default());
        }

        serde_json::from_slice(&json_data)
            .map_err(|e| Error::SerializationError(format!("JSON deserialization failed: {}", e)))
    }

    pub async fn save(&self, history: &StatsHistory) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).await?;
        }

        let json_data = serde_json::to_vec_pretty(history)
            .map_err(|e| Error::SerializationError(format!("JSON serialization failed: {}", e)))?;

        let final_data = if self.use_compression {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&json_data)?;
            encoder.finish()?
        } else {
            json_data
        };

        let mut file = File::create(&self.path).await?;
        file.write_all(&final_data).await?;
        file.sync_all().await?;

        Ok(())
    }

    /// 複数ワークシートの統計を同じ日付で記録して保存する
    pub async fn record_all(
        &self,
        date: NaiveDate,
        entries: &[(String, BoardStats)],
    ) -> Result<StatsHistory> {
        let mut history = self.load().await?;
        for (worksheet, stats) in entries {
            history.record(worksheet, date, *stats);
        }
        self.save(&history).await?;
        debug!(path = %self.path.display(), worksheets = entries.len(), "saved stats");
        Ok(history)
    }
}
