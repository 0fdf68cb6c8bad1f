//! ボード別統計とリアクティブチケット率の集計

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::client::PsaClient;
use crate::config::SiteConfig;
use crate::error::Result;
use crate::models::Ticket;
use crate::rmm::{DeviceStats, RmmClient};
use crate::transport::Transport;

/// 「新規」とみなす日数
pub const NEW_TICKET_DAYS: i64 = 7;
/// 「更新なし」とみなす日数
pub const STALE_DAYS: i64 = 7;
pub const OLDER_SHORT_DAYS: i64 = 7;
pub const OLDER_LONG_DAYS: i64 = 31;

/// 1ボード分の統計（スプレッドシートの1行に相当）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    pub open: usize,
    pub new: usize,
    pub not_updated_7: usize,
    pub older_7: usize,
    pub older_31: usize,
    pub assigned: usize,
    pub not_assigned: usize,
}

impl BoardStats {
    /// 7つの検索を順番に実行する。いずれかが失敗したら全体を失敗とする
    #[instrument(skip(client))]
    pub async fn collect<T: Transport>(client: &PsaClient<T>, board_id: i64) -> Result<Self> {
        let stats = Self {
            open: client.open_tickets_by_board(board_id).await?.len(),
            new: client
                .new_tickets_by_board(board_id, NEW_TICKET_DAYS)
                .await?
                .len(),
            not_updated_7: client
                .open_tickets_by_board_not_updated_in(board_id, STALE_DAYS)
                .await?
                .len(),
            older_7: client
                .open_tickets_by_board_older_than(board_id, OLDER_SHORT_DAYS)
                .await?
                .len(),
            older_31: client
                .open_tickets_by_board_older_than(board_id, OLDER_LONG_DAYS)
                .await?
                .len(),
            assigned: client.open_assigned_tickets_by_board(board_id).await?.len(),
            not_assigned: client
                .open_unassigned_tickets_by_board(board_id)
                .await?
                .len(),
        };
        info!(?stats, "collected board stats");
        Ok(stats)
    }

    /// 表示用のラベルと値
    pub fn rows(&self) -> [(&'static str, usize); 7] {
        [
            ("Open", self.open),
            ("New", self.new),
            ("No Update in 7 days", self.not_updated_7),
            ("Older 7 days", self.older_7),
            ("Older 31 days", self.older_31),
            ("Assigned", self.assigned),
            ("Not Assigned", self.not_assigned),
        ]
    }
}

/// リアクティブボードのチケットのみを残す
pub fn reactive_tickets(tickets: &[Ticket]) -> Vec<&Ticket> {
    tickets.iter().filter(|t| t.is_reactive()).collect()
}

/// 管理契約（MRR）とそれ以外（ORR）のリアクティブチケット数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactiveStats {
    pub mrr_tickets: usize,
    pub orr_tickets: usize,
}

impl ReactiveStats {
    pub fn classify<S: AsRef<str>>(tickets: &[Ticket], managed_site_codes: &[S]) -> Self {
        let mut stats = Self::default();
        for ticket in reactive_tickets(tickets) {
            let managed = managed_site_codes
                .iter()
                .any(|code| code.as_ref() == ticket.company.site_code);
            if managed {
                stats.mrr_tickets += 1;
            } else {
                stats.orr_tickets += 1;
            }
        }
        stats
    }
}

/// デバイス1台あたりのリアクティブチケット数。デバイス0台の区分は `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactiveRate {
    pub mrr: Option<f64>,
    pub orr: Option<f64>,
}

impl ReactiveRate {
    pub fn compute(tickets: &ReactiveStats, devices: &DeviceStats) -> Self {
        let rate = |count: usize, devices: usize| {
            (devices > 0).then(|| count as f64 / devices as f64)
        };
        Self {
            mrr: rate(tickets.mrr_tickets, devices.managed_devices),
            orr: rate(tickets.orr_tickets, devices.other_devices),
        }
    }
}

/// `today` で終わる直近1週間（開始日を含み終了日を含まない）
pub fn last_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(7), today)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactiveReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tickets: ReactiveStats,
    pub devices: DeviceStats,
    pub rate: ReactiveRate,
}

impl ReactiveReport {
    /// 期間内のチケット（PSA）とデバイス数（RMM）からリアクティブ率を求める
    #[instrument(skip(psa, rmm, sites))]
    pub async fn collect<P: Transport, R: Transport>(
        psa: &PsaClient<P>,
        rmm: &RmmClient<R>,
        sites: &[SiteConfig],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        let tickets = psa.tickets_entered_between(start, end).await?;
        let codes: Vec<&str> = sites.iter().map(|s| s.site_code.as_str()).collect();
        let stats = ReactiveStats::classify(&tickets, &codes);
        info!(
            reactive = stats.mrr_tickets + stats.orr_tickets,
            raised = tickets.len(),
            "classified reactive tickets"
        );

        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        let devices = rmm.device_stats(&names).await?;

        Ok(Self {
            start,
            end,
            tickets: stats,
            devices,
            rate: ReactiveRate::compute(&stats, &devices),
        })
    }
}
