pub mod client;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod logging;
pub mod models;
pub mod paginator;
pub mod query;
pub mod report;
pub mod rmm;
pub mod store;
pub mod transport;

/// リアクティブ（計画外）対応ボード名の接頭辞
pub const REACTIVE_BOARD_PREFIX: &str = "SD - Reactive";

pub use client::PsaClient;
pub use config::{BoardConfig, PsaConfig, PsaCredentials, ScorecardConfig, SiteConfig};
pub use error::{Error, Result};
pub use exclusion::BoardExclusions;
pub use models::*;
pub use paginator::{PAGE_SIZE, Paginator};
pub use transport::{HttpTransport, Transport};

// Query builder re-exports
pub use query::{Condition, Predicate, TicketQuery, days_ago, format_psa_date};

// Reporting re-exports
pub use report::{BoardStats, ReactiveRate, ReactiveReport, ReactiveStats, reactive_tickets};
pub use rmm::{DeviceStats, RmmClient};
pub use store::{StatsHistory, StatsRow, StatsStore};
