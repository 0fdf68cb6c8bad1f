//! tracing の初期化（バイナリ用）

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// RUST_LOG 未設定時のフィルター
pub const DEFAULT_LOG_FILTER: &str = "scorecard=info,warn";

/// 標準エラー出力へのログを設定する。標準出力はレポート表示に使う
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(filter)
        .try_init()?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialised");
    Ok(())
}
