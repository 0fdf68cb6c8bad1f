use chrono::{Local, Utc};
use clap::Parser;
use dotenv::dotenv;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use scorecard::report::last_week;
use scorecard::{
    BoardStats, PsaClient, ReactiveReport, RmmClient, ScorecardConfig, StatsStore, logging,
};

/// Displays PSA board statistics and reactive tickets per endpoint.
#[derive(Debug, Parser)]
#[command(name = "scorecard", version, about)]
struct Cli {
    /// Path to scorecard.json
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Save stats to the stats file instead of printing them
    #[arg(long)]
    batch: bool,

    /// Also report the weekly reactive ticket rate (PSA + RMM)
    #[arg(long)]
    reactive: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("failed to initialise logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "scorecard run failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> scorecard::Result<()> {
    let path = cli.config.unwrap_or_else(ScorecardConfig::default_path);
    let config = ScorecardConfig::load(&path).await?;
    info!(config = %path.display(), batch = cli.batch, "starting scorecard");

    let store = if cli.batch {
        Some(StatsStore::new(config.stats_path()?))
    } else {
        None
    };

    let psa = PsaClient::new(&config.psa_config()?, config.excluded_boards.as_slice()).await?;

    let mut board_stats = Vec::with_capacity(config.boards.len());
    for board in &config.boards {
        let stats = BoardStats::collect(&psa, board.id).await?;
        board_stats.push((board, stats));
    }

    let reactive = if cli.reactive {
        let rmm = RmmClient::new(config.rmm_url(), &config.rmm_key)?;
        let (start, end) = last_week(Local::now().date_naive());
        Some(ReactiveReport::collect(&psa, &rmm, &config.reactive_sites, start, end).await?)
    } else {
        None
    };

    if let Some(store) = store {
        let entries: Vec<(String, BoardStats)> = board_stats
            .iter()
            .map(|(board, stats)| (board.worksheet.clone(), *stats))
            .collect();
        store.record_all(Utc::now().date_naive(), &entries).await?;
        info!(path = %store.path().display(), "stats saved");
        return Ok(());
    }

    for (board, stats) in &board_stats {
        println!("{}", board.name);
        for (label, value) in stats.rows() {
            println!("  {:<20}: {:>3}", label, value);
        }
        println!("---------------------------");
    }

    if let Some(report) = reactive {
        print_reactive(&report);
    }

    println!("\n\nPress Enter to close window");
    let _ = std::io::stdin().lock().lines().next();
    Ok(())
}

fn print_reactive(report: &ReactiveReport) {
    let rate = |r: Option<f64>| r.map_or_else(|| "n/a".to_string(), |r| format!("{:.3}", r));

    println!("Reactive tickets {} to {}", report.start, report.end);
    println!(
        "  MRR : {:>4} tickets / {:>5} devices = {}",
        report.tickets.mrr_tickets,
        report.devices.managed_devices,
        rate(report.rate.mrr)
    );
    println!(
        "  ORR : {:>4} tickets / {:>5} devices = {}",
        report.tickets.orr_tickets,
        report.devices.other_devices,
        rate(report.rate.orr)
    );
}
