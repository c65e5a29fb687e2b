//! End-to-end desk runs over files in a temporary directory.

use std::fs;
use std::path::Path;

use backbone::Service;
use rust_decimal::Decimal;
use execution_engine::AlgoConfig;
use market_data::MarketDataConfig;
use tempfile::TempDir;
use trading_desk::desk::{
    EXECUTIONS_FILE, MARKET_DATA_FILE, POSITIONS_FILE, PRICES_FILE, RISK_FILE, TRADES_FILE,
};
use trading_desk::{Desk, DeskConfig, RunSummary};

const PRICES: &str = "\
Timestamp,CUSIP,Bid,Ask
2024-01-02-09:30:00.000,9128283H1,99-160,99-16+
2024-01-02-09:30:00.100,912828M80,100-000,100-004
";

// depth 1: spreads of 1/128, 1/32, 1/256 then 1/128 again
const BOOKS: &str = "\
Timestamp,CUSIP,Bid1,BidSize1,Ask1,AskSize1
2024-01-02-09:30:01.000,9128283H1,99-160,1000000,99-162,2000000
2024-01-02-09:30:01.100,9128283H1,99-160,1000000,99-170,2000000
2024-01-02-09:30:01.200,912828M80,99-160,3000000,99-161,4000000
2024-01-02-09:30:01.300,9128283H1,99-160,1000000,99-162,2000000
";

const TRADES: &str = "\
CUSIP,TradeId,Price,Book,Quantity,Side
9128283H1,T1,99-160,TRSY1,500000,SELL
";

fn write_feeds(dir: &Path, trades: &str) {
    fs::write(dir.join(PRICES_FILE), PRICES).unwrap();
    fs::write(dir.join(MARKET_DATA_FILE), BOOKS).unwrap();
    fs::write(dir.join(TRADES_FILE), trades).unwrap();
}

fn config(tmp: &TempDir) -> DeskConfig {
    DeskConfig {
        data_dir: tmp.path().join("data"),
        result_dir: tmp.path().join("result"),
        market_data: MarketDataConfig { book_depth: 1 },
        algo: AlgoConfig { seed: Some(42) },
    }
}

/// Output lines with the `<timestamp>,` prefix removed.
fn records(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line[24..].to_string())
        .collect()
}

#[test]
fn test_full_run_writes_every_output() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    fs::create_dir_all(&config.data_dir).unwrap();
    write_feeds(&config.data_dir, TRADES);
    let result_dir = config.result_dir.clone();

    let mut desk = Desk::build(config).unwrap();
    let summary = desk.run().unwrap();

    assert_eq!(
        summary,
        RunSummary {
            prices: 2,
            books: 4,
            trades: 1,
        }
    );
    assert_eq!(
        desk.pricing.borrow().get_data("912828M80").unwrap().mid,
        Decimal::from_str_exact("100.0078125").unwrap()
    );
    assert_eq!(desk.algo.borrow().emitted(), 3);

    let executions = records(&result_dir.join(EXECUTIONS_FILE));
    assert_eq!(executions.len(), 3);
    let sides: Vec<(&str, &str)> = executions
        .iter()
        .map(|e| {
            let fields: Vec<&str> = e.split(',').collect();
            (fields[0], fields[2])
        })
        .collect();
    assert_eq!(
        sides,
        vec![
            ("9128283H1", "Bid"),
            ("912828M80", "Offer"),
            ("9128283H1", "Bid"),
        ]
    );
    assert!(executions[1].contains(",MARKET,"));
    assert!(executions.iter().all(|e| e.ends_with(",False")));

    let positions = records(&result_dir.join(POSITIONS_FILE));
    assert_eq!(
        positions,
        vec![
            "9128283H1,TRSY1,1000000,1000000",
            "912828M80,TRSY2,-4000000,-4000000",
            "9128283H1,TRSY1,1000000,TRSY3,1000000,2000000",
            "9128283H1,TRSY1,500000,TRSY3,1000000,1500000",
        ]
    );

    let risk = records(&result_dir.join(RISK_FILE));
    assert_eq!(risk.len(), 4 + 3);
    assert!(risk[3].starts_with("9128283H1,"));
    assert!(risk[3].contains(",1500000,"));

    let front_end = desk.risk.borrow().get_data("9128283H1").unwrap().exposure();
    let belly = desk.risk.borrow().get_data("912828M80").unwrap().exposure();
    assert_eq!(
        &risk[4..],
        &[
            format!("FrontEnd,{},1,{}", front_end.round_dp(6), front_end.round_dp(6)),
            format!("Belly,{},1,{}", belly.round_dp(6), belly.round_dp(6)),
            "LongEnd,0,1,0".to_string(),
        ]
    );
}

#[test]
fn test_rerun_replaces_previous_outputs() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    fs::create_dir_all(&config.data_dir).unwrap();
    write_feeds(&config.data_dir, TRADES);
    let result_dir = config.result_dir.clone();

    for _ in 0..2 {
        let mut desk = Desk::build(config.clone()).unwrap();
        desk.run().unwrap();
    }

    assert_eq!(records(&result_dir.join(EXECUTIONS_FILE)).len(), 3);
    assert_eq!(records(&result_dir.join(POSITIONS_FILE)).len(), 4);
    assert_eq!(records(&result_dir.join(RISK_FILE)).len(), 4 + 3);
}

#[test]
fn test_trade_feed_error_keeps_applied_prefix() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    fs::create_dir_all(&config.data_dir).unwrap();
    write_feeds(
        &config.data_dir,
        "h\n9128283H1,T1,99-160,TRSY1,500000,SELL\n9128283H1,T2,99-160,TRSY1,1,HOLD\n",
    );
    let result_dir = config.result_dir.clone();

    let mut desk = Desk::build(config).unwrap();
    let err = desk.run().unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Trade feed aborted"), "{}", message);
    assert!(message.contains("line 3"), "{}", message);

    let positions = records(&result_dir.join(POSITIONS_FILE));
    assert_eq!(positions.last().unwrap(), "9128283H1,TRSY1,500000,TRSY3,1000000,1500000");
    // sector risk is only written after a complete run
    assert_eq!(records(&result_dir.join(RISK_FILE)).len(), 4);
}

#[test]
fn test_missing_feed_reported() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);

    let mut desk = Desk::build(config).unwrap();
    let err = desk.run().unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to open feed"));
    assert!(desk.pricing.borrow().get_data("9128283H1").is_err());
}
