//! Pipeline wiring and feed runs
//!
//! ```text
//! prices.txt     ──► Pricing
//! marketdata.txt ──► MarketData ──► Algo ──► Execution ──► TradeBooking ◄── trades.txt
//!                                               │               │
//!                                               ▼               ▼
//!                                         executions.txt     Position ──► positions.txt
//!                                                               │
//!                                                               ▼
//!                                                             Risk ──► risk.txt
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::info;
use types::execution::ExecutionOrder;
use types::instrument::{Bond, BondCatalog};
use types::position::Position;
use types::risk::{BucketedSector, Pv01};

use backbone::{share, Connector, InboundConnector, Service};
use execution_engine::{
    AlgoExecutionListener, AlgoExecutionService, BookingListener, ExecutionListener,
    ExecutionService, TradeBookingConnector, TradeBookingService,
};
use market_data::{MarketDataConnector, MarketDataService, PricingConnector, PricingService};
use persistence::{
    execution_key, FileSink, HistoricalDataListener, HistoricalDataService, SinkConfig,
};
use risk_engine::{PositionListener, PositionService, RiskListener, RiskService};

use crate::config::DeskConfig;

pub const PRICES_FILE: &str = "prices.txt";
pub const MARKET_DATA_FILE: &str = "marketdata.txt";
pub const TRADES_FILE: &str = "trades.txt";
pub const POSITIONS_FILE: &str = "positions.txt";
pub const RISK_FILE: &str = "risk.txt";
pub const EXECUTIONS_FILE: &str = "executions.txt";

type History<V> = Rc<RefCell<HistoricalDataService<V, FileSink>>>;

/// Records delivered per feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub prices: usize,
    pub books: usize,
    pub trades: usize,
}

/// Every service of the desk, wired.
pub struct Desk {
    config: DeskConfig,
    catalog: BondCatalog,
    pub pricing: Rc<RefCell<PricingService>>,
    pub market_data: Rc<RefCell<MarketDataService>>,
    pub algo: Rc<RefCell<AlgoExecutionService>>,
    pub execution: Rc<RefCell<ExecutionService>>,
    pub booking: Rc<RefCell<TradeBookingService>>,
    pub positions: Rc<RefCell<PositionService>>,
    pub risk: Rc<RefCell<RiskService>>,
    pub position_history: History<Position>,
    pub risk_history: History<Pv01<Bond>>,
    pub execution_history: History<ExecutionOrder>,
}

fn open_sink(dir: &Path, name: &str) -> Result<FileSink> {
    let path = dir.join(name);
    FileSink::open(SinkConfig::new(&path).truncating())
        .with_context(|| format!("Failed to open output file {}", path.display()))
}

impl Desk {
    /// Build all services and register every listener edge.
    pub fn build(config: DeskConfig) -> Result<Self> {
        let catalog = BondCatalog::treasuries();

        let pricing = Rc::new(RefCell::new(PricingService::new()));
        let market_data = Rc::new(RefCell::new(MarketDataService::new(
            config.market_data.clone(),
        )));
        let algo = Rc::new(RefCell::new(AlgoExecutionService::new(config.algo.clone())));
        let execution = Rc::new(RefCell::new(ExecutionService::new()));
        let booking = Rc::new(RefCell::new(TradeBookingService::new()));
        let positions = Rc::new(RefCell::new(PositionService::new()));
        let risk = Rc::new(RefCell::new(RiskService::treasuries()));

        let position_history: History<Position> = Rc::new(RefCell::new(
            HistoricalDataService::keyed(open_sink(&config.result_dir, POSITIONS_FILE)?),
        ));
        let risk_history: History<Pv01<Bond>> = Rc::new(RefCell::new(
            HistoricalDataService::keyed(open_sink(&config.result_dir, RISK_FILE)?),
        ));
        let execution_history: History<ExecutionOrder> =
            Rc::new(RefCell::new(HistoricalDataService::with_key(
                open_sink(&config.result_dir, EXECUTIONS_FILE)?,
                execution_key,
            )));

        market_data
            .borrow_mut()
            .add_listener(share(AlgoExecutionListener::new(algo.clone())));
        algo.borrow_mut()
            .add_listener(share(ExecutionListener::new(execution.clone())));
        execution
            .borrow_mut()
            .add_listener(share(BookingListener::new(booking.clone())));
        execution
            .borrow_mut()
            .add_listener(share(HistoricalDataListener::new(execution_history.clone())));
        booking
            .borrow_mut()
            .add_listener(share(PositionListener::new(positions.clone())));
        positions
            .borrow_mut()
            .add_listener(share(RiskListener::new(risk.clone())));
        positions
            .borrow_mut()
            .add_listener(share(HistoricalDataListener::new(position_history.clone())));
        risk.borrow_mut()
            .add_listener(share(HistoricalDataListener::new(risk_history.clone())));

        info!(
            instruments = catalog.len(),
            book_depth = config.market_data.book_depth,
            result_dir = %config.result_dir.display(),
            "Desk wired"
        );

        Ok(Self {
            config,
            catalog,
            pricing,
            market_data,
            algo,
            execution,
            booking,
            positions,
            risk,
            position_history,
            risk_history,
            execution_history,
        })
    }

    fn open_feed(&self, name: &str) -> Result<BufReader<File>> {
        let path = self.config.data_dir.join(name);
        let file = File::open(&path)
            .with_context(|| format!("Failed to open feed {}", path.display()))?;
        Ok(BufReader::new(file))
    }

    /// Run the price, order book and trade feeds in that order, then append
    /// sector risk to the risk output.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut price_feed = PricingConnector::new(self.pricing.clone(), self.catalog.clone());
        let prices = price_feed
            .subscribe(self.open_feed(PRICES_FILE)?)
            .context("Price feed aborted")?;

        let mut book_feed =
            MarketDataConnector::new(self.market_data.clone(), self.catalog.clone());
        let books = book_feed
            .subscribe(self.open_feed(MARKET_DATA_FILE)?)
            .context("Order book feed aborted")?;

        let mut trade_feed =
            TradeBookingConnector::new(self.booking.clone(), self.catalog.clone());
        let trades = trade_feed
            .subscribe(self.open_feed(TRADES_FILE)?)
            .context("Trade feed aborted")?;

        self.publish_sector_risk()?;

        let summary = RunSummary {
            prices,
            books,
            trades,
        };
        info!(
            prices = summary.prices,
            books = summary.books,
            trades = summary.trades,
            executions = self.algo.borrow().emitted(),
            "Desk run complete"
        );
        Ok(summary)
    }

    /// Write the bucketed risk of every Treasury sector to the risk output.
    pub fn publish_sector_risk(&self) -> Result<Vec<Pv01<BucketedSector>>> {
        let sectors = BucketedSector::treasury_buckets(&self.catalog)?;
        let risk = self.risk.borrow();
        let mut history = self.risk_history.borrow_mut();

        let mut reports = Vec::with_capacity(sectors.len());
        for sector in &sectors {
            let report = risk.bucketed_risk(sector);
            Connector::<Pv01<BucketedSector>>::publish(history.connector_mut(), &report)?;
            reports.push(report);
        }
        Ok(reports)
    }
}
