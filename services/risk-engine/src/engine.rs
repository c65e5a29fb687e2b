//! Risk Service
//!
//! Keeps the PV01 of every position: the instrument's unit sensitivity and
//! the aggregate quantity it applies to. Sector risk is the sum of the
//! exposures of the sector's instruments.

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::debug;
use types::errors::ServiceError;
use types::instrument::Bond;
use types::position::Position;
use types::risk::{BucketedSector, Pv01};

use backbone::{KeyedService, Service, ServiceListener, SharedListener};

use crate::exposure::{total_exposure, SensitivityTable};

pub struct RiskService {
    core: KeyedService<Pv01<Bond>>,
    sensitivities: SensitivityTable,
}

impl RiskService {
    pub fn new(sensitivities: SensitivityTable) -> Self {
        Self {
            core: KeyedService::new("risk"),
            sensitivities,
        }
    }

    /// Risk service over the on-the-run Treasury sensitivities.
    pub fn treasuries() -> Self {
        Self::new(SensitivityTable::treasuries())
    }

    /// Recompute the PV01 record for a position and publish it.
    ///
    /// Fails with `NotFound` when the instrument has no sensitivity.
    pub fn add_position(&mut self, position: &Position) -> Result<(), ServiceError> {
        let unit = self.sensitivities.unit(&position.instrument.id)?;
        let risk = Pv01::new(position.instrument.clone(), unit, position.aggregate());
        debug!(
            instrument = %position.instrument.id,
            pv01 = %unit,
            quantity = risk.quantity,
            exposure = %risk.exposure(),
            "Risk updated"
        );
        self.on_message(risk)
    }

    /// Combined risk of a sector, reported as one PV01 figure with unit
    /// quantity: `pv01` is the summed exposure of its instruments.
    ///
    /// Instruments without a position contribute nothing.
    pub fn bucketed_risk(&self, sector: &BucketedSector) -> Pv01<BucketedSector> {
        let exposure: Decimal = total_exposure(
            self.core
                .store()
                .values()
                .filter(|risk| sector.contains(&risk.product.id)),
        );
        Pv01::new(sector.clone(), exposure, 1)
    }
}

impl Service<str, Pv01<Bond>> for RiskService {
    fn get_data(&self, key: &str) -> Result<&Pv01<Bond>, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: Pv01<Bond>) -> Result<(), ServiceError> {
        self.core.on_message(data)
    }

    fn add_listener(&mut self, listener: SharedListener<Pv01<Bond>>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<Pv01<Bond>>] {
        self.core.listeners()
    }
}

/// Recomputes risk on every position change.
pub struct RiskListener {
    service: Rc<RefCell<RiskService>>,
}

impl RiskListener {
    pub fn new(service: Rc<RefCell<RiskService>>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Position> for RiskListener {
    fn process_add(&mut self, data: &Position) -> Result<(), ServiceError> {
        self.service.borrow_mut().add_position(data)
    }
}
