//! Connectors: the edges between a service and the outside world
//!
//! Outbound connectors push a service's records out (`publish`). Inbound
//! connectors read a text feed, parse each line into a record and hand it to
//! their service. Inbound-only connectors keep the default `publish`, which
//! does nothing.
//!
//! Feed format: comma-separated fields, one record per line, first line is a
//! header and is skipped. Blank lines are ignored.

use std::io::BufRead;

use rust_decimal::Decimal;
use tracing::warn;
use types::errors::ServiceError;
use types::numeric::frac_to_price;

/// Outbound role.
pub trait Connector<V> {
    /// Push a record externally. No-op unless overridden.
    fn publish(&mut self, _data: &V) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Inbound role.
pub trait InboundConnector<V>: Connector<V> {
    /// Read every record from `source` and feed it to the service, in order.
    ///
    /// Fail-stop: the first malformed record, or the first downstream
    /// error, aborts the call. Records already delivered stay applied.
    /// Returns the number of records delivered.
    fn subscribe<R: BufRead>(&mut self, source: R) -> Result<usize, ServiceError>;
}

/// One parsed feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    line: usize,
    fields: Vec<String>,
}

impl Record {
    pub fn parse(line: usize, text: &str) -> Self {
        Self {
            line,
            fields: text.split(',').map(|f| f.trim().to_string()).collect(),
        }
    }

    /// 1-based line number in the source.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn expect_len(&self, expected: usize) -> Result<(), ServiceError> {
        if self.fields.len() != expected {
            return Err(ServiceError::format(
                self.line,
                format!("expected {} fields, got {}", expected, self.fields.len()),
            ));
        }
        Ok(())
    }

    pub fn field(&self, index: usize) -> Result<&str, ServiceError> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| ServiceError::format(self.line, format!("missing field {}", index)))
    }

    /// Decode a fractional-notation price field.
    pub fn price(&self, index: usize) -> Result<Decimal, ServiceError> {
        let text = self.field(index)?;
        frac_to_price(text).map_err(|e| ServiceError::format(self.line, e.to_string()))
    }

    pub fn quantity(&self, index: usize) -> Result<u64, ServiceError> {
        let text = self.field(index)?;
        text.parse::<u64>().map_err(|_| {
            ServiceError::format(self.line, format!("invalid quantity {:?}", text))
        })
    }
}

/// Read all data records from a feed, skipping the header and blank lines.
///
/// Each record is passed to `handle` as soon as it is read, so a handler
/// error stops the read at that record.
pub fn read_records<R, F>(source: R, mut handle: F) -> Result<usize, ServiceError>
where
    R: BufRead,
    F: FnMut(Record) -> Result<(), ServiceError>,
{
    let mut delivered = 0;
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        let line = line.map_err(|e| ServiceError::format(number, e.to_string()))?;
        if number == 1 || line.trim().is_empty() {
            continue;
        }
        if let Err(e) = handle(Record::parse(number, &line)) {
            warn!(line = number, error = %e, "Feed aborted");
            return Err(e);
        }
        delivered += 1;
    }
    Ok(delivered)
}
