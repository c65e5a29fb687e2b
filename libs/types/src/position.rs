//! Position tracking types
//!
//! A position holds the signed quantity of one instrument per book. It is
//! created on the first trade for the instrument and only ever grows by
//! addition afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::instrument::Bond;
use crate::Keyed;

/// Signed holdings of one instrument across books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub instrument: Bond,
    /// Book name → signed quantity. `BTreeMap` keeps book order stable.
    book_positions: BTreeMap<String, i64>,
    aggregate: i64,
}

impl Position {
    /// Create a flat position
    pub fn new(instrument: Bond) -> Self {
        Self {
            instrument,
            book_positions: BTreeMap::new(),
            aggregate: 0,
        }
    }

    /// Quantity held in `book`, zero if the book never traded.
    pub fn position(&self, book: &str) -> i64 {
        self.book_positions.get(book).copied().unwrap_or(0)
    }

    /// Sum over all books.
    pub fn aggregate(&self) -> i64 {
        self.aggregate
    }

    /// Add a signed quantity to `book`.
    ///
    /// Fails with `QuantityOverflow`, leaving the position unchanged, when
    /// either the book or the aggregate would leave the `i64` range.
    pub fn add(&mut self, book: &str, quantity: i64) -> Result<(), ServiceError> {
        let overflow = || ServiceError::overflow(&self.instrument.id);
        let held = self
            .position(book)
            .checked_add(quantity)
            .ok_or_else(overflow)?;
        let aggregate = self.aggregate.checked_add(quantity).ok_or_else(overflow)?;

        self.book_positions.insert(book.to_string(), held);
        self.aggregate = aggregate;
        Ok(())
    }

    pub fn books(&self) -> impl Iterator<Item = (&str, i64)> {
        self.book_positions.iter().map(|(book, qty)| (book.as_str(), *qty))
    }
}

impl Keyed for Position {
    fn key(&self) -> String {
        self.instrument.id.clone()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instrument.identifier())?;
        for (book, quantity) in self.books() {
            write!(f, ",{},{}", book, quantity)?;
        }
        write!(f, ",{}", self.aggregate())
    }
}
