use log::{debug, warn};

use crate::app_ui::review;
use crate::tx_types::Transaction;
use crate::ParserError;

mod tx_parser;
pub use tx_parser::*;

/// Scratch sizes used while dry-rendering every item.
const VALIDATE_KEY_LEN: usize = 40;
const VALIDATE_VALUE_LEN: usize = 40;

/// Owns the transaction under review.
///
/// At most one transaction is held at a time. Every call to [`parse`]
/// replaces it, and a failed parse leaves the context empty.
///
/// [`parse`]: ParserContext::parse
#[derive(Debug, Default)]
pub struct ParserContext {
    tx: Option<Transaction>,
}

impl ParserContext {
    pub const fn new() -> Self {
        Self { tx: None }
    }

    pub fn reset(&mut self) {
        self.tx = None;
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.tx.as_ref()
    }

    pub fn parse(&mut self, data: &[u8]) -> Result<(), ParserError> {
        self.reset();

        match read_transaction(data) {
            Ok(tx) => {
                self.tx = Some(tx);
                Ok(())
            }
            Err(e) => {
                warn!("parse failed: {}", e.description());
                Err(e)
            }
        }
    }

    /// Renders the first page of every item once, discarding the output.
    pub fn validate(&self) -> Result<(), ParserError> {
        debug!("parser_validate");
        let tx = self.tx.as_ref().ok_or(ParserError::NoData)?;

        let num_items = review::num_items(tx);
        debug!("num_items {}", num_items);

        let mut key = [0u8; VALIDATE_KEY_LEN];
        let mut value = [0u8; VALIDATE_VALUE_LEN];
        for idx in 0..num_items {
            review::get_item(tx, idx, &mut key, &mut value, 0)?;
        }

        debug!("parser_validate ok");
        Ok(())
    }

    /// Displayable item count, 0 while no transaction is held.
    pub fn num_items(&self) -> u8 {
        self.tx.as_ref().map_or(0, review::num_items)
    }

    /// Writes page `page_idx` of item `display_idx` and returns the page count.
    pub fn get_item(
        &self,
        display_idx: u8,
        out_key: &mut [u8],
        out_val: &mut [u8],
        page_idx: u8,
    ) -> Result<u8, ParserError> {
        let tx = self.tx.as_ref().ok_or(ParserError::NoData)?;
        review::get_item(tx, display_idx, out_key, out_val, page_idx)
    }
}
