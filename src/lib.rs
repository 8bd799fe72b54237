/*****************************************************************************
 *   Ledger App Boilerplate Rust.
 *   (c) 2023 Ledger SAS.
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 *****************************************************************************/

//! Filecoin message parser for on-device review.
//!
//! A [`ParserContext`] decodes an untrusted CBOR message, dry-renders every
//! item in [`ParserContext::validate`] and then serves `(label, value page)`
//! pairs through [`ParserContext::get_item`]. Nothing here allocates: all
//! buffers are fixed-capacity and overflows are reported as [`ParserError`].

#![cfg_attr(not(test), no_std)]

pub mod cbor;
pub mod coin;
mod error;
pub mod parser;
pub mod tx_types;
mod utils;
mod app_ui {
    pub mod format;
    pub mod review;
}
mod crypto {
    pub mod address;
}

pub use error::ParserError;
pub use parser::ParserContext;
pub use tx_types::{Address, BigInt, Transaction};
