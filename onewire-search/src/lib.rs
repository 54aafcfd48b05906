#![no_std]
#![deny(missing_docs)]
//! # onewire-search
//! A no-std implementation of the 1-Wire ROM search algorithm.
//!
//! This crate enumerates the 64-bit ROM codes of every device present on a shared
//! 1-Wire bus. The bus itself is abstracted behind the [OneWireBus] trait, so the
//! engine works with any transport that can issue a reset pulse and exchange single
//! bits; a simulator implementing the same trait serves as a test double.
//!
//! The search state lives in [OneWireSearch], owned by the caller and passed to
//! [run](OneWireSearch::run) together with an output buffer. A run performs bus
//! transactions until the buffer fills or the search concludes, so an arbitrarily
//! large device population can be enumerated through a small fixed buffer by
//! calling [run](OneWireSearch::run) repeatedly. Codes are produced in the bus
//! discovery order, which [RomCode]'s `Ord` implementation matches, each device
//! exactly once.

mod rom;
mod search;
mod traits;
mod utils;
pub use rom::RomCode;
pub use search::{OneWireSearch, OneWireSearchKind, SearchStatus};
pub use traits::OneWireBus;
pub use utils::OneWireCrc;

/// Command to match a specific ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// Command to read the ROM address of the only device on a single-drop bus
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Command to search for devices on the 1-Wire bus
pub const ONEWIRE_SEARCH_CMD: u8 = 0xf0;

/// Command to search for devices in alarm state on the 1-Wire bus
pub const ONEWIRE_CONDITIONAL_SEARCH_CMD: u8 = 0xec;
