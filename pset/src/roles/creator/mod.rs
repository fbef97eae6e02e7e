//! The Creator role (single entity).
//!
//!  - Creates the base PSET with no information about inputs or outputs.

use crate::{
    common::{Global, FLAG_INPUTS_MODIFIABLE, FLAG_OUTPUTS_MODIFIABLE},
    Pset, DEFAULT_TX_VERSION,
};

/// Initial flags allowing any modification.
const INITIAL_TX_MODIFIABLE: u8 = FLAG_INPUTS_MODIFIABLE | FLAG_OUTPUTS_MODIFIABLE;

pub struct Creator {
    tx_version: u32,
    fallback_lock_time: Option<u32>,
}

impl Default for Creator {
    fn default() -> Self {
        Self::new()
    }
}

impl Creator {
    pub fn new() -> Self {
        Self {
            tx_version: DEFAULT_TX_VERSION,
            fallback_lock_time: None,
        }
    }

    pub fn with_tx_version(mut self, tx_version: u32) -> Self {
        self.tx_version = tx_version;
        self
    }

    pub fn with_fallback_lock_time(mut self, fallback: u32) -> Self {
        self.fallback_lock_time = Some(fallback);
        self
    }

    pub fn build(self) -> Pset {
        Pset {
            global: Global {
                tx_version: self.tx_version,
                fallback_lock_time: self.fallback_lock_time,
                input_count: 0,
                output_count: 0,
                tx_modifiable: INITIAL_TX_MODIFIABLE,
            },
            inputs: vec![],
            outputs: vec![],
        }
    }
}
