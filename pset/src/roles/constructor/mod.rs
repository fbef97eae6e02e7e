//! The Constructor role (anyone can contribute).
//!
//! - Adds inputs and outputs to the PSET.
//! - Inputs may only be added while the Inputs Modifiable flag is set, and outputs only
//!   while the Outputs Modifiable flag is set.

use std::fmt;

use elements_protocol::{script::Script, TxId};
use tracing::debug;

use crate::{
    common::{determine_lock_time, LOCK_TIME_THRESHOLD},
    Input, Output, Pset,
};

/// The previous output spent by a new input, and its timelock requirements.
#[derive(Clone, Debug)]
pub struct InputParams {
    previous_txid: TxId,
    previous_output_index: u32,
    sequence: Option<u32>,
    required_time_lock_time: Option<u32>,
    required_height_lock_time: Option<u32>,
}

impl InputParams {
    pub fn new(previous_txid: TxId, previous_output_index: u32) -> Self {
        Self {
            previous_txid,
            previous_output_index,
            sequence: None,
            required_time_lock_time: None,
            required_height_lock_time: None,
        }
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_required_time_lock_time(mut self, time: u32) -> Self {
        self.required_time_lock_time = Some(time);
        self
    }

    pub fn with_required_height_lock_time(mut self, height: u32) -> Self {
        self.required_height_lock_time = Some(height);
        self
    }
}

/// The contents of a new output.
#[derive(Clone, Debug)]
pub struct OutputParams {
    script_pubkey: Script,
    asset: [u8; 32],
    amount: u64,
    blinding_key: Option<[u8; 33]>,
    blinder_index: Option<u32>,
}

impl OutputParams {
    /// An output paying `amount` of `asset` to `script_pubkey`.
    ///
    /// An empty `script_pubkey` makes this a fee output.
    pub fn explicit(script_pubkey: Script, asset: [u8; 32], amount: u64) -> Self {
        Self {
            script_pubkey,
            asset,
            amount,
            blinding_key: None,
            blinder_index: None,
        }
    }

    /// Marks the output for blinding to `blinding_key`, by the owner of the input at
    /// `blinder_index`.
    pub fn with_blinding(mut self, blinding_key: [u8; 33], blinder_index: u32) -> Self {
        self.blinding_key = Some(blinding_key);
        self.blinder_index = Some(blinder_index);
        self
    }
}

pub struct Constructor {
    pset: Pset,
}

impl Constructor {
    /// Instantiates the Constructor role with the given PSET.
    pub fn new(pset: Pset) -> Self {
        Self { pset }
    }

    /// Appends an input to the PSET.
    pub fn add_input(&mut self, params: InputParams) -> Result<(), Error> {
        if !self.pset.global.inputs_modifiable() {
            return Err(Error::InputsNotModifiable);
        }
        if let Some(time) = params.required_time_lock_time {
            if time < LOCK_TIME_THRESHOLD {
                return Err(Error::InvalidRequiredTimeLockTime(time));
            }
        }
        if let Some(height) = params.required_height_lock_time {
            if height == 0 || height >= LOCK_TIME_THRESHOLD {
                return Err(Error::InvalidRequiredHeightLockTime(height));
            }
        }

        let mut input = Input::new(params.previous_txid, params.previous_output_index);
        input.sequence = params.sequence;
        input.required_time_lock_time = params.required_time_lock_time;
        input.required_height_lock_time = params.required_height_lock_time;

        self.pset.inputs.push(input);
        if determine_lock_time(&self.pset.global, &self.pset.inputs).is_none() {
            self.pset.inputs.pop();
            return Err(Error::IncompatibleLockTimes);
        }
        self.pset.global.input_count = self.pset.inputs.len();

        debug!(
            "Added input {} spending {}:{}",
            self.pset.inputs.len() - 1,
            params.previous_txid,
            params.previous_output_index
        );
        Ok(())
    }

    /// Appends an output to the PSET.
    pub fn add_output(&mut self, params: OutputParams) -> Result<(), Error> {
        if !self.pset.global.outputs_modifiable() {
            return Err(Error::OutputsNotModifiable);
        }

        let mut output = Output::new(params.script_pubkey);
        output.asset = Some(params.asset);
        output.amount = Some(params.amount);
        output.blinding_key = params.blinding_key;
        output.blinder_index = params.blinder_index;

        self.pset.outputs.push(output);
        self.pset.global.output_count = self.pset.outputs.len();

        debug!("Added output {}", self.pset.outputs.len() - 1);
        Ok(())
    }

    /// Finishes the Constructor role, returning the updated PSET.
    pub fn finish(self) -> Pset {
        self.pset
    }
}

/// Errors that can occur while adding inputs or outputs to a PSET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InputsNotModifiable,
    OutputsNotModifiable,
    InvalidRequiredTimeLockTime(u32),
    InvalidRequiredHeightLockTime(u32),
    /// The new input's lock time requirements conflict with those of existing inputs.
    IncompatibleLockTimes,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputsNotModifiable => write!(f, "inputs are not modifiable"),
            Error::OutputsNotModifiable => write!(f, "outputs are not modifiable"),
            Error::InvalidRequiredTimeLockTime(time) => {
                write!(f, "{} is not a valid time lock time", time)
            }
            Error::InvalidRequiredHeightLockTime(height) => {
                write!(f, "{} is not a valid height lock time", height)
            }
            Error::IncompatibleLockTimes => {
                write!(f, "input lock time requirements are incompatible")
            }
        }
    }
}

impl std::error::Error for Error {}
