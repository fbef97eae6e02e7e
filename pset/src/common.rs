use getset::Getters;

use crate::Input;

pub(crate) const FLAG_INPUTS_MODIFIABLE: u8 = 0b0000_0001;
pub(crate) const FLAG_OUTPUTS_MODIFIABLE: u8 = 0b0000_0010;
pub(crate) const FLAG_HAS_SIGHASH_SINGLE: u8 = 0b0000_0100;

/// Lock times below this value are block heights; at or above it, Unix timestamps.
pub(crate) const LOCK_TIME_THRESHOLD: u32 = 500_000_000;

/// Global fields that are relevant to the transaction as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Global {
    //
    // Transaction effecting data.
    //
    // These are required fields that are part of the final transaction, and are filled in
    // by the Creator when initializing the PSET.
    //
    pub(crate) tx_version: u32,

    /// The transaction locktime to use if no inputs specify a required locktime.
    ///
    /// - This is set by the Creator.
    /// - If omitted, the fallback locktime is assumed to be 0.
    pub(crate) fallback_lock_time: Option<u32>,

    /// The number of inputs in this PSET.
    ///
    /// Kept equal to the length of the input list by the Constructor; [`Pset::sanity_check`]
    /// rejects documents where the two disagree.
    ///
    /// [`Pset::sanity_check`]: crate::Pset::sanity_check
    pub(crate) input_count: usize,

    /// The number of outputs in this PSET.
    pub(crate) output_count: usize,

    /// A bitfield for various transaction modification flags.
    ///
    /// - Bit 0 is the Inputs Modifiable Flag and indicates whether inputs can be modified.
    ///   - This is set to `true` by the Creator.
    ///   - This is checked by the Constructor before adding inputs.
    ///   - This is set to `false` by a Signer that adds a signature that does not use
    ///     `SIGHASH_ANYONECANPAY`.
    /// - Bit 1 is the Outputs Modifiable Flag and indicates whether outputs can be
    ///   modified.
    ///   - This is set to `true` by the Creator.
    ///   - This is checked by the Constructor before adding outputs.
    ///   - This is set to `false` by a Signer that adds a signature that does not use
    ///     `SIGHASH_NONE`.
    /// - Bit 2 is the Has `SIGHASH_SINGLE` flag and indicates whether the transaction has
    ///   a `SIGHASH_SINGLE` signature who's input and output pairing must be preserved.
    ///   - This is set to `false` by the Creator.
    ///   - This is set to `true` by a Signer that adds a signature that uses
    ///     `SIGHASH_SINGLE`.
    /// - Bits 3-7 must be 0.
    pub(crate) tx_modifiable: u8,
}

impl Global {
    pub fn inputs_modifiable(&self) -> bool {
        self.tx_modifiable & FLAG_INPUTS_MODIFIABLE != 0
    }

    pub fn outputs_modifiable(&self) -> bool {
        self.tx_modifiable & FLAG_OUTPUTS_MODIFIABLE != 0
    }

    pub fn has_sighash_single(&self) -> bool {
        self.tx_modifiable & FLAG_HAS_SIGHASH_SINGLE != 0
    }
}

/// Determines the lock time of the transaction, following the rules of BIP 370.
///
/// Returns `None` if some inputs can only be satisfied by a time-based lock time and
/// others only by a height-based one.
pub(crate) fn determine_lock_time(global: &Global, inputs: &[Input]) -> Option<u32> {
    let has_time = inputs
        .iter()
        .any(|input| input.required_time_lock_time.is_some());
    let has_height = inputs
        .iter()
        .any(|input| input.required_height_lock_time.is_some());

    if !has_time && !has_height {
        return Some(global.fallback_lock_time.unwrap_or(0));
    }

    // An input that specifies both kinds can be satisfied by either; height wins ties.
    let all_accept_height = inputs.iter().all(|input| {
        input.required_time_lock_time.is_none() || input.required_height_lock_time.is_some()
    });
    let all_accept_time = inputs.iter().all(|input| {
        input.required_height_lock_time.is_none() || input.required_time_lock_time.is_some()
    });

    if has_height && all_accept_height {
        inputs
            .iter()
            .filter_map(|input| input.required_height_lock_time)
            .max()
    } else if has_time && all_accept_time {
        inputs
            .iter()
            .filter_map(|input| input.required_time_lock_time)
            .max()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use elements_protocol::TxId;

    use super::{determine_lock_time, Global};
    use crate::Input;

    fn global(fallback_lock_time: Option<u32>) -> Global {
        Global {
            tx_version: 2,
            fallback_lock_time,
            input_count: 0,
            output_count: 0,
            tx_modifiable: 0,
        }
    }

    fn input(time: Option<u32>, height: Option<u32>) -> Input {
        let mut input = Input::new(TxId::from_bytes([0; 32]), 0);
        input.required_time_lock_time = time;
        input.required_height_lock_time = height;
        input
    }

    #[test]
    fn fallback_lock_time() {
        assert_eq!(determine_lock_time(&global(None), &[input(None, None)]), Some(0));
        assert_eq!(
            determine_lock_time(&global(Some(42)), &[input(None, None)]),
            Some(42)
        );
    }

    #[test]
    fn lock_time_kinds() {
        let g = global(Some(7));
        for (inputs, expected) in [
            (vec![input(None, Some(100)), input(None, Some(200))], Some(200)),
            (
                vec![input(Some(600_000_000), None), input(Some(500_000_001), None)],
                Some(600_000_000),
            ),
            (
                vec![input(Some(600_000_000), Some(150)), input(None, Some(100))],
                Some(150),
            ),
            (
                vec![input(Some(600_000_000), Some(150)), input(Some(700_000_000), None)],
                Some(700_000_000),
            ),
            (
                vec![input(Some(600_000_000), None), input(None, Some(100))],
                None,
            ),
        ] {
            assert_eq!(determine_lock_time(&g, &inputs), expected);
        }
    }

    #[test]
    fn tx_modifiable_flags() {
        let mut g = global(None);
        g.tx_modifiable = 0b0000_0101;
        assert!(g.inputs_modifiable());
        assert!(!g.outputs_modifiable());
        assert!(g.has_sighash_single());
    }
}
