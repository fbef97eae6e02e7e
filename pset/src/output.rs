use elements_protocol::{
    confidential::{
        CommitmentError, ConfidentialAsset, ConfidentialNonce, ConfidentialValue,
        ASSET_COMMITMENT_PREFIXES, VALUE_COMMITMENT_PREFIXES,
    },
    script::Script,
    transaction::TxOut,
};
use getset::Getters;

use crate::{confidential, sighash::OutputWitness};

/// Information about an output within a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Output {
    //
    // Transaction effecting data.
    //
    // These are required fields that are part of the final transaction, and are filled in
    // by the Constructor when adding an output.
    //
    pub(crate) script_pubkey: Script,

    /// The explicit amount of this output.
    ///
    /// For a blinded output this is kept alongside the commitment so that a blind value
    /// proof can show the two agree.
    pub(crate) amount: Option<u64>,

    /// A Pedersen commitment to the amount.
    pub(crate) amount_commitment: Option<[u8; 33]>,

    /// The explicit asset of this output.
    pub(crate) asset: Option<[u8; 32]>,

    /// A commitment to the asset.
    pub(crate) asset_commitment: Option<[u8; 33]>,

    //
    // Blinding data.
    //
    /// The public key the receiver will use to unblind this output.
    ///
    /// Its presence marks the output for blinding.
    pub(crate) blinding_key: Option<[u8; 33]>,

    /// The ephemeral public key used for the ECDH with `blinding_key`.
    pub(crate) ecdh_pubkey: Option<[u8; 33]>,

    /// The index of the input whose owner is responsible for blinding this output.
    pub(crate) blinder_index: Option<u32>,

    pub(crate) value_rangeproof: Option<Vec<u8>>,
    pub(crate) asset_surjection_proof: Option<Vec<u8>>,

    /// Proves that `amount_commitment` commits to `amount`.
    pub(crate) blind_value_proof: Option<Vec<u8>>,

    /// Proves that `asset_commitment` commits to `asset`.
    pub(crate) blind_asset_proof: Option<Vec<u8>>,
}

impl Output {
    pub(crate) fn new(script_pubkey: Script) -> Self {
        Output {
            script_pubkey,
            amount: None,
            amount_commitment: None,
            asset: None,
            asset_commitment: None,
            blinding_key: None,
            ecdh_pubkey: None,
            blinder_index: None,
            value_rangeproof: None,
            asset_surjection_proof: None,
            blind_value_proof: None,
            blind_asset_proof: None,
        }
    }

    /// Returns `true` if any confidential field of this output is present.
    pub fn is_blinded(&self) -> bool {
        self.blinding_key.is_some()
            || self.amount_commitment.is_some()
            || self.asset_commitment.is_some()
            || self.ecdh_pubkey.is_some()
            || self.value_rangeproof.is_some()
            || self.asset_surjection_proof.is_some()
            || self.blind_value_proof.is_some()
            || self.blind_asset_proof.is_some()
    }

    /// Returns `true` if the blinding of this output has been carried out completely.
    ///
    /// This requires well-formed value and asset commitments, the ECDH public key, and
    /// non-empty range and surjection proofs. If a [`confidential::Backend`] is
    /// installed, it must also accept the range proof.
    pub fn is_fully_blinded(&self) -> bool {
        if self.ecdh_pubkey.is_none() {
            return false;
        }

        let (Some(value_commitment), Some(asset_commitment)) =
            (&self.amount_commitment, &self.asset_commitment)
        else {
            return false;
        };
        if !VALUE_COMMITMENT_PREFIXES.contains(&value_commitment[0])
            || !ASSET_COMMITMENT_PREFIXES.contains(&asset_commitment[0])
        {
            return false;
        }

        let (Some(rangeproof), Some(surjection_proof)) =
            (&self.value_rangeproof, &self.asset_surjection_proof)
        else {
            return false;
        };
        if rangeproof.is_empty() || surjection_proof.is_empty() {
            return false;
        }

        confidential::backend().map_or(true, |backend| {
            backend.verify_value_rangeproof(
                rangeproof,
                value_commitment,
                asset_commitment,
                self.script_pubkey.as_bytes(),
            )
        })
    }

    /// Returns the transaction output this PSET output describes.
    ///
    /// Commitments take precedence over explicit values.
    pub fn to_txout(&self) -> Result<TxOut, CommitmentError> {
        let asset = match (&self.asset_commitment, self.asset) {
            (Some(commitment), _) => ConfidentialAsset::from_commitment(commitment)?,
            (None, Some(asset)) => ConfidentialAsset::Explicit(asset),
            (None, None) => ConfidentialAsset::Null,
        };
        let value = match (&self.amount_commitment, self.amount) {
            (Some(commitment), _) => ConfidentialValue::from_commitment(commitment)?,
            (None, Some(amount)) => ConfidentialValue::Explicit(amount),
            (None, None) => ConfidentialValue::Null,
        };
        let nonce = match &self.ecdh_pubkey {
            Some(pubkey) => ConfidentialNonce::from_commitment(pubkey)?,
            None => ConfidentialNonce::Null,
        };

        Ok(TxOut {
            asset,
            value,
            nonce,
            script_pubkey: self.script_pubkey.clone(),
        })
    }

    pub(crate) fn witness(&self) -> OutputWitness<'_> {
        OutputWitness {
            surjection_proof: self.asset_surjection_proof.as_deref().unwrap_or_default(),
            rangeproof: self.value_rangeproof.as_deref().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use elements_protocol::{
        confidential::{CommitmentError, ConfidentialAsset, ConfidentialValue},
        script::Script,
    };

    use super::Output;

    fn blinded_output() -> Output {
        let mut output = Output::new(Script::p2wpkh(&[7; 20]));
        output.amount = Some(1_000);
        output.asset = Some([0xaa; 32]);
        output.blinding_key = Some([0x02; 33]);
        output
    }

    fn complete_blinding(output: &mut Output) {
        output.amount_commitment = Some([0x08; 33]);
        output.asset_commitment = Some([0x0a; 33]);
        output.ecdh_pubkey = Some([0x03; 33]);
        output.value_rangeproof = Some(vec![1; 8]);
        output.asset_surjection_proof = Some(vec![2; 8]);
    }

    #[test]
    fn unmarked_output_is_not_blinded() {
        let output = Output::new(Script::p2wpkh(&[7; 20]));
        assert!(!output.is_blinded());
        assert!(!output.is_fully_blinded());
    }

    #[test]
    fn any_confidential_field_marks_output_blinded() {
        let unmarked = Output::new(Script::p2wpkh(&[7; 20]));
        let setters: [fn(&mut Output); 8] = [
            |o| o.blinding_key = Some([0x02; 33]),
            |o| o.amount_commitment = Some([0x08; 33]),
            |o| o.asset_commitment = Some([0x0a; 33]),
            |o| o.ecdh_pubkey = Some([0x03; 33]),
            |o| o.value_rangeproof = Some(vec![1]),
            |o| o.asset_surjection_proof = Some(vec![1]),
            |o| o.blind_value_proof = Some(vec![1]),
            |o| o.blind_asset_proof = Some(vec![1]),
        ];
        for set in setters {
            let mut output = unmarked.clone();
            set(&mut output);
            assert!(output.is_blinded());
            assert!(!output.is_fully_blinded());
        }

        let mut commitments_only = unmarked;
        commitments_only.amount_commitment = Some([0x08; 33]);
        commitments_only.asset_commitment = Some([0x0a; 33]);
        assert!(commitments_only.is_blinded());
        assert!(!commitments_only.is_fully_blinded());
    }

    #[test]
    fn blinding_requires_every_piece() {
        let mut output = blinded_output();
        assert!(output.is_blinded());
        assert!(!output.is_fully_blinded());

        complete_blinding(&mut output);
        assert!(output.is_fully_blinded());

        let mut missing_proof = output.clone();
        missing_proof.value_rangeproof = Some(vec![]);
        assert!(!missing_proof.is_fully_blinded());

        let mut missing_ecdh = output.clone();
        missing_ecdh.ecdh_pubkey = None;
        assert!(!missing_ecdh.is_fully_blinded());

        let mut bad_prefix = output;
        bad_prefix.amount_commitment = Some([0x0a; 33]);
        assert!(!bad_prefix.is_fully_blinded());
    }

    #[test]
    fn txout_prefers_commitments() {
        let mut output = blinded_output();
        let txout = output.to_txout().unwrap();
        assert_eq!(txout.value, ConfidentialValue::Explicit(1_000));
        assert_eq!(txout.asset, ConfidentialAsset::Explicit([0xaa; 32]));

        complete_blinding(&mut output);
        let txout = output.to_txout().unwrap();
        assert!(txout.value.is_confidential());
        assert!(txout.asset.is_confidential());

        output.asset_commitment = Some([0x08; 33]);
        assert_eq!(output.to_txout(), Err(CommitmentError::InvalidPrefix(0x08)));
    }
}
