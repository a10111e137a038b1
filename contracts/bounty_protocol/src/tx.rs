//! # Transaction envelope
//!
//! A minimal transaction codec for the ledger outputs this crate tracks.
//! The admission gate decodes candidate transactions through it, and the
//! spend verifier uses its committed output hash and sighash.
//!
//! All integers are little-endian; counts and variable-length fields carry
//! u16 length prefixes.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::cursor::ByteReader;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxError {
    #[error("transaction ended before field `{0}`")]
    UnexpectedEnd(&'static str),

    #[error("{0} trailing bytes after the transaction fields")]
    TrailingBytes(usize),

    #[error("input index {index} out of range for {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },
}

/// Reference to the output a transaction input consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub previous_outpoint: OutPoint,
    pub signature_script: Vec<u8>,
    /// Relative-timelock field; `u64::MAX` disables locktime enforcement.
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_le_bytes());
        push_var_bytes(out, &self.script_pubkey);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Absolute locktime: block height or UNIX timestamp, disambiguated by
    /// [`crate::types::LOCKTIME_BLOCK_HEIGHT_MARKER`].
    pub lock_time: u64,
}

impl Transaction {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&(self.inputs.len() as u16).to_le_bytes());
        for input in &self.inputs {
            out.extend_from_slice(&input.previous_outpoint.txid);
            out.extend_from_slice(&input.previous_outpoint.index.to_le_bytes());
            push_var_bytes(&mut out, &input.signature_script);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        out.extend_from_slice(&(self.outputs.len() as u16).to_le_bytes());
        for output in &self.outputs {
            output.encode_into(&mut out);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TxError> {
        let mut r = ByteReader::new(bytes);

        let version = r.u16_le().ok_or(TxError::UnexpectedEnd("version"))?;

        let input_count = r.u16_le().ok_or(TxError::UnexpectedEnd("input count"))?;
        let mut inputs = Vec::with_capacity(input_count as usize);
        for _ in 0..input_count {
            let txid = r
                .array::<32>()
                .ok_or(TxError::UnexpectedEnd("outpoint txid"))?;
            let index = r.u32_le().ok_or(TxError::UnexpectedEnd("outpoint index"))?;
            let signature_script = read_var_bytes(&mut r, "signature script")?;
            let sequence = r.u64_le().ok_or(TxError::UnexpectedEnd("sequence"))?;
            inputs.push(TxInput {
                previous_outpoint: OutPoint { txid, index },
                signature_script,
                sequence,
            });
        }

        let output_count = r.u16_le().ok_or(TxError::UnexpectedEnd("output count"))?;
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            let value = r.u64_le().ok_or(TxError::UnexpectedEnd("output value"))?;
            let script_pubkey = read_var_bytes(&mut r, "output script")?;
            outputs.push(TxOutput {
                value,
                script_pubkey,
            });
        }

        let lock_time = r.u64_le().ok_or(TxError::UnexpectedEnd("lock_time"))?;

        if r.remaining() > 0 {
            return Err(TxError::TrailingBytes(r.remaining()));
        }

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Transaction id: double SHA-256 of the serialized transaction.
    pub fn txid(&self) -> [u8; 32] {
        sha256d(&self.encode())
    }

    /// The committed hash of this transaction's output set.
    pub fn outputs_hash(&self) -> [u8; 32] {
        outputs_hash(&self.outputs)
    }

    /// Message the spending signatures commit to for `input_index`: the
    /// transaction with all signature scripts cleared, plus the index.
    pub fn sighash(&self, input_index: usize) -> [u8; 32] {
        let mut cleared = self.clone();
        for input in cleared.inputs.iter_mut() {
            input.signature_script.clear();
        }
        let mut preimage = cleared.encode();
        preimage.extend_from_slice(&(input_index as u32).to_le_bytes());
        sha256d(&preimage)
    }
}

/// Hash an output set the way a transaction commits to it: double SHA-256
/// over the concatenated serialized outputs.
pub fn outputs_hash(outputs: &[TxOutput]) -> [u8; 32] {
    let mut bytes = Vec::new();
    for output in outputs {
        output.encode_into(&mut bytes);
    }
    sha256d(&bytes)
}

pub fn sha256d(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(bytes)).into()
}

fn push_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    debug_assert!(bytes.len() <= u16::MAX as usize);
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn read_var_bytes(r: &mut ByteReader<'_>, field: &'static str) -> Result<Vec<u8>, TxError> {
    let len = r.u16_le().ok_or(TxError::UnexpectedEnd(field))? as usize;
    let bytes = r.take(len).ok_or(TxError::UnexpectedEnd(field))?;
    Ok(bytes.to_vec())
}
