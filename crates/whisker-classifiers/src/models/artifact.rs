//! Versioned binary layout for persisted logistic regression parameters.
//!
//! All integers and floats are little-endian:
//!
//! | offset | size            | field                  |
//! |--------|-----------------|------------------------|
//! | 0      | 4               | magic `b"WSKR"`        |
//! | 4      | 4               | format version (`u32`) |
//! | 8      | 8               | feature count (`u64`)  |
//! | 16     | 8               | cost interval (`u64`)  |
//! | 24     | 8               | bias (`f64`)           |
//! | 32     | 8 * features    | weights (`f64`)        |
//! | ..     | 8               | cost count (`u64`)     |
//! | ..     | 8 * cost count  | costs (`f64`)          |

use std::fs;
use std::path::Path;

use crate::error::{ClassifierError, Result};

pub const MAGIC: [u8; 4] = *b"WSKR";
pub const FORMAT_VERSION: u32 = 1;

const HEADER_SIZE: usize = 4 + 4 + 8 + 8;

/// Plain parameter payload of a model artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub cost_interval: u64,
    pub costs: Vec<f64>,
}

impl ModelArtifact {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(HEADER_SIZE + 8 * (2 + self.weights.len() + self.costs.len()));
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&(self.weights.len() as u64).to_le_bytes());
        buf.extend_from_slice(&self.cost_interval.to_le_bytes());
        buf.extend_from_slice(&self.bias.to_le_bytes());
        buf.extend(self.weights.iter().flat_map(|w| w.to_le_bytes()));
        buf.extend_from_slice(&(self.costs.len() as u64).to_le_bytes());
        buf.extend(self.costs.iter().flat_map(|c| c.to_le_bytes()));
        buf
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut reader = Reader { raw, offset: 0 };

        let magic = reader.take(4)?;
        if magic != MAGIC {
            return Err(corrupt(format!("bad magic {:?}", magic)));
        }
        let version = reader.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let feature_count = reader.read_len()?;
        if feature_count == 0 {
            return Err(corrupt("feature count is zero".to_string()));
        }
        let cost_interval = reader.read_u64()?;
        let bias = reader.read_f64()?;
        let weights = reader.read_f64_vec(feature_count)?;
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(corrupt("non-finite parameter value".to_string()));
        }

        let cost_count = reader.read_len()?;
        let costs = reader.read_f64_vec(cost_count)?;

        if reader.offset != raw.len() {
            return Err(corrupt(format!(
                "{} trailing bytes after cost history",
                raw.len() - reader.offset
            )));
        }

        Ok(Self {
            weights,
            bias,
            cost_interval,
            costs,
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.encode()).map_err(|e| ClassifierError::from_io(e, path))
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let raw = fs::read(path).map_err(|e| ClassifierError::from_io(e, path))?;
        Self::decode(&raw)
    }
}

fn corrupt(msg: String) -> ClassifierError {
    ClassifierError::CorruptArtifact(msg)
}

struct Reader<'a> {
    raw: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.saturating_add(len);
        let bytes = self.raw.get(self.offset..end).ok_or_else(|| {
            corrupt(format!(
                "truncated: need {} bytes at offset {}, have {}",
                len,
                self.offset,
                self.raw.len()
            ))
        })?;
        self.offset = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Element count that must fit in the bytes still unread.
    fn read_len(&mut self) -> Result<usize> {
        let len = self.read_u64()?;
        let remaining = (self.raw.len() - self.offset) as u64;
        if len > remaining / 8 {
            return Err(corrupt(format!(
                "declared {} values but only {} bytes remain",
                len, remaining
            )));
        }
        Ok(len as usize)
    }

    fn read_f64_vec(&mut self, len: usize) -> Result<Vec<f64>> {
        (0..len).map(|_| self.read_f64()).collect()
    }
}
