use std::hash::Hasher;

use fnv::FnvHasher;

use crate::utils::{
    error::{Error, Result},
    serde::{le_u32, le_u64},
};

/// Width of one table entry on disk: u64 hash, u32 signal id, u32 arity.
pub const ENTRY_BYTES: usize = 16;

/// FNV-1a (64-bit) over the UTF-8 bytes of an input name.
pub fn fnv1a(name: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashSignalInfo {
    pub hash: u64,
    pub signal_id: u32,
    pub arity: u32,
}

impl HashSignalInfo {
    pub fn is_empty(&self) -> bool {
        self.signal_id == 0
    }
}

/// Fixed-size open addressing table from name hash to input signal.
/// Collisions are resolved by linear probing; a slot with signal id 0 is empty.
#[derive(Debug, Clone, Default)]
pub struct InputHashMap {
    v: Vec<HashSignalInfo>,
}

impl InputHashMap {
    pub fn from_bytes(data: &[u8]) -> Self {
        let v = data
            .chunks_exact(ENTRY_BYTES)
            .map(|e| HashSignalInfo {
                hash: le_u64(&e[0..8]),
                signal_id: le_u32(&e[8..12]),
                arity: le_u32(&e[12..16]),
            })
            .collect();
        InputHashMap { v }
    }

    /// Builds a table of `size` slots, inserting with the same probing
    /// sequence `get` uses.
    pub fn build(size: usize, entries: &[HashSignalInfo]) -> Result<Self> {
        if entries.len() > size {
            return Err(Error::InvalidConfig(format!(
                "{} inputs do not fit in a table of {}",
                entries.len(),
                size
            )));
        }
        let mut v = vec![HashSignalInfo::default(); size];
        for e in entries {
            if e.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "input with hash {:#018x} uses reserved signal id 0",
                    e.hash
                )));
            }
            let mut pos = (e.hash % size as u64) as usize;
            while !v[pos].is_empty() {
                if v[pos].hash == e.hash {
                    return Err(Error::InvalidConfig(format!(
                        "duplicate input hash {:#018x}",
                        e.hash
                    )));
                }
                pos = (pos + 1) % size;
            }
            v[pos] = *e;
        }
        Ok(InputHashMap { v })
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HashSignalInfo> {
        self.v.iter().filter(|e| !e.is_empty())
    }

    pub fn get(&self, h: u64) -> Result<HashSignalInfo> {
        let n = self.v.len();
        if n == 0 {
            return Err(Error::UnknownInputSignal(h));
        }
        let start = (h % n as u64) as usize;
        let mut pos = start;
        loop {
            let e = &self.v[pos];
            if e.hash == h && !e.is_empty() {
                return Ok(*e);
            }
            if e.is_empty() {
                return Err(Error::UnknownInputSignal(h));
            }
            pos = (pos + 1) % n;
            if pos == start {
                return Err(Error::UnknownInputSignal(h));
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.v.len() * ENTRY_BYTES);
        for e in &self.v {
            res.extend_from_slice(&e.hash.to_le_bytes());
            res.extend_from_slice(&e.signal_id.to_le_bytes());
            res.extend_from_slice(&e.arity.to_le_bytes());
        }
        res
    }
}
