use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};

/// Scalar metadata emitted by the circuit compiler next to the descriptor
/// artifact. It fixes the size of every section in the artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitLayout {
    pub input_hash_map_size: usize,
    pub witness_count: usize,
    pub constant_count: usize,
    pub total_signal_count: usize,
    pub main_input_signal_count: usize,
    pub main_input_signal_start: usize,
    #[serde(default)]
    pub component_count: usize,
}

impl CircuitLayout {
    pub fn validate(&self) -> Result<()> {
        if self.total_signal_count == 0 {
            return Err(Error::InvalidConfig(
                "total_signal_count must include the constant-one signal".to_string(),
            ));
        }
        if self.main_input_signal_count > 0 && self.main_input_signal_start == 0 {
            return Err(Error::InvalidConfig(
                "main inputs cannot start at signal 0".to_string(),
            ));
        }
        let end = self
            .main_input_signal_start
            .checked_add(self.main_input_signal_count);
        match end {
            Some(end) if end <= self.total_signal_count => Ok(()),
            _ => Err(Error::InvalidConfig(format!(
                "main inputs {}+{} exceed {} signals",
                self.main_input_signal_start,
                self.main_input_signal_count,
                self.total_signal_count
            ))),
        }
    }

    pub fn main_inputs(&self) -> std::ops::Range<usize> {
        self.main_input_signal_start..self.main_input_signal_start + self.main_input_signal_count
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let layout: CircuitLayout = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("circuit layout: {}", e)))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }
}
