//! Register Snapshots
//!
//! A snapshot captures the value of every named register of a circuit, in
//! the order the registers were created. It is enough to save and restore a
//! simulation session: gates hold no state, so registers are all there is.
//!
//! Snapshots encode to JSON for humans and to MessagePack for compact
//! storage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, Result};

/// Saved state of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRegister {
    /// Declared width at the time of the snapshot.
    pub width: u32,
    /// Stored value.
    pub value: u64,
}

/// Values of all named registers of a circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Registers by name, in creation order.
    pub registers: IndexMap<String, SavedRegister>,
}

impl Snapshot {
    /// Saved state of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&SavedRegister> {
        self.registers.get(name)
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CircuitError::Snapshot(e.to_string()))
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CircuitError::Snapshot(e.to_string()))
    }

    /// Encode as MessagePack.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| CircuitError::Snapshot(e.to_string()))
    }

    /// Decode from MessagePack.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| CircuitError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot
            .registers
            .insert("dr".to_owned(), SavedRegister { width: 8, value: 0x5A });
        snapshot
            .registers
            .insert("state".to_owned(), SavedRegister { width: 1, value: 1 });
        snapshot
    }

    #[test]
    fn json_keeps_register_order() {
        let json = sample().to_json().unwrap();
        let dr = json.find("\"dr\"").unwrap();
        let state = json.find("\"state\"").unwrap();
        assert!(dr < state);

        let decoded = Snapshot::from_json(&json).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn msgpack_decodes_to_the_same_snapshot() {
        let bytes = sample().to_msgpack().unwrap();
        assert_eq!(Snapshot::from_msgpack(&bytes).unwrap(), sample());
    }

    #[test]
    fn garbage_is_a_snapshot_error() {
        assert!(matches!(
            Snapshot::from_json("[1, 2"),
            Err(CircuitError::Snapshot(_))
        ));
        assert!(matches!(
            Snapshot::from_msgpack(&[0xC1]),
            Err(CircuitError::Snapshot(_))
        ));
    }
}
