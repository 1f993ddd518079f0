use std::{fs, path::Path};

use ethnum::U256;

use super::{
    input_hash_map::{HashSignalInfo, InputHashMap, ENTRY_BYTES},
    layout::CircuitLayout,
};
use crate::{
    field::{FieldContext, FieldElement},
    utils::{
        error::{Error, Result},
        serde::{le_u32, le_u64, SectionReader},
    },
};

/// On-disk width of a constant: i32 compact value, u32 type word, 32-byte value.
pub const CONSTANT_BYTES: usize = 40;
/// Type-word bit marking a constant stored in extended form.
pub const EXTENDED_FLAG: u32 = 0x8000_0000;

const WITNESS_INDEX_BYTES: usize = 8;

/// Immutable tables of a compiled circuit.
#[derive(Debug, Clone)]
pub struct CircuitDescriptor {
    pub layout: CircuitLayout,
    pub input_hash_map: InputHashMap,
    pub witness_index: Vec<usize>,
    pub constants: Vec<FieldElement>,
}

fn decode_constant(record: &[u8]) -> FieldElement {
    let short = le_u32(&record[0..4]) as i32;
    let ty = le_u32(&record[4..8]);
    if ty & EXTENDED_FLAG != 0 {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&record[8..40]);
        FieldElement::Extended(U256::from_le_bytes(bytes))
    } else {
        FieldElement::Compact(short as i64)
    }
}

fn encode_constant(field: &FieldContext, c: &FieldElement, out: &mut Vec<u8>) {
    match c {
        FieldElement::Compact(v) if i32::try_from(*v).is_ok() => {
            out.extend_from_slice(&(*v as i32).to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&[0u8; 32]);
        }
        _ => {
            out.extend_from_slice(&0i32.to_le_bytes());
            out.extend_from_slice(&EXTENDED_FLAG.to_le_bytes());
            out.extend_from_slice(&field.to_u256(c).to_le_bytes());
        }
    }
}

impl CircuitDescriptor {
    /// Parses the artifact sections in their fixed order: input hash map,
    /// witness index, constants. Nothing is returned unless every section
    /// lies inside `data` and every table entry is consistent with `layout`.
    pub fn load(layout: CircuitLayout, data: &[u8]) -> Result<Self> {
        layout.validate()?;
        let mut reader = SectionReader::new(data);

        let hm = reader.section("input hash map", layout.input_hash_map_size, ENTRY_BYTES)?;
        let input_hash_map = InputHashMap::from_bytes(hm);

        let wi = reader.section("witness index", layout.witness_count, WITNESS_INDEX_BYTES)?;
        let witness_index = wi
            .chunks_exact(WITNESS_INDEX_BYTES)
            .map(|e| le_u64(e) as usize)
            .collect::<Vec<_>>();

        let cs = reader.section("constants", layout.constant_count, CONSTANT_BYTES)?;
        let constants = cs.chunks_exact(CONSTANT_BYTES).map(decode_constant).collect();

        if reader.remaining() > 0 {
            log::debug!(
                "circuit descriptor has {} trailing bytes after the constants",
                reader.remaining()
            );
        }

        let descriptor = CircuitDescriptor {
            layout,
            input_hash_map,
            witness_index,
            constants,
        };
        descriptor.check_tables()?;
        log::debug!(
            "loaded circuit descriptor: {} inputs, {} witnesses, {} constants, {} signals",
            descriptor.input_hash_map.entries().count(),
            descriptor.witness_index.len(),
            descriptor.constants.len(),
            layout.total_signal_count
        );
        Ok(descriptor)
    }

    pub fn load_file<P: AsRef<Path>>(layout: CircuitLayout, path: P) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::load(layout, &data)
    }

    fn check_tables(&self) -> Result<()> {
        let inputs = self.layout.main_inputs();
        let mut entries = self.input_hash_map.entries().copied().collect::<Vec<_>>();
        for e in &entries {
            let start = e.signal_id as usize;
            let end = start + e.arity as usize;
            if e.arity == 0 || start < inputs.start || end > inputs.end {
                return Err(Error::InvariantViolation(format!(
                    "input {:#018x} maps to signals {}..{} outside main inputs {:?}",
                    e.hash, start, end, inputs
                )));
            }
        }
        // every main input signal belongs to at most one named input
        entries.sort_by_key(|e| e.signal_id);
        for w in entries.windows(2) {
            let end = w[0].signal_id as usize + w[0].arity as usize;
            if end > w[1].signal_id as usize {
                return Err(Error::InvariantViolation(format!(
                    "inputs {:#018x} and {:#018x} share signal {}",
                    w[0].hash, w[1].hash, w[1].signal_id
                )));
            }
        }
        entries.sort_by_key(|e| e.hash);
        if let Some(w) = entries.windows(2).find(|w| w[0].hash == w[1].hash) {
            return Err(Error::InvariantViolation(format!(
                "input hash {:#018x} appears twice",
                w[0].hash
            )));
        }
        if let Some((pos, id)) = self
            .witness_index
            .iter()
            .enumerate()
            .find(|(_, &id)| id >= self.layout.total_signal_count)
        {
            return Err(Error::InvariantViolation(format!(
                "witness {} refers to signal {} of {}",
                pos, id, self.layout.total_signal_count
            )));
        }
        Ok(())
    }

    pub fn lookup_input(&self, h: u64) -> Result<HashSignalInfo> {
        self.input_hash_map.get(h)
    }

    pub fn constant(&self, i: usize) -> Result<&FieldElement> {
        self.constants.get(i).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "constant {} out of {}",
                i,
                self.constants.len()
            ))
        })
    }

    /// Encodes the descriptor in the artifact format `load` reads.
    pub fn to_bytes(&self, field: &FieldContext) -> Vec<u8> {
        let mut res = self.input_hash_map.to_bytes();
        for &id in &self.witness_index {
            res.extend_from_slice(&(id as u64).to_le_bytes());
        }
        for c in &self.constants {
            encode_constant(field, c, &mut res);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::input_hash_map::fnv1a;

    fn sample(field: &FieldContext) -> (CircuitLayout, Vec<u8>) {
        let layout = CircuitLayout {
            input_hash_map_size: 8,
            witness_count: 4,
            constant_count: 2,
            total_signal_count: 5,
            main_input_signal_count: 3,
            main_input_signal_start: 2,
            component_count: 1,
        };
        let input_hash_map = InputHashMap::build(
            8,
            &[
                HashSignalInfo {
                    hash: fnv1a("a"),
                    signal_id: 2,
                    arity: 1,
                },
                HashSignalInfo {
                    hash: fnv1a("b"),
                    signal_id: 3,
                    arity: 2,
                },
            ],
        )
        .unwrap();
        let d = CircuitDescriptor {
            layout,
            input_hash_map,
            witness_index: vec![0, 1, 2, 4],
            constants: vec![FieldElement::Compact(-7), field.parse_literal("0x1234567890abcdef1234").unwrap()],
        };
        (layout, d.to_bytes(field))
    }

    #[test]
    fn test_load() {
        let field = FieldContext::bn254();
        let (layout, data) = sample(&field);
        assert_eq!(data.len(), 8 * 16 + 4 * 8 + 2 * 40);
        let d = CircuitDescriptor::load(layout, &data).unwrap();
        assert_eq!(d.witness_index, vec![0, 1, 2, 4]);
        assert_eq!(d.constants[0], FieldElement::Compact(-7));
        assert!(!d.constants[1].is_compact());
        assert_eq!(
            field.to_decimal_string(d.constant(1).unwrap()),
            "85968058272638546416180"
        );
        assert_eq!(d.lookup_input(fnv1a("b")).unwrap().arity, 2);
        assert!(d.constant(2).is_err());
    }

    #[test]
    fn test_truncated_at_every_section() {
        let field = FieldContext::bn254();
        let (layout, data) = sample(&field);
        let boundaries = [0, 8 * 16 - 1, 8 * 16, 8 * 16 + 4 * 8 - 1, 8 * 16 + 4 * 8, data.len() - 1];
        let sections = ["input hash map", "input hash map", "witness index", "witness index", "constants", "constants"];
        for (cut, expected) in boundaries.iter().zip(sections) {
            match CircuitDescriptor::load(layout, &data[..*cut]) {
                Err(Error::TruncatedArtifact { section, .. }) => assert_eq!(section, expected),
                other => panic!("cut at {}: unexpected {:?}", cut, other.map(|_| ())),
            }
        }
    }

    fn two_input_layout() -> CircuitLayout {
        CircuitLayout {
            input_hash_map_size: 4,
            witness_count: 0,
            constant_count: 0,
            total_signal_count: 5,
            main_input_signal_count: 3,
            main_input_signal_start: 2,
            component_count: 1,
        }
    }

    #[test]
    fn test_rejects_overlapping_inputs() {
        let field = FieldContext::bn254();
        let layout = two_input_layout();
        // "a" covers signals 2..4 and "b" claims signal 3 again
        let input_hash_map = InputHashMap::build(
            4,
            &[
                HashSignalInfo {
                    hash: fnv1a("a"),
                    signal_id: 2,
                    arity: 2,
                },
                HashSignalInfo {
                    hash: fnv1a("b"),
                    signal_id: 3,
                    arity: 1,
                },
            ],
        )
        .unwrap();
        let d = CircuitDescriptor {
            layout,
            input_hash_map,
            witness_index: vec![],
            constants: vec![],
        };
        match CircuitDescriptor::load(layout, &d.to_bytes(&field)) {
            Err(Error::InvariantViolation(msg)) => assert!(msg.contains("share signal 3")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_rejects_duplicate_hashes() {
        let layout = two_input_layout();
        // two slots carry the same name hash; `build` refuses this, so the
        // table is written by hand
        let mut data = vec![];
        for id in [2u32, 3] {
            data.extend_from_slice(&fnv1a("a").to_le_bytes());
            data.extend_from_slice(&id.to_le_bytes());
            data.extend_from_slice(&1u32.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 2 * ENTRY_BYTES]);
        match CircuitDescriptor::load(layout, &data) {
            Err(Error::InvariantViolation(msg)) => assert!(msg.contains("appears twice")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_rejects_inconsistent_tables() {
        let field = FieldContext::bn254();
        let (mut layout, data) = sample(&field);
        // witness 3 points at signal 4, which no longer exists
        layout.total_signal_count = 4;
        layout.main_input_signal_count = 2;
        assert!(matches!(
            CircuitDescriptor::load(layout, &data),
            Err(Error::InvariantViolation(_))
        ));

        let (mut layout, data) = sample(&field);
        // input "b" covers signals 3..5, beyond the main input range
        layout.main_input_signal_count = 2;
        assert!(matches!(
            CircuitDescriptor::load(layout, &data),
            Err(Error::InvariantViolation(_))
        ));
    }
}
