#![allow(dead_code)]

use std::{fs, path::Path, sync::Arc};

use circom_witness::{
    circuit::{fnv1a, CircuitDescriptor, CircuitLayout, HashSignalInfo, InputHashMap},
    config::WitnessConfig,
    field::FieldContext,
    utils::error::Result,
    witness::{EvaluationContext, WitnessCalculator},
};

/// `out <== x * x`; signals 0 = one, 1 = out, 2 = x.
pub fn square_descriptor() -> CircuitDescriptor {
    let layout = CircuitLayout {
        input_hash_map_size: 4,
        witness_count: 3,
        constant_count: 0,
        total_signal_count: 3,
        main_input_signal_count: 1,
        main_input_signal_start: 2,
        component_count: 1,
    };
    let input_hash_map = InputHashMap::build(
        4,
        &[HashSignalInfo {
            hash: fnv1a("x"),
            signal_id: 2,
            arity: 1,
        }],
    )
    .unwrap();
    CircuitDescriptor {
        layout,
        input_hash_map,
        witness_index: vec![0, 1, 2],
        constants: vec![],
    }
}

pub fn square(_component: usize, ctx: &mut EvaluationContext<'_>) -> Result<()> {
    let x = ctx.input_signal("x")?;
    let v = ctx.signal(x.signal_id as usize)?;
    let out = ctx.field().square(&v);
    ctx.set_signal(1, out)
}

/// `out <== k * sum(in[n]) + c`; signals 0 = one, 1 = out, 2 = c, 3.. = in.
/// `k` is constant 0 of the descriptor.
pub fn weighted_sum_descriptor(field: &FieldContext, n: usize, k: u64) -> CircuitDescriptor {
    let layout = CircuitLayout {
        input_hash_map_size: 8,
        witness_count: n + 3,
        constant_count: 1,
        total_signal_count: n + 3,
        main_input_signal_count: n + 1,
        main_input_signal_start: 2,
        component_count: 2,
    };
    let input_hash_map = InputHashMap::build(
        8,
        &[
            HashSignalInfo {
                hash: fnv1a("c"),
                signal_id: 2,
                arity: 1,
            },
            HashSignalInfo {
                hash: fnv1a("in"),
                signal_id: 3,
                arity: n as u32,
            },
        ],
    )
    .unwrap();
    CircuitDescriptor {
        layout,
        input_hash_map,
        witness_index: (0..n + 3).collect(),
        constants: vec![field.from_u64(k)],
    }
}

/// Main component 0 delegates the sum to component 1.
pub fn weighted_sum(component: usize, ctx: &mut EvaluationContext<'_>) -> Result<()> {
    let inputs = ctx.input_signal("in")?;
    if component == 0 {
        ctx.init_component(1, "sum", 0)?;
        return ctx.evaluate_component(1);
    }
    let field = ctx.field();
    let mut acc = field.zero();
    for i in 0..inputs.arity as usize {
        acc = field.add(&acc, &ctx.signal(inputs.signal_id as usize + i)?);
    }
    let k = ctx.constant(0)?;
    let c = ctx.signal(2)?;
    ctx.set_signal(1, field.add(&field.mul(&k, &acc), &c))
}

pub fn calculator<F>(descriptor: CircuitDescriptor, evaluator: F) -> WitnessCalculator
where
    F: Fn(usize, &mut EvaluationContext<'_>) -> Result<()> + Send + Sync + 'static,
{
    WitnessCalculator::new(
        Arc::new(descriptor),
        Arc::new(FieldContext::bn254()),
        Arc::new(evaluator),
        &WitnessConfig::default(),
    )
    .unwrap()
}

/// Writes `descriptor` and its layout into `dir` as `circuit.dat` and `circuit.json`.
pub fn write_artifacts(dir: &Path, descriptor: &CircuitDescriptor) {
    let field = FieldContext::bn254();
    fs::write(dir.join("circuit.dat"), descriptor.to_bytes(&field)).unwrap();
    fs::write(
        dir.join("circuit.json"),
        serde_json::to_string(&descriptor.layout).unwrap(),
    )
    .unwrap();
}
