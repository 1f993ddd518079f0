//! The evaluation scheduler: input assignment, dispatch of the evaluation
//! pass and access to the finished witness.

pub mod calculator;
pub mod evaluator;
pub mod trace;

pub use calculator::{SignalStore, WitnessCalculator};
pub use evaluator::{CircuitEvaluator, EvaluationContext};
pub use trace::{component_path, position_suffix, ComponentSlot};
