use crate::{
    circuit::{fnv1a, CircuitDescriptor, HashSignalInfo},
    field::{FieldContext, FieldElement},
    utils::error::{Error, Result},
};

use super::{
    calculator::SignalStore,
    trace::{component_path, ComponentSlot},
};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Circuit-specific routine that fills every non-input signal.
///
/// It is called once per evaluation pass with component 0 (the main
/// component) after all main inputs are assigned, and may evaluate
/// sub-components through [`EvaluationContext::evaluate_component`].
pub trait CircuitEvaluator: Send + Sync {
    fn evaluate(&self, component: usize, ctx: &mut EvaluationContext<'_>) -> Result<()>;
}

impl<F> CircuitEvaluator for F
where
    F: Fn(usize, &mut EvaluationContext<'_>) -> Result<()> + Send + Sync,
{
    fn evaluate(&self, component: usize, ctx: &mut EvaluationContext<'_>) -> Result<()> {
        self(component, ctx)
    }
}

/// Exclusive view of a session's signal store for the duration of one pass.
pub struct EvaluationContext<'a> {
    field: &'a FieldContext,
    descriptor: &'a CircuitDescriptor,
    evaluator: &'a dyn CircuitEvaluator,
    store: &'a mut SignalStore,
}

impl<'a> EvaluationContext<'a> {
    pub(super) fn new(
        field: &'a FieldContext,
        descriptor: &'a CircuitDescriptor,
        evaluator: &'a dyn CircuitEvaluator,
        store: &'a mut SignalStore,
    ) -> Self {
        EvaluationContext {
            field,
            descriptor,
            evaluator,
            store,
        }
    }

    pub fn field(&self) -> &'a FieldContext {
        self.field
    }

    pub fn descriptor(&self) -> &'a CircuitDescriptor {
        self.descriptor
    }

    pub fn signal(&self, id: usize) -> Result<FieldElement> {
        self.store.values.get(id).copied().ok_or_else(|| {
            Error::InvariantViolation(format!(
                "signal {} out of {}",
                id,
                self.store.values.len()
            ))
        })
    }

    /// Writes a computed signal. The constant-one signal and the main inputs
    /// are fixed before the pass starts and cannot be overwritten.
    pub fn set_signal(&mut self, id: usize, value: FieldElement) -> Result<()> {
        if id == 0 || self.descriptor.layout.main_inputs().contains(&id) {
            return Err(Error::InvariantViolation(format!(
                "signal {} is not writable during evaluation",
                id
            )));
        }
        let len = self.store.values.len();
        let slot = self.store.values.get_mut(id).ok_or_else(|| {
            Error::InvariantViolation(format!("signal {} out of {}", id, len))
        })?;
        *slot = value;
        Ok(())
    }

    pub fn constant(&self, i: usize) -> Result<FieldElement> {
        self.descriptor.constant(i).copied()
    }

    pub fn input_signal(&self, name: &str) -> Result<HashSignalInfo> {
        self.descriptor.lookup_input(fnv1a(name))
    }

    pub fn init_component(&mut self, id: usize, name: &str, parent: usize) -> Result<()> {
        let len = self.store.components.len();
        let slot = self.store.components.get_mut(id).ok_or_else(|| {
            Error::InvariantViolation(format!("component {} out of {}", id, len))
        })?;
        *slot = Some(ComponentSlot {
            name: name.to_string(),
            parent,
        });
        Ok(())
    }

    pub fn component_path(&self, id: usize) -> Result<String> {
        component_path(&self.store.components, id)
    }

    /// Runs the evaluation routine for a sub-component. Failures are
    /// prefixed with the component path when it is known.
    pub fn evaluate_component(&mut self, id: usize) -> Result<()> {
        let evaluator = self.evaluator;
        let res = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            evaluator.evaluate(id, self)
        });
        res.map_err(|e| match self.component_path(id) {
            Ok(path) => e.prepend(&path),
            Err(_) => e,
        })
    }
}
