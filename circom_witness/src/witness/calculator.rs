use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex},
    time::{Duration, Instant},
};

use crate::{
    circuit::CircuitDescriptor,
    config::WitnessConfig,
    field::{FieldContext, FieldElement},
    utils::error::{Error, Result},
};

use super::{
    evaluator::{CircuitEvaluator, EvaluationContext},
    trace::{component_path, ComponentSlot},
};

/// Assignment bookkeeping, guarded by the session's `signals` lock.
#[derive(Debug)]
pub struct SignalStore {
    pub(super) values: Vec<FieldElement>,
    assigned: Vec<bool>,
    remaining: usize,
    pub(super) components: Vec<Option<ComponentSlot>>,
}

#[derive(Debug, Default)]
struct EvaluationState {
    in_flight: usize,
    dispatched: bool,
    completed: bool,
    failure: Option<String>,
}

/// Releases an in-flight slot and wakes `join` waiters when a pass ends,
/// however it ends.
struct InFlightGuard<'a> {
    state: &'a Mutex<EvaluationState>,
    done: &'a Condvar,
    outcome: Option<std::result::Result<(), String>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(e) => e.into_inner(),
        };
        state.in_flight -= 1;
        match self.outcome.take() {
            Some(Ok(())) => state.completed = true,
            Some(Err(msg)) => state.failure = Some(msg),
            None => state.failure = Some("evaluation pass aborted".to_string()),
        }
        self.done.notify_all();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("evaluation panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("evaluation panicked: {}", s)
    } else {
        "evaluation panicked".to_string()
    }
}

fn failure_message(e: &Error) -> String {
    match e {
        Error::Evaluation(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One witness-calculation session over a loaded circuit.
///
/// Inputs may be assigned from any number of threads. The thread whose
/// assignment completes the main inputs runs the evaluation pass; other
/// threads observe it through [`WitnessCalculator::join`].
pub struct WitnessCalculator {
    descriptor: Arc<CircuitDescriptor>,
    field: Arc<FieldContext>,
    evaluator: Arc<dyn CircuitEvaluator>,
    max_concurrent_evaluations: usize,
    join_timeout: Option<Duration>,
    signals: Mutex<SignalStore>,
    evaluations: Mutex<EvaluationState>,
    evaluation_done: Condvar,
}

impl WitnessCalculator {
    pub fn new(
        descriptor: Arc<CircuitDescriptor>,
        field: Arc<FieldContext>,
        evaluator: Arc<dyn CircuitEvaluator>,
        config: &WitnessConfig,
    ) -> Result<Self> {
        config.validate()?;
        let layout = descriptor.layout;
        layout.validate()?;
        let mut values = vec![field.zero(); layout.total_signal_count];
        values[0] = field.one();
        let mut components = vec![None; layout.component_count.max(1)];
        components[0] = Some(ComponentSlot {
            name: "main".to_string(),
            parent: 0,
        });
        let store = SignalStore {
            values,
            assigned: vec![false; layout.main_input_signal_count],
            remaining: layout.main_input_signal_count,
            components,
        };
        Ok(WitnessCalculator {
            descriptor,
            field,
            evaluator,
            max_concurrent_evaluations: config.max_concurrent_evaluations,
            join_timeout: config.join_timeout(),
            signals: Mutex::new(store),
            evaluations: Mutex::new(EvaluationState::default()),
            evaluation_done: Condvar::new(),
        })
    }

    pub fn descriptor(&self) -> &CircuitDescriptor {
        &self.descriptor
    }

    pub fn field(&self) -> &FieldContext {
        &self.field
    }

    pub fn input_signal_size(&self, h: u64) -> Result<usize> {
        Ok(self.descriptor.lookup_input(h)?.arity as usize)
    }

    pub fn remaining_count(&self) -> Result<usize> {
        Ok(self.signals.lock()?.remaining)
    }

    /// Assigns element `index` of the input whose name hashes to `h`.
    ///
    /// When this completes the main inputs, the evaluation pass runs on the
    /// calling thread and its error, if any, is returned here.
    pub fn set_input(&self, h: u64, index: usize, value: FieldElement) -> Result<()> {
        let info = self.descriptor.lookup_input(h)?;
        if index >= info.arity as usize {
            return Err(Error::IndexOutOfRange {
                index,
                size: info.arity as usize,
            });
        }
        let id = info.signal_id as usize + index;
        let slot = id
            .checked_sub(self.descriptor.layout.main_input_signal_start)
            .filter(|&s| s < self.descriptor.layout.main_input_signal_count)
            .ok_or_else(|| {
                Error::InvariantViolation(format!("input signal {} is not a main input", id))
            })?;

        let mut store = self.signals.lock()?;
        if store.assigned[slot] {
            return Err(Error::DoubleAssignment(id));
        }
        store.values[id] = value;
        store.assigned[slot] = true;
        store.remaining -= 1;
        if store.remaining == 0 {
            self.dispatch(&mut store)?;
        }
        Ok(())
    }

    /// Starts the evaluation pass if every input is assigned, no pass was
    /// dispatched yet and an evaluation slot is free. Returns whether a pass
    /// ran.
    pub fn try_run(&self) -> Result<bool> {
        let mut store = self.signals.lock()?;
        if store.remaining > 0 {
            return Ok(false);
        }
        self.dispatch(&mut store)
    }

    fn dispatch(&self, store: &mut SignalStore) -> Result<bool> {
        {
            let mut state = self.evaluations.lock()?;
            if state.dispatched {
                return Ok(false);
            }
            if state.in_flight >= self.max_concurrent_evaluations {
                log::debug!(
                    "{} evaluation passes in flight, not dispatching",
                    state.in_flight
                );
                return Ok(false);
            }
            state.dispatched = true;
            state.in_flight += 1;
        }
        let mut guard = InFlightGuard {
            state: &self.evaluations,
            done: &self.evaluation_done,
            outcome: None,
        };
        log::debug!(
            "dispatching evaluation pass over {} signals",
            store.values.len()
        );

        let mut ctx =
            EvaluationContext::new(&self.field, &self.descriptor, self.evaluator.as_ref(), store);
        let res = panic::catch_unwind(AssertUnwindSafe(|| ctx.evaluate_component(0)))
            .unwrap_or_else(|p| Err(Error::Evaluation(panic_message(p))));

        match &res {
            Ok(()) => guard.outcome = Some(Ok(())),
            Err(e) => {
                log::warn!("evaluation pass failed: {}", e);
                guard.outcome = Some(Err(failure_message(e)));
            }
        }
        res.map(|_| true)
    }

    /// Blocks until no evaluation pass is in flight, bounded by the
    /// configured join timeout. Reports the failure of a finished pass.
    pub fn join(&self) -> Result<()> {
        let mut state = self.evaluations.lock()?;
        match self.join_timeout {
            None => {
                while state.in_flight > 0 {
                    state = self.evaluation_done.wait(state)?;
                }
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while state.in_flight > 0 {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::Timeout(timeout));
                    }
                    state = self.evaluation_done.wait_timeout(state, deadline - now)?.0;
                }
            }
        }
        match &state.failure {
            Some(msg) => Err(Error::Evaluation(msg.clone())),
            None => Ok(()),
        }
    }

    pub fn is_complete(&self) -> Result<bool> {
        Ok(self.evaluations.lock()?.completed)
    }

    fn ensure_complete(&self) -> Result<()> {
        let state = self.evaluations.lock()?;
        if let Some(msg) = &state.failure {
            return Err(Error::Evaluation(msg.clone()));
        }
        if !state.completed {
            return Err(Error::EvaluationNotComplete);
        }
        Ok(())
    }

    fn witness_signal(&self, store: &SignalStore, pos: usize) -> Result<FieldElement> {
        let id = self.descriptor.witness_index[pos];
        store.values.get(id).copied().ok_or_else(|| {
            Error::InvariantViolation(format!("witness {} refers to signal {}", pos, id))
        })
    }

    pub fn get_witness(&self, pos: usize) -> Result<FieldElement> {
        self.ensure_complete()?;
        let size = self.descriptor.witness_index.len();
        if pos >= size {
            return Err(Error::IndexOutOfRange { index: pos, size });
        }
        let store = self.signals.lock()?;
        self.witness_signal(&store, pos)
    }

    /// The whole witness in witness-index order.
    pub fn witness(&self) -> Result<Vec<FieldElement>> {
        self.ensure_complete()?;
        let store = self.signals.lock()?;
        (0..self.descriptor.witness_index.len())
            .map(|pos| self.witness_signal(&store, pos))
            .collect()
    }

    pub fn witness_len(&self) -> usize {
        self.descriptor.witness_index.len()
    }

    pub fn component_path(&self, id: usize) -> Result<String> {
        let store = self.signals.lock()?;
        component_path(&store.components, id)
    }
}
