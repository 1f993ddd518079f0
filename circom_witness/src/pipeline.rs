use std::{fs, path::PathBuf, sync::Arc};

use crate::{
    circuit::{CircuitDescriptor, CircuitLayout},
    config::WitnessConfig,
    field::FieldContext,
    input::assign_inputs,
    utils::error::{Error, Result},
    witness::{CircuitEvaluator, WitnessCalculator},
    wtns::write_wtns,
};

/// Everything needed to turn one input document into a witness file.
#[derive(Debug, Clone)]
pub struct WitnessRequest {
    pub layout_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub input_json: String,
    pub output_path: PathBuf,
    pub config: WitnessConfig,
}

fn run(request: &WitnessRequest, evaluator: Arc<dyn CircuitEvaluator>) -> Result<usize> {
    let layout = CircuitLayout::from_file(&request.layout_path)?;
    let descriptor = Arc::new(CircuitDescriptor::load_file(
        layout,
        &request.descriptor_path,
    )?);
    let field = Arc::new(FieldContext::bn254());
    let calc = WitnessCalculator::new(descriptor, field, evaluator, &request.config)?;

    assign_inputs(&calc, &request.input_json)?;
    let remaining = calc.remaining_count()?;
    if remaining > 0 {
        return Err(Error::MissingInputs(remaining));
    }
    calc.join()?;
    write_wtns(&calc, &request.output_path)?;
    Ok(calc.witness_len())
}

/// Computes the witness for `request` and writes it as a `wtns` file.
/// Returns the number of witness values written. A failed request leaves
/// nothing at the output path.
pub fn calc_witness(request: &WitnessRequest, evaluator: Arc<dyn CircuitEvaluator>) -> Result<usize> {
    match run(request, evaluator) {
        Ok(n) => {
            log::info!(
                "witness of {} values written to {}",
                n,
                request.output_path.display()
            );
            Ok(n)
        }
        Err(e) => {
            log::warn!("witness calculation failed: {}", e);
            let _ = fs::remove_file(&request.output_path);
            Err(e)
        }
    }
}
