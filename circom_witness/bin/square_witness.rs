//! Computes the witness of the demo circuit `out <== x * x`.
//!
//! Signals: 0 = one, 1 = out, 2 = x. With `--emit-circuit` the descriptor
//! and layout of the circuit are written first, so the binary can be run
//! without a circuit compiler.

use std::{fs, path::PathBuf, process, sync::Arc};

use circom_witness::{
    circuit::{fnv1a, CircuitDescriptor, CircuitLayout, HashSignalInfo, InputHashMap},
    config::WitnessConfig,
    field::FieldContext,
    pipeline::{calc_witness, WitnessRequest},
    utils::error::Result,
    witness::EvaluationContext,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON input document, e.g. {"x": "3"}
    #[arg(short, long)]
    input: PathBuf,
    /// Circuit descriptor artifact
    #[arg(short, long, default_value = "square.dat")]
    circuit: PathBuf,
    /// Circuit layout (JSON)
    #[arg(short, long, default_value = "square.json")]
    layout: PathBuf,
    /// Output witness file
    #[arg(short, long, default_value = "witness.wtns")]
    output: PathBuf,
    /// Session configuration (JSON); defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bound on join, in milliseconds
    #[arg(long)]
    join_timeout_ms: Option<u64>,
    /// Write the demo circuit descriptor and layout before running
    #[arg(long, default_value_t = false)]
    emit_circuit: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn square_layout() -> CircuitLayout {
    CircuitLayout {
        input_hash_map_size: 4,
        witness_count: 3,
        constant_count: 0,
        total_signal_count: 3,
        main_input_signal_count: 1,
        main_input_signal_start: 2,
        component_count: 1,
    }
}

fn emit_circuit(args: &Args, field: &FieldContext) -> Result<()> {
    let layout = square_layout();
    let input_hash_map = InputHashMap::build(
        layout.input_hash_map_size,
        &[HashSignalInfo {
            hash: fnv1a("x"),
            signal_id: 2,
            arity: 1,
        }],
    )?;
    let descriptor = CircuitDescriptor {
        layout,
        input_hash_map,
        witness_index: vec![0, 1, 2],
        constants: vec![],
    };
    fs::write(&args.circuit, descriptor.to_bytes(field))?;
    let json = serde_json::to_string_pretty(&layout).map_err(std::io::Error::from)?;
    fs::write(&args.layout, json)?;
    Ok(())
}

fn square(_component: usize, ctx: &mut EvaluationContext<'_>) -> Result<()> {
    let x = ctx.input_signal("x")?;
    let v = ctx.signal(x.signal_id as usize)?;
    let out = ctx.field().square(&v);
    ctx.set_signal(1, out)
}

fn run(args: &Args) -> Result<usize> {
    if args.emit_circuit {
        emit_circuit(args, &FieldContext::bn254())?;
    }
    let mut config = match &args.config {
        Some(path) => WitnessConfig::from_file(path)?,
        None => WitnessConfig::default(),
    };
    if args.join_timeout_ms.is_some() {
        config.join_timeout_ms = args.join_timeout_ms;
    }
    let request = WitnessRequest {
        layout_path: args.layout.clone(),
        descriptor_path: args.circuit.clone(),
        input_json: fs::read_to_string(&args.input)?,
        output_path: args.output.clone(),
        config,
    };
    calc_witness(&request, Arc::new(square))
}

fn main() {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    match run(&args) {
        Ok(n) => println!("{} witness values written to {}", n, args.output.display()),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(if e.is_user() { 1 } else { 2 });
        }
    }
}
