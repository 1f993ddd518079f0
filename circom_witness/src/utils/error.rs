use std::io::Error as IoError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("artifact truncated: {section} needs bytes {offset}..{end}, artifact has {len}")]
    TruncatedArtifact {
        section: &'static str,
        offset: usize,
        end: usize,
        len: usize,
    },
    #[error("unknown input signal with hash {0:#018x}")]
    UnknownInputSignal(u64),
    #[error("index {index} out of range for signal of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("signal {0} assigned twice")]
    DoubleAssignment(usize),
    #[error("not enough values for input {name}: expected {expected}, got {got}")]
    TooFewValues {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("too many values for input {name}: expected {expected}, got {got}")]
    TooManyValues {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("{0} inputs are still unassigned")]
    MissingInputs(usize),
    #[error("invalid base-{base} literal {literal:?}")]
    InvalidLiteral { literal: String, base: u32 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("witness requested before evaluation completed")]
    EvaluationNotComplete,
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    #[error("timed out after {0:?} waiting for evaluation")]
    Timeout(std::time::Duration),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("prover failed with code {code}: {message}")]
    Prover { code: i32, message: String },
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("io error: {0}")]
    IOError(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors caused by caller-supplied data (inputs, artifacts, configuration).
    pub fn is_user(&self) -> bool {
        !self.is_internal()
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Error::InvariantViolation(_) | Error::IOError(_))
    }

    pub fn prepend(self, prefix: &str) -> Error {
        match self {
            Error::InvalidInput(s) => Error::InvalidInput(format!("{}: {}", prefix, s)),
            Error::Evaluation(s) => Error::Evaluation(format!("{}: {}", prefix, s)),
            Error::InvariantViolation(s) => {
                Error::InvariantViolation(format!("{}: {}", prefix, s))
            }
            Error::InvalidConfig(s) => Error::InvalidConfig(format!("{}: {}", prefix, s)),
            other => other,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Error::InvariantViolation(format!("lock poisoned: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Error::DivisionByZero.is_user());
        assert!(Error::InvariantViolation("x".to_string()).is_internal());
        let e = Error::Evaluation("bad".to_string()).prepend("main.sq");
        assert_eq!(e.to_string(), "evaluation failed: main.sq: bad");
        assert!(matches!(
            Error::DoubleAssignment(3).prepend("ignored"),
            Error::DoubleAssignment(3)
        ));
    }
}
