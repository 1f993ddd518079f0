//! Hand-off of a finished witness file to an external Groth16 prover.

use std::{fs, io::ErrorKind, path::Path};

use crate::utils::error::{Error, Result};

/// Output of a successful proof, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOutput {
    pub proof_json: String,
    pub public_json: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    pub code: i32,
    pub message: String,
}

pub trait Groth16Backend {
    fn prove(
        &self,
        zkey_path: &Path,
        witness: &[u8],
    ) -> std::result::Result<ProofOutput, BackendFailure>;
}

/// Reads the witness at `wtns_path` and proves it against `zkey_path`.
pub fn generate_proof<B: Groth16Backend + ?Sized>(
    backend: &B,
    zkey_path: &Path,
    wtns_path: &Path,
) -> Result<ProofOutput> {
    let witness = fs::read(wtns_path)?;
    if witness.is_empty() {
        return Err(Error::IOError(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("witness file {} is empty", wtns_path.display()),
        )));
    }
    backend.prove(zkey_path, &witness).map_err(|f| {
        log::warn!("prover failed with code {}: {}", f.code, f.message);
        Error::Prover {
            code: f.code,
            message: f.message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Groth16Backend for Echo {
        fn prove(
            &self,
            zkey_path: &Path,
            witness: &[u8],
        ) -> std::result::Result<ProofOutput, BackendFailure> {
            if witness.starts_with(b"wtns") {
                Ok(ProofOutput {
                    proof_json: format!("{{\"zkey\":\"{}\"}}", zkey_path.display()),
                    public_json: "[]".to_string(),
                })
            } else {
                Err(BackendFailure {
                    code: 2,
                    message: "not a witness".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_generate_proof() {
        let dir = tempfile::tempdir().unwrap();
        let zkey = dir.path().join("c.zkey");
        let good = dir.path().join("good.wtns");
        let bad = dir.path().join("bad.wtns");
        let empty = dir.path().join("empty.wtns");
        fs::write(&good, b"wtns....").unwrap();
        fs::write(&bad, b"junk").unwrap();
        fs::write(&empty, b"").unwrap();

        let out = generate_proof(&Echo, &zkey, &good).unwrap();
        assert_eq!(out.public_json, "[]");
        assert!(out.proof_json.contains("c.zkey"));
        match generate_proof(&Echo, &zkey, &bad) {
            Err(Error::Prover { code, message }) => {
                assert_eq!(code, 2);
                assert_eq!(message, "not a witness");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            generate_proof(&Echo, &zkey, &empty),
            Err(Error::IOError(_))
        ));
        assert!(matches!(
            generate_proof(&Echo, &zkey, &dir.path().join("missing.wtns")),
            Err(Error::IOError(_))
        ));
    }
}
