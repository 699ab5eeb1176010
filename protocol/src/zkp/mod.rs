//! # Zero-Knowledge Proof Plumbing
//!
//! Everything between the opaque `proofData` bytes a wallet sends and a
//! yes/no from the pairing check.
//!
//! ```text
//! envelope.rs        strict ABI decode/encode of (a, b, c, input[N])
//! proof_system.rs    ProofSystem capability + Groth16/BN254 backend
//! ```
//!
//! Neither file knows what the public inputs *mean*. Interpreting them is
//! the job of [`crate::scheme`].

pub mod envelope;
pub mod proof_system;

pub use envelope::{EnvelopeError, ProofEnvelope};
pub use proof_system::{envelope_from_proof, Groth16ProofSystem, ProofSystem, ProofSystemError};
