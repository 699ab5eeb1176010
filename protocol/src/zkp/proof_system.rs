//! # Proof System
//!
//! The verifier core treats the SNARK check as an opaque capability: hand
//! it the proving scheme and the decoded envelope, get back valid or not.
//! [`ProofSystem`] is that seam.
//!
//! [`Groth16ProofSystem`] is the production implementation: one prepared
//! BN254 verifying key per proving scheme, and the usual three pairings per
//! call. Verifying keys come from the circuit ceremony; this crate never
//! generates them outside of tests.
//!
//! ## Point encoding
//!
//! Envelope points use the EVM convention. G1 points are `[x, y]`, G2 points
//! are `[[x.c1, x.c0], [y.c1, y.c0]]`, and `(0, 0)` is the point at
//! infinity. Every coordinate must be a canonical `Fq` element and every
//! point must be on the curve and in the prime-order subgroup. Points that
//! aren't are rejected before any pairing is attempted.

use std::collections::HashMap;

use alloy_primitives::U256;
use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::{BigInt, PrimeField};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use ark_snark::SNARK;
use thiserror::Error;

use super::envelope::ProofEnvelope;
use crate::scheme::ProvingScheme;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by a proof system backend.
///
/// These are distinct from a proof that is well-formed and simply wrong,
/// which is `Ok(false)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofSystemError {
    /// No verifying key is loaded for the scheme.
    #[error("no verifying key loaded for proving scheme {0}")]
    MissingVerifyingKey(ProvingScheme),

    /// A curve point is malformed, off the curve, or outside the subgroup.
    #[error("proof point {0} is not a valid curve point")]
    InvalidPoint(&'static str),

    /// A public input is not a canonical scalar field element.
    #[error("public input {index} is not a canonical field element")]
    NonCanonicalInput { index: usize },

    /// The verifying key and the envelope disagree on the input count.
    #[error("verifying key expects {expected} public inputs, proof carries {actual}")]
    InputCountMismatch { expected: usize, actual: usize },

    /// A serialized verifying key could not be decoded.
    #[error("verifying key could not be decoded: {0}")]
    KeyDecoding(String),

    /// The Groth16 verification algorithm itself failed.
    #[error("groth16 backend error: {0}")]
    Backend(String),
}

/// Opaque SNARK verification capability.
pub trait ProofSystem: Send + Sync {
    /// `Ok(true)` iff the envelope is a valid proof of its public inputs
    /// under the verifying key of `scheme`.
    fn verify(&self, scheme: ProvingScheme, envelope: &ProofEnvelope)
        -> Result<bool, ProofSystemError>;
}

// ---------------------------------------------------------------------------
// Groth16 over BN254
// ---------------------------------------------------------------------------

/// Groth16 verifier holding one prepared verifying key per proving scheme.
#[derive(Default, Clone)]
pub struct Groth16ProofSystem {
    keys: HashMap<ProvingScheme, PreparedVerifyingKey<Bn254>>,
}

impl Groth16ProofSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the verifying key of `scheme`, replacing any previous one.
    pub fn insert_verifying_key(
        &mut self,
        scheme: ProvingScheme,
        vk: &VerifyingKey<Bn254>,
    ) -> Result<(), ProofSystemError> {
        let prepared = Groth16::<Bn254>::process_vk(vk)
            .map_err(|e| ProofSystemError::Backend(e.to_string()))?;
        self.keys.insert(scheme, prepared);
        Ok(())
    }

    /// Builder form of [`Self::insert_verifying_key`].
    pub fn with_verifying_key(
        mut self,
        scheme: ProvingScheme,
        vk: &VerifyingKey<Bn254>,
    ) -> Result<Self, ProofSystemError> {
        self.insert_verifying_key(scheme, vk)?;
        Ok(self)
    }

    /// Register a verifying key in arkworks compressed serialization.
    pub fn insert_verifying_key_bytes(
        &mut self,
        scheme: ProvingScheme,
        bytes: &[u8],
    ) -> Result<(), ProofSystemError> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|e| ProofSystemError::KeyDecoding(e.to_string()))?;
        self.insert_verifying_key(scheme, &vk)
    }

    /// Schemes with a loaded key.
    pub fn schemes(&self) -> impl Iterator<Item = ProvingScheme> + '_ {
        self.keys.keys().copied()
    }
}

impl std::fmt::Debug for Groth16ProofSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Groth16ProofSystem")
            .field("schemes", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProofSystem for Groth16ProofSystem {
    fn verify(
        &self,
        scheme: ProvingScheme,
        envelope: &ProofEnvelope,
    ) -> Result<bool, ProofSystemError> {
        let pvk = self
            .keys
            .get(&scheme)
            .ok_or(ProofSystemError::MissingVerifyingKey(scheme))?;

        let expected = pvk.vk.gamma_abc_g1.len().saturating_sub(1);
        if expected != envelope.input.len() {
            return Err(ProofSystemError::InputCountMismatch {
                expected,
                actual: envelope.input.len(),
            });
        }

        let proof = to_ark_proof(envelope)?;
        let inputs = envelope
            .input
            .iter()
            .enumerate()
            .map(|(index, word)| {
                Fr::from_bigint(BigInt::new(*word.as_limbs()))
                    .ok_or(ProofSystemError::NonCanonicalInput { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Groth16::<Bn254>::verify_with_processed_vk(pvk, &inputs, &proof)
            .map_err(|e| ProofSystemError::Backend(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Point conversion
// ---------------------------------------------------------------------------

fn fq(word: &U256, point: &'static str) -> Result<Fq, ProofSystemError> {
    Fq::from_bigint(BigInt::new(*word.as_limbs())).ok_or(ProofSystemError::InvalidPoint(point))
}

fn g1(coords: &[U256; 2], name: &'static str) -> Result<G1Affine, ProofSystemError> {
    if coords.iter().all(|c| c.is_zero()) {
        return Ok(G1Affine::identity());
    }
    let point = G1Affine::new_unchecked(fq(&coords[0], name)?, fq(&coords[1], name)?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ProofSystemError::InvalidPoint(name));
    }
    Ok(point)
}

fn g2(coords: &[[U256; 2]; 2], name: &'static str) -> Result<G2Affine, ProofSystemError> {
    if coords.iter().flatten().all(|c| c.is_zero()) {
        return Ok(G2Affine::identity());
    }
    // EVM order: [c1, c0].
    let x = Fq2::new(fq(&coords[0][1], name)?, fq(&coords[0][0], name)?);
    let y = Fq2::new(fq(&coords[1][1], name)?, fq(&coords[1][0], name)?);
    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ProofSystemError::InvalidPoint(name));
    }
    Ok(point)
}

fn to_ark_proof(envelope: &ProofEnvelope) -> Result<Proof<Bn254>, ProofSystemError> {
    Ok(Proof {
        a: g1(&envelope.a, "a")?,
        b: g2(&envelope.b, "b")?,
        c: g1(&envelope.c, "c")?,
    })
}

fn word<F: PrimeField<BigInt = BigInt<4>>>(element: &F) -> U256 {
    U256::from_limbs(element.into_bigint().0)
}

/// Wrap an arkworks proof and its public inputs into an envelope, using the
/// same point encoding the wallet uses.
pub fn envelope_from_proof(proof: &Proof<Bn254>, input: Vec<U256>) -> ProofEnvelope {
    let g1_words = |p: &G1Affine| [word(&p.x), word(&p.y)];
    ProofEnvelope {
        a: g1_words(&proof.a),
        b: [
            [word(&proof.b.x.c1), word(&proof.b.x.c0)],
            [word(&proof.b.y.c1), word(&proof.b.y.c0)],
        ],
        c: g1_words(&proof.c),
        input,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::lc;
    use ark_relations::r1cs::{
        ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable,
    };
    use ark_serialize::CanonicalSerialize;
    use ark_snark::CircuitSpecificSetupSNARK;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    /// Exposes each input publicly and re-commits it as a witness.
    #[derive(Clone)]
    struct EchoCircuit {
        inputs: Vec<Fr>,
    }

    impl ConstraintSynthesizer<Fr> for EchoCircuit {
        fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
            for value in self.inputs {
                let public = cs.new_input_variable(|| Ok(value))?;
                let witness = cs.new_witness_variable(|| Ok(value))?;
                cs.enforce_constraint(lc!() + public, lc!() + Variable::One, lc!() + witness)?;
            }
            Ok(())
        }
    }

    fn setup(n: usize) -> (Groth16ProofSystem, ProofEnvelope, VerifyingKey<Bn254>) {
        let mut rng = StdRng::seed_from_u64(42);
        let inputs: Vec<Fr> = (1..=n as u64).map(Fr::from).collect();
        let circuit = EchoCircuit {
            inputs: inputs.clone(),
        };
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit.clone(), &mut rng).unwrap();
        let proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();

        let words = inputs.iter().map(word).collect();
        let envelope = envelope_from_proof(&proof, words);
        let system = Groth16ProofSystem::new()
            .with_verifying_key(ProvingScheme::HydraS3, &vk)
            .unwrap();
        (system, envelope, vk)
    }

    #[test]
    fn valid_proof_verifies_through_envelope_bytes() {
        let (system, envelope, _) = setup(4);
        let decoded = ProofEnvelope::decode(&envelope.encode(), 4).unwrap();
        assert_eq!(system.verify(ProvingScheme::HydraS3, &decoded), Ok(true));
    }

    #[test]
    fn tampered_input_fails() {
        let (system, mut envelope, _) = setup(4);
        envelope.input[2] += U256::from(1u8);
        assert_eq!(system.verify(ProvingScheme::HydraS3, &envelope), Ok(false));
    }

    #[test]
    fn unknown_scheme_is_an_error() {
        let (system, envelope, _) = setup(2);
        assert_eq!(
            system.verify(ProvingScheme::HydraS2, &envelope),
            Err(ProofSystemError::MissingVerifyingKey(ProvingScheme::HydraS2))
        );
    }

    #[test]
    fn input_count_must_match_key() {
        let (system, mut envelope, _) = setup(3);
        envelope.input.push(U256::ZERO);
        assert_eq!(
            system.verify(ProvingScheme::HydraS3, &envelope),
            Err(ProofSystemError::InputCountMismatch {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let (system, mut envelope, _) = setup(2);
        envelope.a[1] += U256::from(1u8);
        assert_eq!(
            system.verify(ProvingScheme::HydraS3, &envelope),
            Err(ProofSystemError::InvalidPoint("a"))
        );
    }

    #[test]
    fn non_canonical_input_is_rejected() {
        let (system, mut envelope, _) = setup(2);
        envelope.input[0] = crate::crypto::SNARK_FIELD;
        assert_eq!(
            system.verify(ProvingScheme::HydraS3, &envelope),
            Err(ProofSystemError::NonCanonicalInput { index: 0 })
        );
    }

    #[test]
    fn inserted_key_is_registered_or_reported() {
        let (_, envelope, vk) = setup(2);
        let mut system = Groth16ProofSystem::new();
        assert_eq!(system.insert_verifying_key(ProvingScheme::HydraS1, &vk), Ok(()));
        assert_eq!(system.schemes().collect::<Vec<_>>(), vec![ProvingScheme::HydraS1]);
        assert_eq!(system.verify(ProvingScheme::HydraS1, &envelope), Ok(true));
    }

    #[test]
    fn verifying_key_loads_from_bytes() {
        let (_, envelope, vk) = setup(2);
        let mut bytes = Vec::new();
        vk.serialize_compressed(&mut bytes).unwrap();

        let mut system = Groth16ProofSystem::new();
        system
            .insert_verifying_key_bytes(ProvingScheme::HydraS2, &bytes)
            .unwrap();
        assert_eq!(system.verify(ProvingScheme::HydraS2, &envelope), Ok(true));
        assert!(system
            .insert_verifying_key_bytes(ProvingScheme::HydraS1, &bytes[1..])
            .is_err());
    }
}
