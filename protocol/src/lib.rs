// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sismo Connect Protocol: Server-Side Verifier
//!
//! An application asks a user to prove things about themselves (membership
//! in a group with some value, ownership of an account, a signature over a
//! message) and gets back zero-knowledge proofs it must check without ever
//! learning which account produced them. This crate builds the request the
//! application sends and verifies the response the wallet returns.
//!
//! ## Architecture
//!
//! - **crypto**: keccak, hash-to-field and the identifier encodings every
//!   proof's public inputs are recomputed from.
//! - **zkp**: the ABI proof envelope and the opaque proof-system capability
//!   (Groth16 over BN254).
//! - **request**: claim, auth and signature requests, normalized by a
//!   builder into immutable values.
//! - **response**: the wallet's response model and the matcher reconciling
//!   it with the request.
//! - **scheme**: one verifier per circuit generation behind a shared check
//!   pipeline.
//! - **registry**: the commitment mapper and available-roots capabilities,
//!   with timeouts and caching.
//! - **verifier**: the entry point, its error taxonomy and its result.
//! - **config**: protocol constants and [`VerifierConfig`].
//!
//! ## Ground Rules
//!
//! 1. Server-side values (appId, namespace, registry answers) are the
//!    reference; the response never vouches for itself.
//! 2. Cheap checks first, the pairing check last.
//! 3. All or nothing: one failing proof fails the whole response.

pub mod config;
pub mod crypto;
pub mod registry;
pub mod request;
pub mod response;
pub mod scheme;
pub mod serde_utils;
pub mod verifier;
pub mod zkp;

pub use config::{VerifierConfig, SISMO_CONNECT_VERSION};
pub use request::{SismoConnectRequest, SismoConnectRequestInput};
pub use response::SismoConnectResponse;
pub use verifier::{SismoConnectVerifiedResult, SismoConnectVerifier, VerificationError};
