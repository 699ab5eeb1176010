//! # Response Model
//!
//! ```text
//! types.rs      the wallet's response envelope + verified records
//! matcher.rs    request/response reconciliation
//! ```

pub mod matcher;
pub mod types;

pub use matcher::{auth_satisfies, claim_satisfies, match_response, MatchedProof};
pub use types::{
    Auth, Claim, SismoConnectProof, SismoConnectResponse, VerifiedAuth, VerifiedClaim,
};
