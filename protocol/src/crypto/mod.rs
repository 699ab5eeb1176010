//! # Field Codec
//!
//! Hashing and packing of domain values into BN254 scalar field elements.
//!
//! - [`hash`] holds the primitives: Keccak-256 and `hash_to_field`.
//! - [`encoding`] builds the derived values every proof is checked against:
//!   request identifiers, accounts tree values, vault namespaces.
//!
//! Nothing in here does I/O and nothing in here can fail. Bugs in here don't
//! crash; they make every proof silently mismatch. Hence the golden vectors.

pub mod encoding;
pub mod hash;

pub use encoding::{
    accounts_tree_value, encode_namespace, encode_service_id, group_snapshot_id,
    pack_timestamp, request_identifier, signed_message_hash, vault_namespace,
};
pub use hash::{hash_to_field, keccak256, SNARK_FIELD};
