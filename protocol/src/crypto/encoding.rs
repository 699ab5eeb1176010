//! # Identifier Encoding
//!
//! The proving circuits never see a group id or a namespace directly. They
//! see field elements derived from them, and a proof is only valid for the
//! exact field elements it was generated against. This module reproduces
//! those derivations so the verifier can recompute them from the request
//! and compare.
//!
//! Every function here is pure. Every layout here is `abi.encodePacked`
//! of fixed-width big-endian words:
//!
//! ```text
//! group snapshot id   = groupId (16) ‖ timestamp (16)
//! accounts tree value = H(group snapshot id)
//! service id          = appId (16)   ‖ high 16 bytes of H(namespace)
//! request identifier  = H(service id ‖ accounts tree value (32))
//! vault namespace     = H(appId (16) ‖ 0 (16))
//! ```
//!
//! where `H` is [`hash_to_field`]. Get any byte of this wrong and nothing
//! breaks loudly; proofs just stop matching. The golden-vector tests at the
//! bottom are the authority.

use alloy_primitives::U256;

use super::hash::{hash_to_field, hash_to_field_multi};
use crate::config::LATEST_TIMESTAMP_LABEL;
use crate::request::{AppId, GroupId, GroupTimestamp};

/// Encode a group timestamp as the 128-bit value the circuits use.
///
/// A numeric timestamp is itself. `"latest"` is the ASCII string
/// right-padded with zero bytes to 16 bytes, which is what
/// `bytes16(bytes("latest"))` yields on chain.
pub fn pack_timestamp(timestamp: &GroupTimestamp) -> u128 {
    match timestamp {
        GroupTimestamp::At(ts) => *ts,
        GroupTimestamp::Latest => {
            let mut padded = [0u8; 16];
            let label = LATEST_TIMESTAMP_LABEL.as_bytes();
            padded[..label.len()].copy_from_slice(label);
            u128::from_be_bytes(padded)
        }
    }
}

/// `groupId ‖ packedTimestamp`, the identifier of one group snapshot.
pub fn group_snapshot_id(group_id: &GroupId, timestamp: &GroupTimestamp) -> [u8; 32] {
    concat_halves(group_id.to_be_bytes(), pack_timestamp(timestamp).to_be_bytes())
}

/// Field element committing to a group snapshot; the leaf value of the
/// accounts tree the proof was generated against.
pub fn accounts_tree_value(group_id: &GroupId, timestamp: &GroupTimestamp) -> U256 {
    hash_to_field(&group_snapshot_id(group_id, timestamp))
}

/// The high 16 bytes of `hash_to_field(namespace)` as a 32-byte word.
pub fn encode_namespace(namespace: &str) -> [u8; 16] {
    let word = hash_to_field(namespace.as_bytes()).to_be_bytes::<32>();
    let mut high = [0u8; 16];
    high.copy_from_slice(&word[..16]);
    high
}

/// `appId ‖ encode_namespace(namespace)`.
pub fn encode_service_id(app_id: &AppId, namespace: &str) -> [u8; 32] {
    concat_halves(app_id.to_be_bytes(), encode_namespace(namespace))
}

/// The request identifier a claim proof must carry.
///
/// Binds the application, the namespace and the group snapshot together.
/// The proof identifier (nullifier) is derived from it inside the circuit,
/// so the same vault proving the same claim for two different apps yields
/// two unlinkable nullifiers.
pub fn request_identifier(
    app_id: &AppId,
    group_id: &GroupId,
    timestamp: &GroupTimestamp,
    namespace: &str,
) -> U256 {
    let service_id = encode_service_id(app_id, namespace);
    let tree_value = accounts_tree_value(group_id, timestamp).to_be_bytes::<32>();
    hash_to_field_multi(&[&service_id, &tree_value])
}

/// Per-application vault namespace.
pub fn vault_namespace(app_id: &AppId) -> U256 {
    hash_to_field(&concat_halves(app_id.to_be_bytes(), [0u8; 16]))
}

/// The `extraData` public input expected for a signed message.
pub fn signed_message_hash(message: &[u8]) -> U256 {
    hash_to_field(message)
}

fn concat_halves(high: [u8; 16], low: [u8; 16]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[..16].copy_from_slice(&high);
    word[16..].copy_from_slice(&low);
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NAMESPACE;
    use crate::serde_utils::to_hex_word;

    fn app_id() -> AppId {
        "0xc6acc12e813a48e6a8151ce405551123".parse().unwrap()
    }

    fn group_id() -> GroupId {
        "0xc4c12da439e843268db139408f1d5573".parse().unwrap()
    }

    fn hex(value: U256) -> String {
        to_hex_word(&value)
    }

    #[test]
    fn latest_packs_as_right_padded_ascii() {
        assert_eq!(
            pack_timestamp(&GroupTimestamp::Latest),
            0x6c617465737400000000000000000000
        );
        assert_eq!(pack_timestamp(&GroupTimestamp::At(1_700_000_000)), 1_700_000_000);
    }

    #[test]
    fn snapshot_id_layout() {
        let snapshot = group_snapshot_id(&group_id(), &GroupTimestamp::At(5));
        assert_eq!(&snapshot[..16], &group_id().to_be_bytes());
        assert_eq!(snapshot[31], 5);
        assert!(snapshot[16..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn namespace_is_high_half_of_hashed_field_element() {
        // keccak256("main") starts with b8e2054f..., which is above r; the
        // reduced element starts with 27b519f6...
        assert_eq!(
            hex(hash_to_field(b"main")),
            "0x27b519f6e6fc42eaba9951aaf2af1fe812103f2ebf14cf070e4927a24dbf29a4"
        );
        assert_eq!(
            hex::encode(encode_namespace("main")),
            "27b519f6e6fc42eaba9951aaf2af1fe8"
        );
        assert_eq!(
            hex::encode(encode_namespace("other")),
            "26b60b6bee32c2d284da42d089b79564"
        );
        let service = encode_service_id(&app_id(), "main");
        assert_eq!(
            hex::encode(service),
            "c6acc12e813a48e6a8151ce40555112327b519f6e6fc42eaba9951aaf2af1fe8"
        );
    }

    #[test]
    fn request_identifier_hashes_service_id_with_tree_value() {
        let ts = GroupTimestamp::At(42);
        let mut preimage = encode_service_id(&app_id(), "main").to_vec();
        preimage.extend_from_slice(&accounts_tree_value(&group_id(), &ts).to_be_bytes::<32>());
        assert_eq!(
            request_identifier(&app_id(), &group_id(), &ts, "main"),
            hash_to_field(&preimage)
        );
    }

    #[test]
    fn golden_request_identifier_latest() {
        let id = request_identifier(
            &app_id(),
            &group_id(),
            &GroupTimestamp::Latest,
            DEFAULT_NAMESPACE,
        );
        assert_eq!(
            hex(id),
            "0x2686b6473537b0af7bbfa0963e1e7c6ebe64e8aae50de404416f5a95e1d37e32"
        );
    }

    #[test]
    fn golden_request_identifier_numeric_timestamp() {
        let id = request_identifier(
            &app_id(),
            &group_id(),
            &GroupTimestamp::At(1_700_000_000),
            DEFAULT_NAMESPACE,
        );
        assert_eq!(
            hex(id),
            "0x2a01666f3cb68c971e9905b22fc639776dc6bc1107e24f51da531bc647b6efa1"
        );
    }

    #[test]
    fn golden_request_identifier_other_namespace() {
        let id = request_identifier(&app_id(), &group_id(), &GroupTimestamp::Latest, "other");
        assert_eq!(
            hex(id),
            "0x1048036223c5a5eaf9bff314ec7ce18491b9d692e97db97a6983054674848f99"
        );
    }

    #[test]
    fn golden_accounts_tree_values() {
        assert_eq!(
            hex(accounts_tree_value(&group_id(), &GroupTimestamp::Latest)),
            "0x2e0fb469125bf0102661aad35d7d0d2271ed526d24d63e440742b3c2c27b8162"
        );
        assert_eq!(
            hex(accounts_tree_value(&group_id(), &GroupTimestamp::At(1_700_000_000))),
            "0x120c0f1afcb82d5b01eacfd7cbf41fc0b987666a8a8ae67716b4472f8d2572e6"
        );
    }

    #[test]
    fn golden_vault_namespace() {
        assert_eq!(
            hex(vault_namespace(&app_id())),
            "0x0b4f22cea10065978660f14a0b375b3f7bfd2f9cb58c67e01120ad5aeff34fde"
        );
    }

    #[test]
    fn golden_signed_message_hash() {
        assert_eq!(
            hex(signed_message_hash(b"hello")),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn identifiers_are_deterministic() {
        let a = request_identifier(&app_id(), &group_id(), &GroupTimestamp::Latest, "main");
        let b = request_identifier(&app_id(), &group_id(), &GroupTimestamp::Latest, "main");
        assert_eq!(a, b);
    }

    #[test]
    fn every_input_changes_the_request_identifier() {
        let base = request_identifier(&app_id(), &group_id(), &GroupTimestamp::At(1), "main");

        let other_app: AppId = "0xc6acc12e813a48e6a8151ce405551124".parse().unwrap();
        let other_group: GroupId = "0xc4c12da439e843268db139408f1d5574".parse().unwrap();

        let variants = [
            request_identifier(&other_app, &group_id(), &GroupTimestamp::At(1), "main"),
            request_identifier(&app_id(), &other_group, &GroupTimestamp::At(1), "main"),
            request_identifier(&app_id(), &group_id(), &GroupTimestamp::At(2), "main"),
            request_identifier(&app_id(), &group_id(), &GroupTimestamp::Latest, "main"),
            request_identifier(&app_id(), &group_id(), &GroupTimestamp::At(1), "maim"),
        ];
        for (i, variant) in variants.iter().enumerate() {
            assert_ne!(*variant, base, "variant {i} collided with the base identifier");
        }
    }
}
