//! # Request Model
//!
//! What an application asks a user to prove: claims (group membership with
//! a value comparator), auths (account ownership), and optionally a signed
//! message.
//!
//! ```text
//! types.rs      normalized, immutable request types + identifiers
//! builder.rs    partial inputs and the normalizing build step
//! payload.rs    the JSON payload handed to the wallet
//! error.rs      RequestError
//! ```

pub mod builder;
pub mod error;
pub mod payload;
pub mod types;

pub use builder::{
    AuthRequestInput, ClaimRequestInput, SignatureRequestInput, SismoConnectRequestInput,
};
pub use error::RequestError;
pub use payload::{ConnectRequestPayload, DevConfig, DevGroup};
pub use types::{
    AppId, AuthRequest, AuthType, Bytes16, Bytes16Error, ClaimRequest, ClaimType, GroupId,
    GroupTimestamp, RequestedMessage, SignatureRequest, SismoConnectRequest,
};
