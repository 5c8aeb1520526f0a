//! depgate
//!
//! A proxy and middleware layer in front of Apple's Device Enrollment
//! Program (DEP) API. Per DEP name it manages the token-exchange PKI, the
//! OAuth1 token bundle, short-lived DEP session tokens, a transparently
//! authenticated DEP client, and an incremental device syncer/assigner.
//!
//! The library crates under `crates/dep/` carry the functionality; this
//! crate glues them into the `depgate-server`, `depgate-syncer`, and
//! `depgate-bypasscode` binaries.

pub mod storage;
