//! DEP Token-Exchange Crypto
//!
//! The trust material behind one DEP name: the self-issued RSA keypair
//! uploaded to the ABM/ASM/ABE portal, decryption of the CMS-enveloped
//! OAuth1 token bundle the portal returns, and the MAID access-management
//! JWT signed with the exchanged key.

mod envelope;
mod error;
mod keypair;
mod maidjwt;
mod pem;

pub use envelope::*;
pub use error::*;
pub use keypair::*;
pub use maidjwt::*;
pub use pem::*;

/// Shared keypair for the test suites; RSA generation is too slow to
/// repeat per test.
#[cfg(test)]
pub(crate) fn test_pki() -> (&'static rsa::RsaPrivateKey, &'static Vec<u8>) {
    use std::sync::OnceLock;
    static PKI: OnceLock<(rsa::RsaPrivateKey, Vec<u8>)> = OnceLock::new();
    let (key, cert) = PKI.get_or_init(|| {
        self_signed_rsa_keypair("depserver-test", 1).expect("test keypair")
    });
    (key, cert)
}
