//! Self-signed keypair generation for the token-PKI exchange.

use rcgen::{CertificateParams, DnType, KeyPair};
use rsa::pkcs8::EncodePrivateKey as _;
use rsa::RsaPrivateKey;

use crate::CryptoError;

/// Default common name for generated token-exchange certificates.
pub const DEFAULT_CN: &str = "depserver";

/// Default certificate validity when the caller does not choose one. The
/// certificate only needs to survive the portal round trip.
pub const DEFAULT_VALIDITY_DAYS: i64 = 1;

const RSA_BITS: usize = 2048;

/// Generate a new RSA keypair and a self-signed X.509 certificate for it.
///
/// The certificate is what gets uploaded to the ABM/ASM/ABE portal; the
/// portal encrypts the OAuth1 token bundle to it. Returns the private key
/// and the certificate DER bytes.
pub fn self_signed_rsa_keypair(
    cn: &str,
    validity_days: i64,
) -> Result<(RsaPrivateKey, Vec<u8>), CryptoError> {
    let mut rng = rand::rngs::OsRng;
    let key = RsaPrivateKey::new(&mut rng, RSA_BITS)?;

    // rcgen signs with the imported key; it only understands PKCS#8
    let pkcs8 = key.to_pkcs8_der()?;
    let key_pair = KeyPair::try_from(pkcs8.as_bytes())?;

    let mut params = CertificateParams::default();
    params
        .distinguished_name
        .push(DnType::CommonName, cn);
    params.serial_number = Some(rcgen::SerialNumber::from(rand::random::<u64>() >> 1));
    params.not_before = time::OffsetDateTime::now_utc();
    params.not_after = params.not_before + time::Duration::days(validity_days.max(1));

    let cert = params.self_signed(&key_pair)?;
    Ok((key, cert.der().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pki;
    use x509_parser::prelude::*;

    #[test]
    fn cert_carries_cn_and_validity() {
        let (_, cert_der) = test_pki();
        let (_, cert) = X509Certificate::from_der(cert_der).unwrap();

        let cn = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|a| a.as_str().ok())
            .unwrap();
        assert_eq!(cn, "depserver-test");

        // self-signed: issuer equals subject
        assert_eq!(cert.issuer(), cert.subject());

        let validity = cert.validity();
        let lifetime = validity.not_after.timestamp() - validity.not_before.timestamp();
        assert_eq!(lifetime, 24 * 60 * 60);

        assert!(!cert.raw_serial().is_empty());
    }
}
