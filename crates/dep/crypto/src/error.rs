//! Crypto error types.

/// Errors from PKI, envelope, and JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// A PEM block carried an unexpected tag.
    #[error("PEM type is not {expected}: got {found}")]
    PemType { expected: &'static str, found: String },

    #[error("parsing PEM: {0}")]
    Pem(#[from] ::pem::PemError),

    #[error("PKCS#1 key encoding: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    #[error("PKCS#8 key encoding: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    #[error("RSA operation: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("building certificate: {0}")]
    Certificate(#[from] rcgen::Error),

    #[error("DER encoding: {0}")]
    Der(#[from] der::Error),

    #[error("parsing certificate: {0}")]
    X509(String),

    /// The request body is neither BER/DER nor an S/MIME entity with a
    /// base64 payload.
    #[error("not an S/MIME enveloped message")]
    Smime,

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// No recipient info matches the staged certificate's issuer and
    /// serial number.
    #[error("no recipient matches the staged certificate")]
    RecipientMismatch,

    #[error("unsupported key encryption algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("unsupported content encryption algorithm: {0}")]
    UnsupportedContentAlgorithm(String),

    #[error("envelope carries no encrypted content")]
    MissingContent,

    #[error("content decryption: {0}")]
    ContentDecrypt(String),

    /// A required JWT claim was empty.
    #[error("empty claim parameter(s)")]
    EmptyClaim,

    #[error("signing JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
