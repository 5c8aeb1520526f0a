//! Apple Activation Lock Bypass Codes.
//!
//! A bypass code is a 16-byte secret with two derived forms: a
//! dash-separated "human readable" string over a 32-symbol alphabet, and a
//! PBKDF2 hash submitted to Apple when locking or unlocking a device.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

/// Character set for the dash-separated "human readable" bypass code string.
/// These 32 characters fit within a 5 bit encoding and are looked up by
/// index position.
const CHARSET: &[u8] = b"0123456789ACDEFGHJKLMNPQRTUVWXYZ";

/// Indexes into the 26-symbol stream before which a dash is written.
const DASH_POSITIONS: [usize; 5] = [5, 10, 14, 18, 22];

const PBKDF2_SALT: [u8; 4] = [0, 0, 0, 0];
const PBKDF2_ITERATIONS: u32 = 50_000;

/// Bypass code encoding and decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum AlbcError {
    /// The decoded or provided data is not 16 bytes.
    #[error("invalid length: {0}")]
    InvalidLength(usize),

    /// A value exceeds the source bit width during repacking.
    #[error("invalid data range: data[{index}]={value} (frombits={frombits})")]
    InvalidDataRange { index: usize, value: u8, frombits: u8 },
}

/// The "raw" form of an Apple Activation Lock Bypass Code.
///
/// See <https://developer.apple.com/documentation/devicemanagement/creating-and-using-bypass-codes>
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BypassCode(pub [u8; 16]);

impl BypassCode {
    /// Create a new random bypass code from the OS RNG.
    pub fn new() -> Self {
        let mut buf = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        Self(buf)
    }

    /// Create a bypass code from the first 16 bytes of `b`.
    pub fn from_bytes(b: &[u8]) -> Result<Self, AlbcError> {
        if b.len() < 16 {
            return Err(AlbcError::InvalidLength(b.len()));
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&b[..16]);
        Ok(Self(out))
    }

    /// Decode a dash-separated "human readable" bypass code.
    ///
    /// Any rune outside the bypass code alphabet (dashes, whitespace) is
    /// skipped rather than rejected.
    pub fn from_code(code: &str) -> Result<Self, AlbcError> {
        let mut bc5 = Vec::with_capacity(26);
        for r in code.chars() {
            if let Some(i) = CHARSET.iter().position(|&c| c as char == r) {
                bc5.push(i as u8);
            }
        }

        let ret = convert_bits(&bc5, 5, 8)?;
        if ret.len() != 16 {
            return Err(AlbcError::InvalidLength(ret.len()));
        }

        let mut out = [0u8; 16];
        out.copy_from_slice(&ret);
        Ok(Self(out))
    }

    /// Generate the dash-separated "human readable" form.
    pub fn code(&self) -> String {
        // 8->5 of 16 bytes cannot fail: every input value fits 8 bits
        let bc5 = convert_bits(&self.0, 8, 5).expect("8->5 repack of 16 bytes");

        let mut dashes = DASH_POSITIONS.iter().peekable();
        let mut out = String::with_capacity(bc5.len() + DASH_POSITIONS.len());
        for (i, &p) in bc5.iter().enumerate() {
            if dashes.peek().is_some_and(|&&pos| pos == i) {
                out.push('-');
                dashes.next();
            }
            out.push(CHARSET[p as usize] as char);
        }
        out
    }

    /// Generate the hex encoded PBKDF2 derived hash of the code.
    ///
    /// This hash is used for e.g. activation locking and unlocking the
    /// device using Apple APIs. Apple describes the hash as SHA256 with a
    /// static salt and fixed iterations.
    pub fn hash(&self) -> String {
        let mut out = [0u8; 32];
        pbkdf2_hmac::<Sha256>(&self.0, &PBKDF2_SALT, PBKDF2_ITERATIONS, &mut out);
        hex::encode(out)
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl Default for BypassCode {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BypassCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BypassCode({})", hex::encode(self.0))
    }
}

/// Convert binary data from one bits-per-byte arrangement to another.
/// Ex: re-arrange 8 bit bytes to groups of 5 when converting to base32.
///
/// The remainder handling is where Apple differs from bech32: when
/// expanding back to wider groups the trailing partial group is packed
/// into the tail of the last output byte instead of appended. Only the
/// 5<->8 pairings are supported; the tail arithmetic is wrong for
/// frombits of 6 or 7.
fn convert_bits(data: &[u8], frombits: u8, tobits: u8) -> Result<Vec<u8>, AlbcError> {
    debug_assert!(matches!((frombits, tobits), (5, 8) | (8, 5)));

    let mut ret: Vec<u8> = Vec::new();
    let mut acc: u32 = 0;
    let mut bits: u8 = 0;
    let maxv: u8 = ((1u16 << tobits) - 1) as u8;
    for (index, &value) in data.iter().enumerate() {
        if frombits < 8 && value >> frombits != 0 {
            return Err(AlbcError::InvalidDataRange { index, value, frombits });
        }
        acc = (acc << frombits) | u32::from(value);
        bits += frombits;
        while bits >= tobits {
            bits -= tobits;
            ret.push((acc >> bits) as u8 & maxv);
        }
    }

    if bits > 0 {
        // zero out most significant bits of the remainder value
        let remainder_mask = 0xffu8 << bits;
        let remainder_byte = (acc as u8) & !remainder_mask & maxv;

        if tobits > frombits {
            // re-pack the remainder value into the last output byte
            let shift = frombits.wrapping_sub(bits);
            let low_mask = if shift >= 8 { 0 } else { 0xffu8 << shift };
            let last = *ret.last().ok_or(AlbcError::InvalidLength(0))?;
            let last_masked = (last << bits) & !low_mask & remainder_mask;
            let tail = ret.len() - 1;
            ret[tail] = (last & remainder_mask) | last_masked | remainder_byte;
        } else {
            ret.push(remainder_byte);
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vector {
        raw: &'static str,
        code: &'static str,
        hash: &'static str,
    }

    const VECTORS: &[Vector] = &[
        Vector {
            raw: "00000000000000000000000000000000",
            code: "00000-00000-0000-0000-0000-0000",
            hash: "deab860d28deb5b7121d6d8fcf0f78e1471756d1b2c566c03277c23ea8930b4f",
        },
        Vector {
            raw: "1ea841db5edfafe6075b5ae0d845d254",
            code: "3UM43-PUYVY-QYD1-UVCC-HEHJ-FKA4",
            hash: "6ab40d5eabe7218ec04182f461005600c7e3426bddd82cdb405bde9a1e0014b5",
        },
        Vector {
            raw: "44ebe63375969fec2da67e87e7317946",
            code: "8LNYD-DVNKU-GYRC-E6GU-3YFD-CT86",
            hash: "c1968cb4c013ea893f1922bb5c39f81e35012c0bd9ce3c01cc2a05873a2499e6",
        },
        Vector {
            raw: "cb84798c3ca85a674194550a2e96aed8",
            code: "TF27L-31WN1-E6FH-DMAM-52X5-NFV0",
            hash: "23cf8b7873425fd8efe31dc5b6ab9c357eb98a2a59c82ea1084ca8af58cc480a",
        },
        Vector {
            raw: "89195c9b79178736203bd9d591ea7c0f",
            code: "J4DNT-6VT2Y-3LD8-1VV7-AT3U-LW17",
            hash: "59b9b3fa9ec4b806612b8b1fe6f12fcc3903156a58bcf4cae53a8a78dad563d3",
        },
        Vector {
            raw: "60110f362c6f7a90dd1ef2845f32482f",
            code: "D08HY-EJDEX-X91Q-8YYA-25YD-K857",
            hash: "4d19162b50dd61536d72c0662dce9d533a1f46137d6db97501ceb171fcbae7dd",
        },
        Vector {
            raw: "9653b0f9b495d8fab25e728ff041b0f1",
            code: "KT9V1-YEMKQ-DGND-KYFA-7Z0H-EHY1",
            hash: "5893831ab50670e96f5d245a4f597c86eeffd16aac3ee5bb1c2251affb004a33",
        },
        Vector {
            raw: "0de305a24090fc54b61ed7e9e39569fb",
            code: "1QJHC-8K0K3-Y59E-HYUZ-MY75-C9Z3",
            hash: "1db2f16ad21a135b9c2523725e836c0b0528fec83c195c6ecdf8761fd877889a",
        },
        Vector {
            raw: "f398ef9199e9f0aefea0e782ab8b61a9",
            code: "YFDFZ-4DTX7-RAXZ-N0WY-1AQ2-V1N1",
            hash: "7c7715d092a5cfcd16a6037555e11e4fa53edda9cda4d8464d58ef39ba9b5b0f",
        },
        Vector {
            raw: "bd9e6a463a19ac706d379394bf97747a",
            code: "QPG6M-JJU36-P70V-9QKF-ACZ5-VMG2",
            hash: "7cdf895759d090eb9d3ed833d0ed7d5d5b00a11a719293f44aa7741ffbe79f6a",
        },
    ];

    #[test]
    fn known_vectors() {
        for v in VECTORS {
            let b = hex::decode(v.raw).unwrap();
            let bc = BypassCode::from_bytes(&b).unwrap();

            assert_eq!(bc.code(), v.code, "code for {}", v.raw);
            assert_eq!(bc.hash(), v.hash, "hash for {}", v.raw);

            // re-decode the code string back to the raw bytes
            let bc2 = BypassCode::from_code(v.code).unwrap();
            assert_eq!(bc.as_bytes(), bc2.as_bytes(), "roundtrip for {}", v.raw);
        }
    }

    #[test]
    fn convert_bits_roundtrip() {
        for v in VECTORS {
            let b = hex::decode(v.raw).unwrap();
            let b5 = convert_bits(&b, 8, 5).unwrap();
            assert_eq!(b5.len(), 26);
            let b8 = convert_bits(&b5, 5, 8).unwrap();
            assert_eq!(b, b8);
        }
    }

    #[test]
    fn random_roundtrip() {
        for _ in 0..64 {
            let bc = BypassCode::new();
            let decoded = BypassCode::from_code(&bc.code()).unwrap();
            assert_eq!(bc.as_bytes(), decoded.as_bytes());
        }
    }

    #[test]
    fn decode_skips_foreign_runes() {
        // whitespace and dashes are ignored by the decoder
        let bc = BypassCode::from_code("3UM43-PUYVY-QYD1-UVCC-HEHJ-FKA4").unwrap();
        let bc2 = BypassCode::from_code(" 3UM43 PUYVY QYD1UVCC HEHJFKA4 ").unwrap();
        assert_eq!(bc.as_bytes(), bc2.as_bytes());

        // lowercase letters are not in the alphabet, so an all-lowercase
        // group drops out and the decoded length no longer fits
        assert!(BypassCode::from_code("3UM43-puyvy-QYD1-UVCC-HEHJ-FKA4").is_err());
        assert!(BypassCode::from_code("3UM43").is_err());
    }

    #[test]
    fn decode_empty_is_error() {
        assert!(matches!(
            BypassCode::from_code(""),
            Err(AlbcError::InvalidLength(0))
        ));
        // nothing from the alphabet at all
        assert!(BypassCode::from_code("----  ----").is_err());
    }

    #[test]
    fn from_bytes_short_is_error() {
        assert!(matches!(
            BypassCode::from_bytes(&[0u8; 15]),
            Err(AlbcError::InvalidLength(15))
        ));
        // extra bytes beyond 16 are ignored
        let bc = BypassCode::from_bytes(&[0xabu8; 20]).unwrap();
        assert_eq!(bc.as_bytes(), &[0xabu8; 16]);
    }

    #[test]
    fn hash_shape() {
        let bc = BypassCode::new();
        let h = bc.hash();
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(h, bc.hash());
    }
}
