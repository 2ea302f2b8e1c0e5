// Wire contract per spec.md §4.1/§6: NextHash is a new 32-byte sub-field of
// SignatureInfo; two new signature-type codepoints anchor the hash chain.
//! Signature metadata carried by every segment, including the `NextHash`
//! hash-chain extension.

use crate::error::{CoreError, Result};
use crate::tlv::Tlv;

/// Length in bytes of the `NextHash` field and of a hash-chain signature
/// value (both are raw SHA-256-sized digests/ECDSA-chain anchors).
pub const NEXT_HASH_LEN: usize = 32;

const SIGNATURE_INFO_TLV_TYPE: u64 = 0x16;
const SIGNATURE_TYPE_TLV_TYPE: u64 = 0x1b;
const NEXT_HASH_TLV_TYPE: u64 = 0x91; // arbitrary codepoint for NextHash (901 decimal family, see HashContent below)

/// The experimental `HashContent` container from §6: type 900, with an
/// inner `NextHash` (901) alongside the application `Content`. Not wired
/// into the primary fetch path (§9 Open Question); provided as an
/// alternative placement of `NextHash` for peers that carry it in content
/// rather than signature-info.
pub const HASH_CONTENT_TLV_TYPE: u64 = 900;
pub const HASH_CONTENT_NEXT_HASH_TLV_TYPE: u64 = 901;

/// Signature-type codepoints. The two hash-chain variants are new
/// allocations per §4.1; the others are representative standard NDN types
/// included so `SignatureType` round-trips through unrelated segments
/// without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureType {
    Sha256WithRsa,
    Sha256WithEcdsa,
    DigestSha256,
    HashChainSha256,
    HashChainEcdsa,
    Other(u64),
}

impl SignatureType {
    fn to_code(self) -> u64 {
        match self {
            SignatureType::Sha256WithRsa => 1,
            SignatureType::Sha256WithEcdsa => 3,
            SignatureType::DigestSha256 => 0,
            SignatureType::HashChainSha256 => 200,
            SignatureType::HashChainEcdsa => 201,
            SignatureType::Other(code) => code,
        }
    }

    fn from_code(code: u64) -> Self {
        match code {
            1 => SignatureType::Sha256WithRsa,
            3 => SignatureType::Sha256WithEcdsa,
            0 => SignatureType::DigestSha256,
            200 => SignatureType::HashChainSha256,
            201 => SignatureType::HashChainEcdsa,
            other => SignatureType::Other(other),
        }
    }

    /// True for the two signature types that participate in the hash
    /// chain contract (§4.3: "If signature-type ∉ {...} → accept as-is").
    pub fn is_hash_chain(self) -> bool {
        matches!(
            self,
            SignatureType::HashChainSha256 | SignatureType::HashChainEcdsa
        )
    }
}

/// Metadata describing how a segment is signed, including the optional
/// `NextHash` sub-field that binds this segment's signature to the next
/// segment's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub signature_type: SignatureType,
    pub key_locator: Option<Vec<u8>>,
    /// Raw signature bytes of the next-numbered segment, or `None` for
    /// non-chain signature types. Present with all-zero bytes on the final
    /// segment per the §4.1 algorithm.
    pub next_hash: Option<[u8; NEXT_HASH_LEN]>,
}

impl SignatureInfo {
    pub fn new(signature_type: SignatureType) -> Self {
        Self {
            signature_type,
            key_locator: None,
            next_hash: None,
        }
    }

    pub fn with_next_hash(mut self, next_hash: [u8; NEXT_HASH_LEN]) -> Self {
        self.next_hash = Some(next_hash);
        self
    }

    pub fn zero_next_hash() -> [u8; NEXT_HASH_LEN] {
        [0u8; NEXT_HASH_LEN]
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut inner = Vec::new();
        inner.extend(
            Tlv::new(
                SIGNATURE_TYPE_TLV_TYPE,
                self.signature_type.to_code().to_be_bytes().to_vec(),
            )
            .encode(),
        );
        if let Some(locator) = &self.key_locator {
            inner.extend(Tlv::new(0x1c, locator.clone()).encode());
        }
        if let Some(next_hash) = self.next_hash {
            inner.extend(Tlv::new(NEXT_HASH_TLV_TYPE, next_hash.to_vec()).encode());
        }
        Tlv::new(SIGNATURE_INFO_TLV_TYPE, inner).encode()
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (tlv, consumed) = Tlv::decode(buf)?;
        if tlv.typ != SIGNATURE_INFO_TLV_TYPE {
            return Err(CoreError::Decode(format!(
                "expected SignatureInfo TLV type {SIGNATURE_INFO_TLV_TYPE}, got {}",
                tlv.typ
            )));
        }
        let mut signature_type = SignatureType::DigestSha256;
        let mut key_locator = None;
        let mut next_hash = None;
        let mut offset = 0usize;
        while offset < tlv.value.len() {
            let (field, used) = Tlv::decode(&tlv.value[offset..])?;
            offset += used;
            match field.typ {
                t if t == SIGNATURE_TYPE_TLV_TYPE => {
                    let mut padded = [0u8; 8];
                    let len = field.value.len().min(8);
                    padded[8 - len..].copy_from_slice(&field.value[field.value.len() - len..]);
                    signature_type = SignatureType::from_code(u64::from_be_bytes(padded));
                }
                0x1c => key_locator = Some(field.value),
                t if t == NEXT_HASH_TLV_TYPE => {
                    if field.value.len() != NEXT_HASH_LEN {
                        return Err(CoreError::InvalidNextHashLength(field.value.len()));
                    }
                    let mut bytes = [0u8; NEXT_HASH_LEN];
                    bytes.copy_from_slice(&field.value);
                    next_hash = Some(bytes);
                }
                _ => {}
            }
        }
        Ok((
            SignatureInfo {
                signature_type,
                key_locator,
                next_hash,
            },
            consumed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_info_roundtrip_with_next_hash() {
        let info = SignatureInfo::new(SignatureType::HashChainSha256)
            .with_next_hash([7u8; NEXT_HASH_LEN]);
        let encoded = info.encode();
        let (decoded, consumed) = SignatureInfo::decode(&encoded).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(consumed, encoded.len());
        assert!(decoded.signature_type.is_hash_chain());
    }

    #[test]
    fn signature_info_roundtrip_without_next_hash() {
        let info = SignatureInfo::new(SignatureType::Sha256WithEcdsa);
        let encoded = info.encode();
        let (decoded, _) = SignatureInfo::decode(&encoded).unwrap();
        assert_eq!(decoded.next_hash, None);
        assert!(!decoded.signature_type.is_hash_chain());
    }

    #[test]
    fn chain_head_uses_hashchain_ecdsa() {
        // §9: "this specification normalizes to SignatureHashChainEcdsa"
        let info = SignatureInfo::new(SignatureType::HashChainEcdsa);
        assert!(info.signature_type.is_hash_chain());
    }
}
