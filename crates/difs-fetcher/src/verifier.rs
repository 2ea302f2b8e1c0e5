// Transcribed from spec.md §4.3 ("Hash-chain verifier"); the mode switch
// supplements §9's Open Question ("implementers should expose both
// behaviors under a feature switch") per SPEC_FULL §3.
//! Checks that each validated segment's signature anchors the previous
//! segment's `NextHash` field.

use crate::error::FetchError;
use difs_crypto::hash::link_anchor;
use difs_types::Data;
use std::collections::HashMap;

/// §9 Open Question: the anchored-count heuristic is the default. Strict
/// mode additionally checks every out-of-order segment against its real
/// predecessor's recorded `next_hash` (not just segments that happen to
/// arrive in `prev + 1` order), for compatibility with older peers that
/// expect the stricter revision of the verifier found in `original_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashChainVerifyMode {
    #[default]
    Anchored,
    Strict,
}

pub struct HashChainVerifier {
    mode: HashChainVerifyMode,
    prev_segment_number: Option<u64>,
    expected_signature_bytes: Option<[u8; 32]>,
    verified_count: u64,
    /// Strict mode only: every hash-chain segment's own `next_hash`, keyed
    /// by its segment number, so a later-arriving predecessor can still be
    /// checked against the successor it claims to anchor regardless of
    /// arrival order.
    next_hash_by_segment: HashMap<u64, [u8; 32]>,
}

impl HashChainVerifier {
    pub fn new(mode: HashChainVerifyMode) -> Self {
        Self {
            mode,
            prev_segment_number: None,
            expected_signature_bytes: None,
            verified_count: 0,
            next_hash_by_segment: HashMap::new(),
        }
    }

    pub fn verified_count(&self) -> u64 {
        self.verified_count
    }

    /// Verifies `segment` (whose segment number is `segment_no`) against
    /// the chain state accumulated so far. Returns `Ok(true)` if this
    /// segment advanced the chain (i.e. was in-order and anchored),
    /// `Ok(false)` if it was accepted but out-of-contract or
    /// out-of-order, and `Err` if the chain invariant was violated.
    pub fn verify(&mut self, segment_no: u64, segment: &Data) -> Result<bool, FetchError> {
        let anchored = if !segment.signature_info.signature_type.is_hash_chain() {
            // Outside the chain contract: accept as-is, don't touch state.
            false
        } else if segment_no == 0 {
            self.verified_count += 1;
            true
        } else if Some(segment_no) == self.prev_segment_number.map(|p| p + 1) {
            let actual = link_anchor(&segment.signature_value);
            let matches = self.expected_signature_bytes == Some(actual);
            if !matches {
                return Err(FetchError::HashChainError("Failure hash key error".to_string()));
            }
            self.verified_count += 1;
            true
        } else {
            // Out-of-order relative to prev_segment_number: Anchored mode
            // accepts tentatively and leaves the counter untouched. Strict
            // mode still demands that *this* segment's own signature anchor
            // the previous segment it claims to follow (segment_no - 1),
            // independent of arrival order, by checking against a
            // previously-recorded `next_hash` rather than the rolling
            // `expected_signature_bytes` cursor (which only tracks the last
            // segment seen, not an arbitrary predecessor).
            if self.mode == HashChainVerifyMode::Strict {
                if let Some(expected) = segment_no
                    .checked_sub(1)
                    .and_then(|p| self.next_hash_by_segment.get(&p).copied())
                {
                    let actual = link_anchor(&segment.signature_value);
                    if expected != actual {
                        return Err(FetchError::HashChainError("Failure hash key error".to_string()));
                    }
                }
            }
            false
        };

        if segment.signature_info.signature_type.is_hash_chain() {
            self.prev_segment_number = Some(segment_no);
            self.expected_signature_bytes = segment.signature_info.next_hash;
            if self.mode == HashChainVerifyMode::Strict {
                if let Some(next_hash) = segment.signature_info.next_hash {
                    self.next_hash_by_segment.insert(segment_no, next_hash);
                }
            }
        }

        Ok(anchored)
    }

    /// §4.3: "When `segment_no == finalBlockId` and `verifiedCount <
    /// finalBlockId / 2` → `HASHCHAIN_ERROR`."
    pub fn check_final_guard(&self, final_block_id: u64) -> Result<(), FetchError> {
        if self.verified_count < final_block_id / 2 {
            Err(FetchError::HashChainError(
                "fewer than half of segments anchored into the chain".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use difs_crypto::hash::sha256;
    use difs_types::{Name, SignatureInfo, SignatureType};

    fn segment(segment_no: u64, signature_value: Vec<u8>, next_hash: Option<[u8; 32]>) -> Data {
        let mut info = SignatureInfo::new(SignatureType::HashChainSha256);
        if let Some(nh) = next_hash {
            info = info.with_next_hash(nh);
        }
        let mut data = Data::new(
            Name::from_str_components("/x").append_segment(segment_no),
            vec![],
            info,
        );
        data.signature_value = signature_value;
        data
    }

    #[test]
    fn in_order_chain_verifies_cleanly() {
        let sig1 = sha256(b"segment-1").to_vec();
        let sig0 = sha256(b"segment-0").to_vec();
        let seg0 = segment(0, sig0.clone(), Some(link_anchor(&sig1)));
        let seg1 = segment(1, sig1, Some(SignatureInfo::zero_next_hash()));

        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Anchored);
        assert!(verifier.verify(0, &seg0).unwrap());
        assert!(verifier.verify(1, &seg1).unwrap());
        assert_eq!(verifier.verified_count(), 2);
        verifier.check_final_guard(1).unwrap();
    }

    #[test]
    fn mismatched_linkage_is_fatal() {
        let sig1 = sha256(b"segment-1").to_vec();
        let sig0 = sha256(b"segment-0").to_vec();
        let seg0 = segment(0, sig0, Some([0xffu8; 32])); // doesn't anchor sig1
        let seg1 = segment(1, sig1, Some(SignatureInfo::zero_next_hash()));

        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Anchored);
        assert!(verifier.verify(0, &seg0).unwrap());
        assert!(verifier.verify(1, &seg1).is_err());
    }

    #[test]
    fn out_of_order_segment_is_accepted_tentatively() {
        let sig2 = sha256(b"segment-2").to_vec();
        let seg2 = segment(2, sig2, Some(SignatureInfo::zero_next_hash()));
        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Anchored);
        // Nothing seen yet, so segment 2 doesn't match prev+1 == None+1.
        let anchored = verifier.verify(2, &seg2).unwrap();
        assert!(!anchored);
        assert_eq!(verifier.verified_count(), 0);
    }

    #[test]
    fn final_guard_fires_when_under_half_anchored() {
        let verifier = HashChainVerifier::new(HashChainVerifyMode::Anchored);
        assert!(verifier.check_final_guard(10).is_err());
    }

    #[test]
    fn strict_mode_accepts_a_correctly_linked_out_of_order_segment() {
        let sig1 = sha256(b"segment-1").to_vec();
        let sig0 = sha256(b"segment-0").to_vec();
        let sig5 = sha256(b"segment-5").to_vec();
        let seg0 = segment(0, sig0, Some(link_anchor(&sig1)));
        let seg5 = segment(5, sig5, Some(SignatureInfo::zero_next_hash()));
        let seg1 = segment(1, sig1, Some(SignatureInfo::zero_next_hash()));

        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Strict);
        assert!(verifier.verify(0, &seg0).unwrap());
        // Arrives out of order relative to segment 0; nothing recorded yet
        // for segment 4, so there's nothing to check it against.
        assert!(!verifier.verify(5, &seg5).unwrap());
        // Also out of order (last arrival was segment 5), but segment 0's
        // real `next_hash` is on file and matches — strict mode must not
        // reject a correctly-linked segment just because it arrived late.
        assert!(!verifier.verify(1, &seg1).unwrap());
    }

    #[test]
    fn strict_mode_rejects_a_forged_out_of_order_segment() {
        let sig1 = sha256(b"segment-1").to_vec();
        let real_sig2 = sha256(b"segment-2").to_vec();
        let sig3 = sha256(b"segment-3").to_vec();
        let forged_sig2 = sha256(b"forged-segment-2").to_vec();

        let seg1 = segment(1, sig1, Some(link_anchor(&real_sig2)));
        let seg3 = segment(3, sig3, Some(SignatureInfo::zero_next_hash()));
        let seg2_forged = segment(2, forged_sig2, Some(SignatureInfo::zero_next_hash()));

        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Strict);
        assert!(!verifier.verify(1, &seg1).unwrap());
        assert!(!verifier.verify(3, &seg3).unwrap());
        // Segment 1's real next_hash anchors the genuine segment 2, not
        // this forged stand-in, even though it arrives "out of order" (the
        // last arrival was segment 3, not segment 1).
        assert!(verifier.verify(2, &seg2_forged).is_err());
    }

    #[test]
    fn anchored_mode_does_not_check_out_of_order_segments() {
        let sig1 = sha256(b"segment-1").to_vec();
        let real_sig2 = sha256(b"segment-2").to_vec();
        let sig3 = sha256(b"segment-3").to_vec();
        let forged_sig2 = sha256(b"forged-segment-2").to_vec();

        let seg1 = segment(1, sig1, Some(link_anchor(&real_sig2)));
        let seg3 = segment(3, sig3, Some(SignatureInfo::zero_next_hash()));
        let seg2_forged = segment(2, forged_sig2, Some(SignatureInfo::zero_next_hash()));

        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Anchored);
        assert!(!verifier.verify(1, &seg1).unwrap());
        assert!(!verifier.verify(3, &seg3).unwrap());
        // Anchored mode's whole point is to tolerate this; it's the
        // hash-chain-aware validator layer above it that provides the
        // stronger guarantee when strict mode is selected instead.
        assert!(!verifier.verify(2, &seg2_forged).unwrap());
    }

    #[test]
    fn non_chain_signature_type_is_accepted_without_state_update() {
        let mut info = SignatureInfo::new(SignatureType::Sha256WithEcdsa);
        info.next_hash = None;
        let data = Data::new(Name::from_str_components("/x").append_segment(0), vec![], info);
        let mut verifier = HashChainVerifier::new(HashChainVerifyMode::Anchored);
        assert!(!verifier.verify(0, &data).unwrap());
        assert_eq!(verifier.verified_count(), 0);
    }
}
