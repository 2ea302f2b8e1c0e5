// Algorithm grounded on spec.md §4.1 and examples/original_source's
// segment_producer.cpp / hc-key-chain.cpp (reverse iteration building the
// rolling NextHash before each segment is signed).
//! Partitions a byte stream into a reverse hash chain of signed segments.

use crate::error::ProducerError;
use difs_crypto::hash::link_anchor;
use difs_crypto::signer::{HashChainSha256Signer, Signer};
use difs_crypto::{EcdsaChainHeadSigner, KeyStore};
use difs_types::signature::SignatureInfo;
use difs_types::{Data, Name};
use std::io::Read;
use std::time::Duration;

/// Options controlling how a byte stream is segmented and signed, mirroring
/// spec.md §4.1's `{maxSegmentSize, freshnessPeriod, signerIdentity,
/// useHashChain}`.
#[derive(Debug, Clone)]
pub struct SignerOptions {
    /// Maximum bytes of application content per segment. The `NextHash`
    /// field reserves 32 bytes of signature-info overhead per segment, so
    /// content never exceeds `maxSegmentSize - 32` (§3 invariant).
    pub max_segment_size: usize,
    pub freshness_period: Option<Duration>,
    pub signer_identity: String,
    /// When `false`, every segment is signed independently with the
    /// chain-head (asymmetric) signer and no `NextHash` chain is built —
    /// the non-hash-chain fallback named by the `useHashChain` option.
    pub use_hash_chain: bool,
}

impl Default for SignerOptions {
    fn default() -> Self {
        Self {
            max_segment_size: 8192,
            freshness_period: Some(Duration::from_secs(10)),
            signer_identity: "default".to_string(),
            use_hash_chain: true,
        }
    }
}

const NEXT_HASH_RESERVED_BYTES: usize = 32;

/// Reads `stream` into a contiguous ordered list of signed segments under
/// `prefix`, implementing the §4.1 algorithm: chunk, assign segment
/// numbers by read order, then sign from `N-1` down to `0` carrying a
/// rolling `nextHash`.
pub fn sign_object(
    prefix: &Name,
    mut stream: impl Read,
    key_store: &dyn KeyStore,
    options: &SignerOptions,
) -> Result<Vec<Data>, ProducerError> {
    let chunk_size = options
        .max_segment_size
        .saturating_sub(NEXT_HASH_RESERVED_BYTES)
        .max(1);

    let mut chunks: Vec<Vec<u8>> = Vec::new();
    let mut buf = vec![0u8; chunk_size];
    loop {
        let read = read_full(&mut stream, &mut buf)?;
        if read == 0 {
            break;
        }
        chunks.push(buf[..read].to_vec());
        if read < chunk_size {
            break;
        }
    }
    if chunks.is_empty() {
        // "if S is empty, emit one empty segment" (§4.1).
        chunks.push(Vec::new());
    }

    let n = chunks.len() as u64;
    let final_block_id = n - 1;

    let chain_head_signer = EcdsaChainHeadSigner::new(key_store.identity_key(&options.signer_identity)?.signing_key);
    let hash_chain_signer = HashChainSha256Signer;

    let mut segments: Vec<Data> = Vec::with_capacity(chunks.len());
    let mut next_hash = SignatureInfo::zero_next_hash();

    for (i, content) in chunks.into_iter().enumerate().rev() {
        let segment_no = i as u64;
        let is_chain_head = segment_no == final_block_id;

        let signature_type = if !options.use_hash_chain || is_chain_head {
            difs_types::SignatureType::HashChainEcdsa
        } else {
            difs_types::SignatureType::HashChainSha256
        };

        let mut signature_info = SignatureInfo::new(signature_type);
        if options.use_hash_chain {
            signature_info = signature_info.with_next_hash(next_hash);
        }

        let mut data = Data::new(prefix.append_segment(segment_no), content, signature_info);
        data.final_block_id = Some(final_block_id);
        data.freshness_period = options.freshness_period;

        let signed_portion = data.signed_portion();
        let signature_value = if !options.use_hash_chain || is_chain_head {
            chain_head_signer.sign(&signed_portion)
        } else {
            hash_chain_signer.sign(&signed_portion)
        };

        if options.use_hash_chain {
            next_hash = link_anchor(&signature_value);
        }
        data.signature_value = signature_value;

        segments.push(data);
    }

    segments.reverse();
    Ok(segments)
}

fn read_full(stream: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let read = stream.read(&mut buf[total..])?;
        if read == 0 {
            break;
        }
        total += read;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use difs_crypto::InMemoryKeyStore;
    use std::io::Cursor;

    fn key_store_with(identity: &str) -> InMemoryKeyStore {
        let store = InMemoryKeyStore::new();
        store.generate(identity);
        store
    }

    #[test]
    fn empty_input_produces_one_empty_segment() {
        let store = key_store_with("signer-1");
        let options = SignerOptions {
            signer_identity: "signer-1".to_string(),
            ..Default::default()
        };
        let segments =
            sign_object(&Name::from_str_components("/difs"), Cursor::new(vec![]), &store, &options)
                .unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].final_block_id, Some(0));
        assert!(segments[0].content.is_empty());
        assert_eq!(
            segments[0].signature_info.next_hash,
            Some(SignatureInfo::zero_next_hash())
        );
    }

    #[test]
    fn multi_segment_chain_links_correctly() {
        let store = key_store_with("signer-1");
        let options = SignerOptions {
            max_segment_size: 36, // 4 content bytes + 32 reserved
            signer_identity: "signer-1".to_string(),
            ..Default::default()
        };
        let payload = b"AAAABBBBCCCC".to_vec(); // 3 segments of 4 bytes
        let segments = sign_object(
            &Name::from_str_components("/difs"),
            Cursor::new(payload.clone()),
            &store,
            &options,
        )
        .unwrap();
        assert_eq!(segments.len(), 3);
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(seg.name.last_segment().unwrap(), i as u64);
            assert_eq!(seg.final_block_id, Some(2));
        }
        // §8 property 2: NextHash[i] == first 32 bytes of signature[i+1].
        for i in 0..segments.len() - 1 {
            let expected = link_anchor(&segments[i + 1].signature_value);
            assert_eq!(segments[i].signature_info.next_hash, Some(expected));
        }
        // Final segment's NextHash is all zero.
        assert_eq!(
            segments[2].signature_info.next_hash,
            Some(SignatureInfo::zero_next_hash())
        );
        // Concatenated content reproduces the input.
        let joined: Vec<u8> = segments.iter().flat_map(|s| s.content.clone()).collect();
        assert_eq!(joined, payload);
    }

    #[test]
    fn without_hash_chain_every_segment_is_independently_signed() {
        let store = key_store_with("signer-1");
        let options = SignerOptions {
            max_segment_size: 36,
            signer_identity: "signer-1".to_string(),
            use_hash_chain: false,
            ..Default::default()
        };
        let segments = sign_object(
            &Name::from_str_components("/difs"),
            Cursor::new(b"AAAABBBB".to_vec()),
            &store,
            &options,
        )
        .unwrap();
        for seg in &segments {
            assert_eq!(seg.signature_info.next_hash, None);
        }
    }
}
