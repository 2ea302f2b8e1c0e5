// Segment data model per spec.md §3 ("Segment. Immutable carrier...").
//! The `Data` packet: an immutable, signed segment carrier.

use crate::error::{CoreError, Result};
use crate::name::Name;
use crate::signature::SignatureInfo;
use crate::tlv::Tlv;
use std::time::Duration;

const DATA_TLV_TYPE: u64 = 0x06;
const CONTENT_TLV_TYPE: u64 = 0x15;
const FRESHNESS_TLV_TYPE: u64 = 0x18;
const FINAL_BLOCK_ID_TLV_TYPE: u64 = 0x1a;
const SIGNATURE_VALUE_TLV_TYPE: u64 = 0x17;
const CONGESTION_MARK_TLV_TYPE: u64 = 0x20;

/// A single, immutable segment of a larger named byte object (§3 glossary:
/// "Segment").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub name: Name,
    pub content: Vec<u8>,
    pub freshness_period: Option<Duration>,
    /// The segment number of the final segment of the object, if known.
    /// Required to be a `Segment` name component when present (§4.2 step
    /// 4, `FINALBLOCKID_NOT_SEGMENT`).
    pub final_block_id: Option<u64>,
    pub signature_info: SignatureInfo,
    pub signature_value: Vec<u8>,
    /// Set by the substrate to simulate a congestion mark (§4.2 step 9);
    /// not part of the wire-codec contract proper but threaded through the
    /// in-memory mock face for the congestion-control test scenarios.
    pub congestion_mark: bool,
}

impl Data {
    pub fn new(name: Name, content: Vec<u8>, signature_info: SignatureInfo) -> Self {
        Self {
            name,
            content,
            freshness_period: None,
            final_block_id: None,
            signature_info,
            signature_value: Vec::new(),
            congestion_mark: false,
        }
    }

    /// The bytes that get signed: name + content + freshness + final-block-id
    /// + signature-info, excluding the signature value itself. This is the
    /// "signed portion" referenced by §4.1's keyless hash-chain signature.
    pub fn signed_portion(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend(self.name.encode());
        buf.extend(Tlv::new(CONTENT_TLV_TYPE, self.content.clone()).encode());
        if let Some(freshness) = self.freshness_period {
            buf.extend(
                Tlv::new(
                    FRESHNESS_TLV_TYPE,
                    (freshness.as_millis() as u64).to_be_bytes().to_vec(),
                )
                .encode(),
            );
        }
        if let Some(final_block_id) = self.final_block_id {
            buf.extend(
                Tlv::new(
                    FINAL_BLOCK_ID_TLV_TYPE,
                    self.name.append_segment(final_block_id).encode(),
                )
                .encode(),
            );
        }
        buf.extend(self.signature_info.encode());
        buf
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut inner = self.signed_portion();
        inner.extend(Tlv::new(SIGNATURE_VALUE_TLV_TYPE, self.signature_value.clone()).encode());
        if self.congestion_mark {
            inner.extend(Tlv::new(CONGESTION_MARK_TLV_TYPE, vec![1]).encode());
        }
        Tlv::new(DATA_TLV_TYPE, inner).encode()
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (tlv, consumed) = Tlv::decode(buf)?;
        if tlv.typ != DATA_TLV_TYPE {
            return Err(CoreError::Decode(format!(
                "expected Data TLV type {DATA_TLV_TYPE}, got {}",
                tlv.typ
            )));
        }
        let mut offset = 0usize;
        let (name, used) = Name::decode(&tlv.value[offset..])?;
        offset += used;
        let mut content = Vec::new();
        let mut freshness_period = None;
        let mut final_block_id = None;
        let mut signature_info = None;
        let mut signature_value = Vec::new();
        let mut congestion_mark = false;
        while offset < tlv.value.len() {
            let (field, used) = Tlv::decode(&tlv.value[offset..])?;
            offset += used;
            match field.typ {
                t if t == CONTENT_TLV_TYPE => content = field.value,
                t if t == FRESHNESS_TLV_TYPE => {
                    let mut padded = [0u8; 8];
                    let len = field.value.len().min(8);
                    padded[8 - len..].copy_from_slice(&field.value[field.value.len() - len..]);
                    freshness_period =
                        Some(Duration::from_millis(u64::from_be_bytes(padded)));
                }
                t if t == FINAL_BLOCK_ID_TLV_TYPE => {
                    let (fb_name, _) = Name::decode(&field.value)?;
                    final_block_id = Some(fb_name.last_segment()?);
                }
                0x16 => {
                    // `field.value` is the SignatureInfo TLV's inner payload;
                    // rewrap it in its outer TLV header so `SignatureInfo::decode`
                    // (which expects a full self-delimiting TLV) can parse it.
                    let rewrapped = Tlv::new(field.typ, field.value.clone()).encode();
                    let (info, _) = SignatureInfo::decode(&rewrapped)?;
                    signature_info = Some(info);
                }
                t if t == SIGNATURE_VALUE_TLV_TYPE => signature_value = field.value,
                t if t == CONGESTION_MARK_TLV_TYPE => congestion_mark = true,
                _ => {}
            }
        }
        let signature_info = signature_info
            .ok_or_else(|| CoreError::Decode("missing SignatureInfo".to_string()))?;
        Ok((
            Data {
                name,
                content,
                freshness_period,
                final_block_id,
                signature_info,
                signature_value,
                congestion_mark,
            },
            consumed,
        ))
    }
}
