//! Hierarchical names, in the style of NDN names: an ordered sequence of
//! opaque components, with a reserved marker-byte convention for segment
//! numbers (grounded on `original_source/ndn-cxx` naming conventions).

use crate::error::{CoreError, Result};
use crate::tlv::Tlv;
use std::fmt;

const NAME_TLV_TYPE: u64 = 0x07;
const GENERIC_COMPONENT_TLV_TYPE: u64 = 0x08;

/// Marker byte prefixed to the big-endian segment number inside a generic
/// name component, matching NDN's `SegmentNameComponent` convention.
const SEGMENT_MARKER: u8 = 0x00;

/// A single component of a [`Name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameComponent {
    /// An opaque, application-defined component.
    Generic(Vec<u8>),
    /// A segment-number component (`%00<big-endian number>`).
    Segment(u64),
}

impl NameComponent {
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            NameComponent::Generic(b) => b.clone(),
            NameComponent::Segment(n) => {
                let mut bytes = n.to_be_bytes().to_vec();
                while bytes.first() == Some(&0) && bytes.len() > 1 {
                    bytes.remove(0);
                }
                let mut out = Vec::with_capacity(bytes.len() + 1);
                out.push(SEGMENT_MARKER);
                out.extend_from_slice(&bytes);
                out
            }
        }
    }

    fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.first() == Some(&SEGMENT_MARKER) && bytes.len() > 1 && bytes.len() <= 9 {
            let mut padded = [0u8; 8];
            let digits = &bytes[1..];
            let offset = 8 - digits.len();
            padded[offset..].copy_from_slice(digits);
            NameComponent::Segment(u64::from_be_bytes(padded))
        } else {
            NameComponent::Generic(bytes)
        }
    }

    /// Returns the segment number if this component is a segment marker.
    pub fn as_segment(&self) -> Option<u64> {
        match self {
            NameComponent::Segment(n) => Some(*n),
            NameComponent::Generic(_) => None,
        }
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameComponent::Segment(n) => write!(f, "seg={n}"),
            NameComponent::Generic(b) => match std::str::from_utf8(b) {
                Ok(s) if s.chars().all(|c| c.is_ascii_graphic()) => write!(f, "{s}"),
                _ => {
                    for byte in b {
                        write!(f, "%{byte:02X}")?;
                    }
                    Ok(())
                }
            },
        }
    }
}

/// An ordered sequence of [`NameComponent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name(Vec<NameComponent>);

impl Name {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_components(components: Vec<NameComponent>) -> Self {
        Self(components)
    }

    pub fn from_str_components(s: &str) -> Self {
        let components = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| NameComponent::Generic(c.as_bytes().to_vec()))
            .collect();
        Self(components)
    }

    pub fn components(&self) -> &[NameComponent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn append(&mut self, component: NameComponent) -> &mut Self {
        self.0.push(component);
        self
    }

    pub fn append_segment(&self, segment_no: u64) -> Name {
        let mut out = self.clone();
        out.0.push(NameComponent::Segment(segment_no));
        out
    }

    /// Returns the last component, if any.
    pub fn last(&self) -> Option<&NameComponent> {
        self.0.last()
    }

    /// Returns the segment number of the last component, per §4.2 step 1
    /// ("Reject response whose last name component is not a segment
    /// number").
    pub fn last_segment(&self) -> Result<u64> {
        self.0
            .last()
            .and_then(NameComponent::as_segment)
            .ok_or(CoreError::NotASegmentComponent)
    }

    /// Returns a copy of this name with the last `drop` components removed.
    /// `prefix(1)` removes exactly the final component, matching
    /// `dataName.prefix(-1)` in §4.2 step 7.
    pub fn prefix_dropping_last(&self, drop: usize) -> Name {
        let keep = self.0.len().saturating_sub(drop);
        Name(self.0[..keep].to_vec())
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut inner = Vec::new();
        for component in &self.0 {
            let bytes = component.to_bytes();
            inner.extend(Tlv::new(GENERIC_COMPONENT_TLV_TYPE, bytes).encode());
        }
        Tlv::new(NAME_TLV_TYPE, inner).encode()
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (tlv, consumed) = Tlv::decode(buf)?;
        if tlv.typ != NAME_TLV_TYPE {
            return Err(CoreError::Decode(format!(
                "expected Name TLV type {NAME_TLV_TYPE}, got {}",
                tlv.typ
            )));
        }
        let mut components = Vec::new();
        let mut offset = 0usize;
        while offset < tlv.value.len() {
            let (component_tlv, used) = Tlv::decode(&tlv.value[offset..])?;
            components.push(NameComponent::from_bytes(component_tlv.value));
            offset += used;
        }
        Ok((Name(components), consumed))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for component in &self.0 {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}
