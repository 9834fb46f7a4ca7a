//! Identifier newtypes for vessels and ports.
//!
//! Both identifiers wrap a `String` and borrow as `str`, so maps keyed by an
//! identifier can be queried with a plain string slice.

use std::borrow::Borrow;
use std::fmt;

/// Separators of a [`CandidateId`](crate::CandidateId). Vessel and port
/// identifiers may not contain them, which keeps candidate ids unique.
pub const ID_SEPARATORS: [char; 2] = [':', '>'];

fn well_formed(raw: &str) -> bool {
    !raw.trim().is_empty() && !raw.contains(ID_SEPARATORS.as_slice())
}

/// Identifier of a vessel in the fleet roster.
///
/// # Examples
///
/// ```
/// use tideway_core::VesselId;
///
/// let id = VesselId::new("T1");
/// assert_eq!(id.as_str(), "T1");
/// assert_eq!(id.to_string(), "T1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct VesselId(String);

impl VesselId {
    /// Wrap a raw vessel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether the identifier is non-blank and free of [`ID_SEPARATORS`].
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        well_formed(&self.0)
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for VesselId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VesselId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VesselId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a pickup or drop-off port.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use tideway_core::PortId;
///
/// let mut demand = BTreeMap::new();
/// demand.insert(PortId::new("U1"), 40_000.0);
/// assert_eq!(demand.get("U1"), Some(&40_000.0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PortId(String);

impl PortId {
    /// Wrap a raw port identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether the identifier is non-blank and free of [`ID_SEPARATORS`].
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        well_formed(&self.0)
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PortId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PortId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("T1", true)]
    #[case("Port Harcourt", true)]
    #[case("", false)]
    #[case("  ", false)]
    #[case("A:B", false)]
    #[case("L1>U1", false)]
    fn separators_and_blanks_are_malformed(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(VesselId::new(raw).is_well_formed(), expected);
        assert_eq!(PortId::new(raw).is_well_formed(), expected);
    }
}
