//! The closed set of draggable anchors on the certificate.
//!
//! Slots are identified by name, never by a runtime id, and the set is
//! fixed at compile time. Hosts address them by their camelCase name; the
//! older `*SigPos` keys are accepted as aliases so layouts captured by the
//! previous editor still resolve.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "slot_test.rs"]
mod slot_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    BrideSignature,
    GroomSignature,
    CounselorSignature,
}

/// A slot name that is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown slot: {0:?}")]
pub struct UnknownSlot(pub String);

impl Slot {
    /// Every slot, in render order.
    pub const ALL: [Slot; 3] = [Slot::BrideSignature, Slot::CounselorSignature, Slot::GroomSignature];

    /// Stable name used on the wire and by the host.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BrideSignature => "brideSignature",
            Self::GroomSignature => "groomSignature",
            Self::CounselorSignature => "counselorSignature",
        }
    }

    /// Caption printed under the signature line.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BrideSignature => "Signature of Bride-to-Be",
            Self::GroomSignature => "Signature of Groom-to-Be",
            Self::CounselorSignature => "Pre-Marital Counselor",
        }
    }
}

impl FromStr for Slot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brideSignature" | "brideSigPos" => Ok(Self::BrideSignature),
            "groomSignature" | "groomSigPos" => Ok(Self::GroomSignature),
            "counselorSignature" | "counselorSigPos" => Ok(Self::CounselorSignature),
            other => Err(UnknownSlot(other.to_owned())),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
