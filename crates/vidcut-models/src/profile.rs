//! Extraction client profiles.
//!
//! The extraction engine exposes different stream URLs depending on the
//! client it is asked to emulate. Resolution walks a fixed priority
//! list of profiles until one yields usable metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A client/device emulation profile presented to the extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClientProfile {
    /// No client selection at all: the engine applies its own default
    /// format resolution. Behaves differently from forcing any specific
    /// client, so it is tried first.
    Default,
    Web,
    Android,
    Ios,
    Tv,
    Mweb,
}

impl ClientProfile {
    /// Cascade priority order. Strictly sequential, first success wins.
    pub const CASCADE: [ClientProfile; 6] = [
        ClientProfile::Default,
        ClientProfile::Web,
        ClientProfile::Android,
        ClientProfile::Ios,
        ClientProfile::Tv,
        ClientProfile::Mweb,
    ];

    /// The `player_client` value for the engine's extractor arguments,
    /// or `None` for the default profile (which omits the parameter).
    pub fn player_client(&self) -> Option<&'static str> {
        match self {
            ClientProfile::Default => None,
            ClientProfile::Web => Some("web"),
            ClientProfile::Android => Some("android"),
            ClientProfile::Ios => Some("ios"),
            ClientProfile::Tv => Some("tv"),
            ClientProfile::Mweb => Some("mweb"),
        }
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.player_client() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "default"),
        }
    }
}
