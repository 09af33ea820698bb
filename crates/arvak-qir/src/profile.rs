//! Execution profiles and the capabilities they grant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::addressing::AddressingMode;
use crate::error::QirError;

/// A named capability set constraining the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Profile {
    /// Static addressing, no branching, results recorded at the end.
    Base,
    /// Dynamic allocation, branching on measurement results, qubit reuse.
    #[default]
    AdaptiveProfileExecution,
}

/// Capability table for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Qubits and results are obtained from runtime allocation calls.
    pub dynamic_allocation: bool,
    /// Measurement results may be read as booleans and branched on.
    pub branch_on_result: bool,
    /// A measured qubit may be reset and used again.
    pub qubit_reuse: bool,
    /// Every qubit/result index must fall inside the declared register sizes.
    pub static_register_sizes: bool,
}

impl Profile {
    /// All known profiles.
    pub const ALL: [Profile; 2] = [Profile::Base, Profile::AdaptiveProfileExecution];

    /// The capabilities granted by this profile.
    pub fn capabilities(self) -> Capabilities {
        match self {
            Profile::Base => Capabilities {
                dynamic_allocation: false,
                branch_on_result: false,
                qubit_reuse: false,
                static_register_sizes: true,
            },
            Profile::AdaptiveProfileExecution => Capabilities {
                dynamic_allocation: true,
                branch_on_result: true,
                qubit_reuse: true,
                static_register_sizes: false,
            },
        }
    }

    /// The addressing strategy used for every handle in a translation.
    pub fn addressing(self) -> AddressingMode {
        if self.capabilities().dynamic_allocation {
            AddressingMode::Dynamic
        } else {
            AddressingMode::Static
        }
    }

    /// Value of the `qir_profiles` entry-point attribute.
    pub fn qir_profile_name(self) -> &'static str {
        match self {
            Profile::Base => "base_profile",
            Profile::AdaptiveProfileExecution => "adaptive_profile",
        }
    }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Base => "Base",
            Profile::AdaptiveProfileExecution => "AdaptiveProfileExecution",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = QirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Base" | "base" | "base_profile" => Ok(Profile::Base),
            "AdaptiveProfileExecution" | "adaptive" | "adaptive_profile" => {
                Ok(Profile::AdaptiveProfileExecution)
            }
            other => Err(QirError::InvalidProfile(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profiles() {
        assert_eq!("Base".parse::<Profile>().unwrap(), Profile::Base);
        assert_eq!("base_profile".parse::<Profile>().unwrap(), Profile::Base);
        assert_eq!(
            "AdaptiveProfileExecution".parse::<Profile>().unwrap(),
            Profile::AdaptiveProfileExecution
        );
        assert_eq!(
            "adaptive_profile".parse::<Profile>().unwrap(),
            Profile::AdaptiveProfileExecution
        );
    }

    #[test]
    fn test_unknown_profile_rejected() {
        for bad in ["", "BASE", "BasicExecution", "full"] {
            match bad.parse::<Profile>() {
                Err(QirError::InvalidProfile(name)) => assert_eq!(name, bad),
                other => panic!("expected InvalidProfile for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for profile in Profile::ALL {
            assert_eq!(profile.to_string().parse::<Profile>().unwrap(), profile);
        }
    }

    #[test]
    fn test_capability_table() {
        let base = Profile::Base.capabilities();
        assert!(!base.dynamic_allocation);
        assert!(!base.branch_on_result);
        assert!(base.static_register_sizes);
        assert_eq!(Profile::Base.addressing(), AddressingMode::Static);

        let adaptive = Profile::AdaptiveProfileExecution.capabilities();
        assert!(adaptive.dynamic_allocation);
        assert!(adaptive.branch_on_result);
        assert!(adaptive.qubit_reuse);
        assert_eq!(
            Profile::AdaptiveProfileExecution.addressing(),
            AddressingMode::Dynamic
        );
    }

    #[test]
    fn test_default_is_adaptive() {
        assert_eq!(Profile::default(), Profile::AdaptiveProfileExecution);
    }
}
