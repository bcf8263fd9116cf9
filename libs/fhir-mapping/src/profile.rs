//! Supported protocol profiles and the rules that tell them apart

use crate::error::ProfileError;
use std::fmt;
use std::str::FromStr;
use usdm_model::ct;

/// Target profile of an export or source profile of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Madrid,
    Prism2,
    Prism3,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Madrid, Profile::Prism2, Profile::Prism3];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Madrid => "madrid",
            Self::Prism2 => "prism2",
            Self::Prism3 => "prism3",
        }
    }

    pub fn rules(&self) -> &'static ProfileRules {
        match self {
            Self::Madrid => &MADRID,
            Self::Prism2 => &PRISM2,
            Self::Prism3 => &PRISM3,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "madrid" => Ok(Self::Madrid),
            "prism2" => Ok(Self::Prism2),
            "prism3" => Ok(Self::Prism3),
            _ => Err(ProfileError(s.to_string())),
        }
    }
}

/// How narrative sections are split into Composition resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionGrouping {
    /// One composition holding every top-level section
    Single,
    /// One composition per top-level section
    PerTopLevelSection,
}

/// Role of an associated party on the research study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyRole {
    Sponsor,
    CoSponsor,
    LocalSponsor,
    DeviceManufacturer,
    MedicalExpert,
}

impl PartyRole {
    pub const ALL: [PartyRole; 5] = [
        PartyRole::Sponsor,
        PartyRole::CoSponsor,
        PartyRole::LocalSponsor,
        PartyRole::DeviceManufacturer,
        PartyRole::MedicalExpert,
    ];

    /// Code in the research study party role system
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sponsor => "sponsor",
            Self::CoSponsor => "co-sponsor",
            Self::LocalSponsor => "local-sponsor",
            Self::DeviceManufacturer => "device-manufacturer",
            Self::MedicalExpert => "medical-expert",
        }
    }

    pub fn display(&self) -> &'static str {
        self.code()
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    /// Study role decode used to find the parties in the study graph
    pub fn study_role(&self) -> &'static str {
        match self {
            Self::Sponsor => ct::ROLE_SPONSOR,
            Self::CoSponsor => ct::ROLE_CO_SPONSOR,
            Self::LocalSponsor => ct::ROLE_LOCAL_SPONSOR,
            Self::DeviceManufacturer => ct::ROLE_DEVICE_MANUFACTURER,
            Self::MedicalExpert => ct::ROLE_MEDICAL_EXPERT,
        }
    }
}

/// Everything that differs between profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRules {
    /// Section numbers or titles whose subtree is left out of the narrative
    pub ignore_sections: &'static [&'static str],
    pub composition_grouping: CompositionGrouping,
    /// Organization parties emitted, in associated party order
    pub organization_parties: &'static [PartyRole],
    pub medical_expert: bool,
}

impl ProfileRules {
    pub fn ignores(&self, section_number: &str, section_title: &str) -> bool {
        self.ignore_sections
            .iter()
            .any(|s| *s == section_number.trim() || *s == section_title.trim())
    }
}

const MADRID: ProfileRules = ProfileRules {
    ignore_sections: &["Title Page"],
    composition_grouping: CompositionGrouping::Single,
    organization_parties: &[PartyRole::Sponsor],
    medical_expert: false,
};

const PRISM2: ProfileRules = ProfileRules {
    ignore_sections: &["Title Page", "Amendment Details"],
    composition_grouping: CompositionGrouping::Single,
    organization_parties: &[
        PartyRole::Sponsor,
        PartyRole::CoSponsor,
        PartyRole::LocalSponsor,
        PartyRole::DeviceManufacturer,
    ],
    medical_expert: false,
};

const PRISM3: ProfileRules = ProfileRules {
    ignore_sections: &["Title Page"],
    composition_grouping: CompositionGrouping::PerTopLevelSection,
    organization_parties: &[
        PartyRole::Sponsor,
        PartyRole::CoSponsor,
        PartyRole::LocalSponsor,
        PartyRole::DeviceManufacturer,
    ],
    medical_expert: true,
};
