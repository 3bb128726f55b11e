//! Reader personas and their reference profiles.
//!
//! The persona set is a closed enumeration in code, but the corpus treats
//! it as extensible documentation: a front-matter tag outside this set is
//! surfaced as a warning and recorded verbatim, never a hard failure.

use crate::core::record::Depth;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaTag {
    NewDeveloper,
    YoloDev,
    SpecialistExpanding,
    GeneralistLevelingUp,
    BusyDeveloper,
}

impl PersonaTag {
    pub const ALL: [PersonaTag; 5] = [
        PersonaTag::NewDeveloper,
        PersonaTag::YoloDev,
        PersonaTag::SpecialistExpanding,
        PersonaTag::GeneralistLevelingUp,
        PersonaTag::BusyDeveloper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaTag::NewDeveloper => "new-developer",
            PersonaTag::YoloDev => "yolo-dev",
            PersonaTag::SpecialistExpanding => "specialist-expanding",
            PersonaTag::GeneralistLevelingUp => "generalist-leveling-up",
            PersonaTag::BusyDeveloper => "busy-developer",
        }
    }

    /// Case-insensitive tag lookup; `None` for tags outside the enumeration.
    pub fn parse(value: &str) -> Option<PersonaTag> {
        let normalized = value.trim().to_lowercase();
        PersonaTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == normalized)
    }
}

impl fmt::Display for PersonaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much uninterrupted reading time a persona typically brings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeBudget {
    /// Minutes between tasks; skims and bookmarks.
    Skim,
    /// A focused half-hour to an hour.
    Focused,
    /// Will sit with a topic for an afternoon.
    Immersive,
}

/// Reference data for one persona. Lookup table, never mutated at runtime.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaProfile {
    pub tag: PersonaTag,
    pub tagline: &'static str,
    pub preferred_depth: Depth,
    pub time_budget: TimeBudget,
    pub entry_points: &'static [&'static str],
}

const PROFILES: [PersonaProfile; 5] = [
    PersonaProfile {
        tag: PersonaTag::NewDeveloper,
        tagline: "First real project; wants a guided path from the start",
        preferred_depth: Depth::Surface,
        time_budget: TimeBudget::Focused,
        entry_points: &["01-discovery", "02-design"],
    },
    PersonaProfile {
        tag: PersonaTag::YoloDev,
        tagline: "Ships first, reads later; needs the shortest safe route",
        preferred_depth: Depth::Surface,
        time_budget: TimeBudget::Skim,
        entry_points: &["03-development"],
    },
    PersonaProfile {
        tag: PersonaTag::SpecialistExpanding,
        tagline: "Deep in one area, broadening into adjacent phases",
        preferred_depth: Depth::DeepWater,
        time_budget: TimeBudget::Immersive,
        entry_points: &["02-design", "03-development"],
    },
    PersonaProfile {
        tag: PersonaTag::GeneralistLevelingUp,
        tagline: "Knows a bit of everything, leveling up the fundamentals",
        preferred_depth: Depth::MidDepth,
        time_budget: TimeBudget::Focused,
        entry_points: &["01-discovery", "02-design", "03-development"],
    },
    PersonaProfile {
        tag: PersonaTag::BusyDeveloper,
        tagline: "Time-boxed; surface passes now, bookmarks for later",
        preferred_depth: Depth::Surface,
        time_budget: TimeBudget::Skim,
        entry_points: &["02-design"],
    },
];

impl PersonaProfile {
    pub fn all() -> &'static [PersonaProfile] {
        &PROFILES
    }

    pub fn for_tag(tag: PersonaTag) -> &'static PersonaProfile {
        PROFILES
            .iter()
            .find(|p| p.tag == tag)
            .expect("every persona tag has a profile")
    }
}
