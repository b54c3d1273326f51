//! Legal domain tags

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A legal subject area (or open web) served by one expert and one passage source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegalDomain {
    /// 개인정보 보호법
    PersonalData,
    /// 근로기준법
    Labor,
    /// 주택임대차보호법
    Housing,
    /// Open web search
    Web,
}

impl LegalDomain {
    /// All domains in canonical order
    pub const ALL: [LegalDomain; 4] = [
        LegalDomain::PersonalData,
        LegalDomain::Labor,
        LegalDomain::Housing,
        LegalDomain::Web,
    ];

    /// Stable tag used in config, logs and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalData => "personal-data",
            Self::Labor => "labor",
            Self::Housing => "housing",
            Self::Web => "web",
        }
    }

    /// Label the router model selects from
    pub fn route_label(&self) -> &'static str {
        match self {
            Self::PersonalData => "search_personal",
            Self::Labor => "search_labor",
            Self::Housing => "search_housing",
            Self::Web => "search_web",
        }
    }

    /// Parse a router label back into a domain
    pub fn from_route_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.route_label() == label.trim())
    }

    /// Persona the expert prompts speak as
    pub fn expert_name(&self) -> &'static str {
        match self {
            Self::PersonalData => "개인정보보호법 전문가",
            Self::Labor => "근로기준법 전문가",
            Self::Housing => "주택임대차보호법 전문가",
            Self::Web => "인터넷 정보 검색 전문가",
        }
    }

    /// Name used in citations, e.g. `(출처: 개인정보 보호법 제15조)`
    pub fn law_name(&self) -> &'static str {
        match self {
            Self::PersonalData => "개인정보 보호법",
            Self::Labor => "근로기준법",
            Self::Housing => "주택임대차보호법",
            Self::Web => "웹 검색",
        }
    }

    pub fn is_web(&self) -> bool {
        matches!(self, Self::Web)
    }
}

impl fmt::Display for LegalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegalDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s || domain.route_label() == s)
            .ok_or_else(|| format!("Unknown legal domain: {}", s))
    }
}
