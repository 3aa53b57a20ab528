use serde::{Deserialize, Serialize};

/// Marketing grouping of the countries the agency services.
///
/// Not an ISO grouping: "Other" is simply the file-processing destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Asia,
    Schengen,
    Other,
}

const ASIA: &[&str] = &[
    "malaysia",
    "saudi arabia",
    "singapore",
    "turkey",
    "hong kong",
    "kazakhstan",
    "indonesia",
    "thailand",
    "azerbaijan",
    "china",
    "nepal",
    "egypt",
    "vietnam",
    "tajikistan",
    "kyrgyzstan",
    "uzbekistan",
    "philippines",
    "sri lanka",
];

const SCHENGEN: &[&str] = &[
    "france",
    "spain",
    "belgium",
    "netherlands",
    "poland",
    "germany",
    "italy",
    "hungary",
    "greece",
    "czech republic",
    "switzerland",
    "portugal",
    "denmark",
    "sweden",
    "norway",
];

const OTHER: &[&str] = &["united kingdom", "united states", "australia", "canada"];

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Asia => "asia",
            Region::Schengen => "schengen",
            Region::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asia" => Some(Region::Asia),
            "schengen" | "europe" => Some(Region::Schengen),
            "other" => Some(Region::Other),
            _ => None,
        }
    }

    pub fn all() -> Vec<Region> {
        vec![Region::Asia, Region::Schengen, Region::Other]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Asia => "Asia",
            Region::Schengen => "Schengen",
            Region::Other => "USA / UK / Canada / Australia",
        }
    }

    /// Title used when the bot lists this region's countries
    pub fn list_title(&self) -> &'static str {
        match self {
            Region::Asia => "Asian Countries We Service",
            Region::Schengen => "Schengen Countries We Service",
            Region::Other => "File Processing Services",
        }
    }

    /// Lowercase member names, in the order they are presented
    pub fn members(&self) -> &'static [&'static str] {
        match self {
            Region::Asia => ASIA,
            Region::Schengen => SCHENGEN,
            Region::Other => OTHER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_europe_alias() {
        assert_eq!(Region::from_str("Europe"), Some(Region::Schengen));
        assert_eq!(Region::from_str(" ASIA "), Some(Region::Asia));
        assert_eq!(Region::from_str("africa"), None);
    }

    #[test]
    fn test_round_trip_names() {
        for region in Region::all() {
            assert_eq!(Region::from_str(region.as_str()), Some(region));
        }
    }

    #[test]
    fn test_members_are_lowercase_and_unique() {
        for region in Region::all() {
            let members = region.members();
            for (i, name) in members.iter().enumerate() {
                assert_eq!(*name, name.to_lowercase());
                assert!(!members[i + 1..].contains(name), "{} listed twice", name);
            }
        }
    }
}
