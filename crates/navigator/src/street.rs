use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

use crate::geometry::Bounds;
use crate::safety::SafetyTier;

pub const STREET_COUNT: usize = 9;

/// The fixed street table. Variant order is the collision lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreetName {
    MainStreet,
    CentralAvenue,
    OakBoulevard,
    FirstStreet,
    SecondStreet,
    ThirdStreet,
    FourthStreet,
    NorthRoad,
    SouthStreet,
}

impl StreetName {
    pub const ALL: [StreetName; STREET_COUNT] = [
        Self::MainStreet,
        Self::CentralAvenue,
        Self::OakBoulevard,
        Self::FirstStreet,
        Self::SecondStreet,
        Self::ThirdStreet,
        Self::FourthStreet,
        Self::NorthRoad,
        Self::SouthStreet,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainStreet => "Main Street",
            Self::CentralAvenue => "Central Avenue",
            Self::OakBoulevard => "Oak Boulevard",
            Self::FirstStreet => "First Street",
            Self::SecondStreet => "Second Street",
            Self::ThirdStreet => "Third Street",
            Self::FourthStreet => "Fourth Street",
            Self::NorthRoad => "North Road",
            Self::SouthStreet => "South Street",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::MainStreet => "Primary commercial street through downtown",
            Self::CentralAvenue => "Mixed residential and commercial area",
            Self::OakBoulevard => "Residential street with tree-lined sidewalks",
            Self::FirstStreet => "Historic district with vintage shops",
            Self::SecondStreet => "Business district with office buildings",
            Self::ThirdStreet => "Quiet residential area",
            Self::FourthStreet => "Entertainment district with restaurants",
            Self::NorthRoad => "Northern perimeter road",
            Self::SouthStreet => "Southern industrial area",
        }
    }

    pub const fn bounds(self) -> Bounds {
        match self {
            Self::MainStreet => Bounds::new(0, 800, 150, 175),
            Self::CentralAvenue => Bounds::new(0, 800, 290, 315),
            Self::OakBoulevard => Bounds::new(0, 800, 420, 445),
            Self::FirstStreet => Bounds::new(175, 195, 0, 600),
            Self::SecondStreet => Bounds::new(305, 325, 0, 600),
            Self::ThirdStreet => Bounds::new(495, 515, 0, 600),
            Self::FourthStreet => Bounds::new(635, 655, 0, 600),
            Self::NorthRoad => Bounds::new(0, 800, 25, 45),
            Self::SouthStreet => Bounds::new(0, 800, 575, 600),
        }
    }
}

impl fmt::Display for StreetName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("'{raw}' is not a street on the map"))]
pub struct UnknownStreet {
    stage: &'static str,
    raw: String,
}

impl FromStr for StreetName {
    type Err = UnknownStreet;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|street| street.as_str() == raw.trim())
            .ok_or_else(|| UnknownStreet {
                stage: "parse-street-name",
                raw: raw.to_string(),
            })
    }
}

/// One street entry: fixed geometry plus a mutable tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Street {
    pub name: StreetName,
    pub safety: SafetyTier,
}

impl Street {
    pub fn description(&self) -> &'static str {
        self.name.description()
    }

    pub fn bounds(&self) -> Bounds {
        self.name.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for street in StreetName::ALL {
            assert_eq!(street.as_str().parse::<StreetName>().ok(), Some(street));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        let error = "Elm Street".parse::<StreetName>().expect_err("not on the map");
        assert_eq!(error.to_string(), "'Elm Street' is not a street on the map");
    }

    #[test]
    fn every_street_touches_the_map() {
        for street in StreetName::ALL {
            let bounds = street.bounds();
            assert!(bounds.width() > 0 && bounds.height() > 0, "{street}");
            assert!(bounds.min_x <= 790 && bounds.max_x >= 10, "{street}");
            assert!(bounds.min_y <= 590 && bounds.max_y >= 10, "{street}");
        }
    }
}
