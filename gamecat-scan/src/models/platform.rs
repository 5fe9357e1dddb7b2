//! Supported game platforms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a scanned game folder belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    #[serde(rename = "pc")]
    Pc,
    #[serde(rename = "playstation")]
    PlayStation,
    #[serde(rename = "playstation-2")]
    PlayStation2,
    #[serde(rename = "playstation-3")]
    PlayStation3,
    #[serde(rename = "playstation-4")]
    PlayStation4,
    #[serde(rename = "playstation-5")]
    PlayStation5,
    #[serde(rename = "xbox-360")]
    Xbox360,
    #[serde(rename = "xbox-one")]
    XboxOne,
    #[serde(rename = "xbox-series")]
    XboxSeries,
    #[serde(rename = "nintendo-switch")]
    NintendoSwitch,
}

impl Platform {
    pub const ALL: [Platform; 10] = [
        Platform::Pc,
        Platform::PlayStation,
        Platform::PlayStation2,
        Platform::PlayStation3,
        Platform::PlayStation4,
        Platform::PlayStation5,
        Platform::Xbox360,
        Platform::XboxOne,
        Platform::XboxSeries,
        Platform::NintendoSwitch,
    ];

    /// Stable slug used in config files, the CLI and the catalog
    pub fn slug(self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::PlayStation => "playstation",
            Platform::PlayStation2 => "playstation-2",
            Platform::PlayStation3 => "playstation-3",
            Platform::PlayStation4 => "playstation-4",
            Platform::PlayStation5 => "playstation-5",
            Platform::Xbox360 => "xbox-360",
            Platform::XboxOne => "xbox-one",
            Platform::XboxSeries => "xbox-series",
            Platform::NintendoSwitch => "nintendo-switch",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::PlayStation => "PlayStation",
            Platform::PlayStation2 => "PlayStation 2",
            Platform::PlayStation3 => "PlayStation 3",
            Platform::PlayStation4 => "PlayStation 4",
            Platform::PlayStation5 => "PlayStation 5",
            Platform::Xbox360 => "Xbox 360",
            Platform::XboxOne => "Xbox One",
            Platform::XboxSeries => "Xbox Series S/X",
            Platform::NintendoSwitch => "Nintendo Switch",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Platform::ALL.iter().map(|p| p.slug()).collect();
                format!("unknown platform '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
