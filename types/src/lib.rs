use serde::{Deserialize, Serialize};
use std::fmt;

// ── Sex ──────────────────────────────────────────────────────────────────

/// Sex encoded in the 17th digit of an identity number: odd is male,
/// even is female.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Decode the sex digit (position 16).
    pub fn from_digit(digit: u8) -> Self {
        if digit % 2 == 1 { Self::Male } else { Self::Female }
    }

    /// Caller-facing numeric code: 1 = male, 2 = female.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::Male => "男",
            Self::Female => "女",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Constellation ────────────────────────────────────────────────────────

/// Western zodiac sign derived from the birth month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constellation {
    Aquarius,
    Pisces,
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
}

impl Constellation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
        }
    }

    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::Aquarius => "水瓶座",
            Self::Pisces => "双鱼座",
            Self::Aries => "白羊座",
            Self::Taurus => "金牛座",
            Self::Gemini => "双子座",
            Self::Cancer => "巨蟹座",
            Self::Leo => "狮子座",
            Self::Virgo => "处女座",
            Self::Libra => "天秤座",
            Self::Scorpio => "天蝎座",
            Self::Sagittarius => "射手座",
            Self::Capricorn => "摩羯座",
        }
    }
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Resolved location ────────────────────────────────────────────────────

/// Province / city / district names resolved from a 6-digit area code.
///
/// `district` is empty for cities without a district level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub province: String,
    pub city: String,
    pub district: String,
    /// Non-empty names joined by a single space.
    pub area: String,
}

impl Location {
    pub fn new(province: &str, city: &str, district: &str) -> Self {
        let area = [province, city, district]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        Location {
            province: province.to_string(),
            city: city.to_string(),
            district: district.to_string(),
            area,
        }
    }
}

// ── Location query (generation input) ────────────────────────────────────

/// Location to synthesize an identity number for: either explicit codes or
/// a single district code from which the province and city are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationQuery {
    Parts {
        province: String,
        city: String,
        district: String,
    },
    Code(String),
}

impl LocationQuery {
    /// Split into `(province, city, district)` codes.
    ///
    /// A bare code yields its first 2 characters, its first 4 characters and
    /// the whole string.
    pub fn codes(&self) -> (String, String, String) {
        match self {
            Self::Parts {
                province,
                city,
                district,
            } => (province.clone(), city.clone(), district.clone()),
            Self::Code(code) => (
                code.chars().take(2).collect(),
                code.chars().take(4).collect(),
                code.clone(),
            ),
        }
    }
}

impl From<&str> for LocationQuery {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

impl From<String> for LocationQuery {
    fn from(code: String) -> Self {
        Self::Code(code)
    }
}

// ── Parse result ─────────────────────────────────────────────────────────

/// Everything decoded from a valid identity number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(flatten)]
    pub location: Location,
    /// Birth date, `YYYY-MM-DD`.
    pub date: String,
    pub sex: Sex,
    pub constellation: Constellation,
}

// ── Error state ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    #[default]
    Success,
    LocationFileNotExists,
    InvalidIdCard,
    InvalidLocation,
    InvalidDate,
}

impl ErrorCode {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::LocationFileNotExists => 1,
            Self::InvalidIdCard => 2,
            Self::InvalidLocation => 3,
            Self::InvalidDate => 4,
        }
    }
}

/// Outcome of the most recent operation. Overwritten, never accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastError {
    pub code: ErrorCode,
    pub message: String,
}
