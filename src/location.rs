//! Hierarchical reference table: province (2 digits) → city (4 digits) →
//! district (6 digits), keyed by code.
//!
//! The file is produced offline by the data-acquisition tool. Each level is
//! an object keyed by code whose values carry a `name` and, above the
//! district level, a `list` of children. Cities without districts carry an
//! empty `list`, which the tool writes as `[]` rather than `{}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use idcard_types::{Location, LocationQuery};
use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{IdCardError, Result};

/// Prefecture-level cities with no district level: 东莞 (4419), 中山 (4420),
/// 儋州 (4604), 嘉峪关 (6202).
pub const SPECIAL_CITIES: [&str; 4] = ["4419", "4420", "4604", "6202"];

pub fn is_special_city(code: &str) -> bool {
    SPECIAL_CITIES.contains(&code)
}

// ── Table entries ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceEntry {
    pub name: String,
    #[serde(default, deserialize_with = "code_map")]
    pub list: BTreeMap<String, CityEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    #[serde(default, deserialize_with = "code_map")]
    pub list: BTreeMap<String, DistrictEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictEntry {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapOrSeq<T> {
    Map(BTreeMap<String, T>),
    Seq(Vec<IgnoredAny>),
}

/// Accept `{}`-style maps and the empty `[]` the data tool emits for
/// childless entries.
fn code_map<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match MapOrSeq::deserialize(deserializer)? {
        MapOrSeq::Map(map) => Ok(map),
        MapOrSeq::Seq(seq) if seq.is_empty() => Ok(BTreeMap::new()),
        MapOrSeq::Seq(_) => Err(de::Error::custom("expected an object keyed by code")),
    }
}

// ── Reference table ──────────────────────────────────────────────────────

/// Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    provinces: BTreeMap<String, ProvinceEntry>,
}

impl ReferenceTable {
    /// Read and decode the table at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "cannot read location file");
            IdCardError::LocationFileNotExists("location file does not exist.".into())
        })?;
        let table = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            provinces = table.provinces.len(),
            "loaded location file"
        );
        Ok(table)
    }

    /// Decode a table from JSON text. Empty input, malformed JSON and an
    /// empty top-level object are all rejected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let invalid =
            || IdCardError::LocationFileNotExists("location file is empty or invalid.".into());
        if json.trim().is_empty() {
            return Err(invalid());
        }
        let table: ReferenceTable = serde_json::from_str(json).map_err(|e| {
            debug!(error = %e, "cannot decode location file");
            invalid()
        })?;
        if table.provinces.is_empty() {
            return Err(invalid());
        }
        table.warn_on_inconsistent_codes();
        Ok(table)
    }

    pub fn provinces(&self) -> &BTreeMap<String, ProvinceEntry> {
        &self.provinces
    }

    pub fn province(&self, code: &str) -> Option<&ProvinceEntry> {
        self.provinces.get(code)
    }

    pub fn city(&self, code: &str) -> Option<&CityEntry> {
        self.province(code.get(..2)?)?.list.get(code)
    }

    /// Resolve a 6-digit area code to names.
    ///
    /// Special cities resolve with an empty district and skip the district
    /// lookup entirely.
    pub fn resolve(&self, area_code: &str) -> Result<Location> {
        let province_code = area_code
            .get(..2)
            .ok_or(IdCardError::InvalidLocation("invalid province."))?;
        let city_code = area_code
            .get(..4)
            .ok_or(IdCardError::InvalidLocation("invalid city."))?;

        let province = self
            .province(province_code)
            .ok_or(IdCardError::InvalidLocation("invalid province."))?;
        let city = province
            .list
            .get(city_code)
            .ok_or(IdCardError::InvalidLocation("invalid city."))?;

        let district = if is_special_city(city_code) {
            ""
        } else {
            city.list
                .get(area_code)
                .map(|d| d.name.as_str())
                .ok_or(IdCardError::InvalidLocation("invalid district."))?
        };

        Ok(Location::new(&province.name, &city.name, district))
    }

    /// Validate a generation target and return the 6-digit district code to
    /// embed.
    ///
    /// Province and city must exist and each code must extend its parent. A
    /// special city accepts any 6-digit district code ending in `00`; any
    /// other city requires the district to exist under it.
    pub fn check_location(&self, query: &LocationQuery) -> Result<String> {
        const INVALID: IdCardError = IdCardError::InvalidLocation("invalid location.");
        let (province, city, district) = query.codes();

        let province_entry = self.province(&province).ok_or(INVALID)?;
        let city_entry = province_entry.list.get(&city).ok_or(INVALID)?;
        if !city.starts_with(province.as_str()) || !district.starts_with(city.as_str()) {
            return Err(INVALID);
        }

        if is_special_city(&city) {
            let well_formed = district.len() == 6
                && district.bytes().all(|b| b.is_ascii_digit())
                && district.ends_with("00");
            return if well_formed { Ok(district) } else { Err(INVALID) };
        }

        if city_entry.list.contains_key(&district) {
            Ok(district)
        } else {
            Err(INVALID)
        }
    }

    /// Rows whose code does not extend the parent code are kept but reported.
    fn warn_on_inconsistent_codes(&self) {
        for (p_code, province) in &self.provinces {
            if p_code.len() != 2 {
                warn!(code = %p_code, "province code is not 2 digits");
            }
            for (c_code, city) in &province.list {
                if c_code.len() != 4 || !c_code.starts_with(p_code.as_str()) {
                    warn!(
                        code = %c_code,
                        parent = %p_code,
                        "city code does not extend its province"
                    );
                }
                for d_code in city.list.keys() {
                    if d_code.len() != 6 || !d_code.starts_with(c_code.as_str()) {
                        warn!(
                            code = %d_code,
                            parent = %c_code,
                            "district code does not extend its city"
                        );
                    }
                }
            }
        }
    }
}
