//! Identity-number codec bound to one loaded reference table.
//!
//! Layout of an 18-character number:
//!
//! ```text
//! 110101 19900307 12 3 3
//! ^area  ^birth   ^seq ^sex digit (odd = male) ^check character
//! ```
//!
//! First-generation 15-digit numbers omit the century (`900307`) and the
//! check character; they are upgraded by inserting `19` and recomputing it.

use std::path::Path;

use idcard_types::{IdentityRecord, LocationQuery, Sex};
use rand::Rng;
use tracing::debug;

use crate::checksum;
use crate::date;
use crate::error::{IdCardError, Result};
use crate::location::ReferenceTable;

#[derive(Debug, Clone)]
pub struct IdentityCodec {
    table: ReferenceTable,
}

impl IdentityCodec {
    pub fn new(table: ReferenceTable) -> Self {
        IdentityCodec { table }
    }

    pub fn load(path: &Path) -> Result<Self> {
        ReferenceTable::load(path).map(Self::new)
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Decode an 18-character number, or a 15-digit one after upgrading it.
    pub fn parse(&self, id: &str) -> Result<IdentityRecord> {
        let upgraded;
        let id = if id.chars().count() == 15 {
            upgraded = checksum::expand_short(id).ok_or(IdCardError::InvalidIdCard)?;
            upgraded.as_str()
        } else {
            id
        };

        if !checksum::check_id_card(id) {
            debug!(id, "format or check character mismatch");
            return Err(IdCardError::InvalidIdCard);
        }

        let location = self.table.resolve(&id[..6])?;

        let birth = &id[6..14];
        let birth_date =
            date::parse_compact(birth).ok_or(IdCardError::InvalidDate("invalid id card date."))?;

        Ok(IdentityRecord {
            location,
            date: format!("{}-{}-{}", &birth[..4], &birth[4..6], &birth[6..]),
            sex: Sex::from_digit(id.as_bytes()[16] - b'0'),
            constellation: date::constellation(birth_date),
        })
    }

    /// Synthesize a number for `location` born on `date` (`YYYYMMDD`).
    /// A missing `sex` is picked at random.
    pub fn generate(
        &self,
        location: &LocationQuery,
        date: &str,
        sex: Option<Sex>,
    ) -> Result<String> {
        self.generate_with_rng(&mut rand::rng(), location, date, sex)
    }

    pub fn generate_with_rng<R: Rng>(
        &self,
        rng: &mut R,
        location: &LocationQuery,
        date: &str,
        sex: Option<Sex>,
    ) -> Result<String> {
        let district = self.table.check_location(location)?;
        if date::parse_compact(date).is_none() {
            return Err(IdCardError::InvalidDate("invalid date."));
        }

        let sex = sex.unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                Sex::Male
            } else {
                Sex::Female
            }
        });
        let sequence: u8 = rng.random_range(0..100);
        // even base, odd for male
        let mut sex_digit: u8 = 2 * rng.random_range(0..=4);
        if sex == Sex::Male {
            sex_digit += 1;
        }

        let mut id = String::with_capacity(18);
        id.push_str(&district);
        id.push_str(date);
        id.push_str(&format!("{sequence:02}{sex_digit}"));
        let check = checksum::check_char(&id).ok_or(IdCardError::InvalidIdCard)?;
        id.push(check);
        Ok(id)
    }

    /// Convert a 15-digit number to 18 characters after checking that its
    /// area code resolves and its `19YYMMDD` birth date is real.
    pub fn upgrade_to_eighteen(&self, id: &str) -> Result<String> {
        if id.len() != 15 || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdCardError::InvalidIdCard);
        }

        self.table.resolve(&id[..6])?;

        let birth = format!("19{}", &id[6..12]);
        if date::parse_compact(&birth).is_none() {
            return Err(IdCardError::InvalidDate("invalid date."));
        }

        checksum::expand_short(id).ok_or(IdCardError::InvalidIdCard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::tests::sample;
    use idcard_types::Constellation;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn codec() -> IdentityCodec {
        IdentityCodec::new(sample())
    }

    // ── parse ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_eighteen() {
        let record = codec().parse("110101199003071233").unwrap();
        assert_eq!(record.location.province, "北京市");
        assert_eq!(record.location.city, "北京市");
        assert_eq!(record.location.district, "东城区");
        assert_eq!(record.location.area, "北京市 北京市 东城区");
        assert_eq!(record.date, "1990-03-07");
        // 17th digit is 3
        assert_eq!(record.sex, Sex::Male);
        assert_eq!(record.constellation, Constellation::Pisces);
    }

    #[test]
    fn test_parse_fifteen_upgrades_first() {
        let short = codec().parse("110101900307123").unwrap();
        let long = codec().parse("110101199003071233").unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn test_parse_sex_follows_parity_even_with_x_check() {
        // 17th digit 2, check character X
        let record = codec().parse("11010519491231002X").unwrap();
        assert_eq!(record.sex, Sex::Female);
        assert_eq!(record.location.district, "朝阳区");
        assert_eq!(record.constellation, Constellation::Capricorn);
        assert_eq!(codec().parse("11010519491231002x").unwrap(), record);
    }

    #[test]
    fn test_parse_special_city() {
        let record = codec().parse("441900199001011231").unwrap();
        assert_eq!(record.location.district, "");
        assert_eq!(record.location.area, "广东省 东莞市");
        assert_eq!(record.constellation, Constellation::Capricorn);
    }

    #[test]
    fn test_parse_rejects_bad_check_char() {
        assert_eq!(
            codec().parse("11010119900307123X"),
            Err(IdCardError::InvalidIdCard)
        );
        assert_eq!(codec().parse("abc"), Err(IdCardError::InvalidIdCard));
        assert_eq!(
            codec().parse("11010190030712X"),
            Err(IdCardError::InvalidIdCard)
        );
    }

    #[test]
    fn test_parse_unknown_city() {
        let body = "11999919900307123";
        let id = format!("{body}{}", checksum::check_char(body).unwrap());
        let err = codec().parse(&id).unwrap_err();
        assert_eq!(err, IdCardError::InvalidLocation("invalid city."));
    }

    #[test]
    fn test_parse_impossible_date() {
        let body = "11010119000229123";
        let id = format!("{body}{}", checksum::check_char(body).unwrap());
        assert_eq!(
            codec().parse(&id),
            Err(IdCardError::InvalidDate("invalid id card date."))
        );

        let body = "11010120000229123";
        let id = format!("{body}{}", checksum::check_char(body).unwrap());
        assert_eq!(codec().parse(&id).unwrap().date, "2000-02-29");
    }

    // ── generate ─────────────────────────────────────────────────────

    #[test]
    fn test_generate_male_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        let query = LocationQuery::Parts {
            province: "11".into(),
            city: "1101".into(),
            district: "110101".into(),
        };
        let id = codec()
            .generate_with_rng(&mut rng, &query, "19900307", Some(Sex::Male))
            .unwrap();
        assert_eq!(id.len(), 18);
        assert!(id.starts_with("11010119900307"));
        assert!(checksum::check_id_card(&id));
        let record = codec().parse(&id).unwrap();
        assert_eq!(record.sex, Sex::Male);
        assert_eq!(record.date, "1990-03-07");
    }

    #[test]
    fn test_generate_special_city() {
        let id = codec()
            .generate(&"441900".into(), "20000229", Some(Sex::Female))
            .unwrap();
        let record = codec().parse(&id).unwrap();
        assert_eq!(record.location.area, "广东省 东莞市");
        assert_eq!(record.sex, Sex::Female);

        assert_eq!(
            codec().generate(&"441901".into(), "20000229", None),
            Err(IdCardError::InvalidLocation("invalid location."))
        );

        // a district outside the special city would not parse back
        let foreign = LocationQuery::Parts {
            province: "44".into(),
            city: "4419".into(),
            district: "990000".into(),
        };
        assert_eq!(
            codec().generate(&foreign, "19900307", Some(Sex::Male)),
            Err(IdCardError::InvalidLocation("invalid location."))
        );
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        assert_eq!(
            codec().generate(&"110199".into(), "19900307", None),
            Err(IdCardError::InvalidLocation("invalid location."))
        );
        assert_eq!(
            codec().generate(&"110101".into(), "19000229", None),
            Err(IdCardError::InvalidDate("invalid date."))
        );
        assert_eq!(
            codec().generate(&"110101".into(), "199003", None),
            Err(IdCardError::InvalidDate("invalid date."))
        );
    }

    #[test]
    fn test_generate_random_sex_is_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let id = codec()
                .generate_with_rng(&mut rng, &"440106".into(), "19851224", None)
                .unwrap();
            assert!(codec().parse(&id).is_ok());
        }
    }

    // ── upgrade_to_eighteen ──────────────────────────────────────────

    #[test]
    fn test_upgrade() {
        assert_eq!(
            codec().upgrade_to_eighteen("110101900307123").unwrap(),
            "110101199003071233"
        );
    }

    #[test]
    fn test_upgrade_failures() {
        let c = codec();
        assert_eq!(
            c.upgrade_to_eighteen("110101199003071233"),
            Err(IdCardError::InvalidIdCard)
        );
        assert_eq!(
            c.upgrade_to_eighteen("11010190030712x"),
            Err(IdCardError::InvalidIdCard)
        );
        assert_eq!(
            c.upgrade_to_eighteen("990101900307123").unwrap_err().code(),
            idcard_types::ErrorCode::InvalidLocation
        );
        assert_eq!(
            c.upgrade_to_eighteen("110101000229123"),
            Err(IdCardError::InvalidDate("invalid date."))
        );
    }

    fn district_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["110101", "110105", "440106", "441900"])
    }

    proptest! {
        /// Generated numbers parse back to the requested date, sex and area.
        #[test]
        fn generate_then_parse(
            district in district_strategy(),
            year in 1900i32..2030,
            month in 1u32..=12,
            day in 1u32..=28,
            male in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let codec = codec();
            let mut rng = StdRng::seed_from_u64(seed);
            let sex = if male { Sex::Male } else { Sex::Female };
            let date = format!("{year:04}{month:02}{day:02}");
            let id = codec
                .generate_with_rng(&mut rng, &district.into(), &date, Some(sex))
                .unwrap();
            let record = codec.parse(&id).unwrap();
            prop_assert_eq!(record.date, format!("{year:04}-{month:02}-{day:02}"));
            prop_assert_eq!(record.sex, sex);
            prop_assert_eq!(record.location, codec.table().resolve(district).unwrap());
        }

        /// Any 15-digit number over a known area with a real date upgrades
        /// to a number that parses.
        #[test]
        fn upgrade_then_parse(
            district in district_strategy(),
            yy in 0u32..100,
            month in 1u32..=12,
            day in 1u32..=28,
            seq in 0u32..1000,
        ) {
            let codec = codec();
            let short = format!("{district}{yy:02}{month:02}{day:02}{seq:03}");
            let long = codec.upgrade_to_eighteen(&short).unwrap();
            prop_assert_eq!(codec.parse(&long).unwrap(), codec.parse(&short).unwrap());
        }
    }
}
