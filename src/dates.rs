use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

use crate::error::ApiError;

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// `YYYY-MM-DD` serialization for `Date` fields: `#[serde(with = "crate::dates::iso_date")]`.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(d: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        Date::parse(raw.trim(), super::ISO_DATE).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(d: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) if !raw.trim().is_empty() => {
                    Date::parse(raw.trim(), super::super::ISO_DATE)
                        .map(Some)
                        .map_err(serde::de::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}

pub fn parse_date(field: &str, raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw.trim(), ISO_DATE)
        .map_err(|_| ApiError::bad_request(format!("{field} must be a date in YYYY-MM-DD format")))
}

pub fn format_date(d: Date) -> String {
    d.format(ISO_DATE).unwrap_or_else(|_| d.to_string())
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Whole years between `birth` and `on`; `None` for a birth date in the future.
pub fn age_on(birth: Date, on: Date) -> Option<u32> {
    let mut years = on.year() - birth.year();
    if (on.month() as u8, on.day()) < (birth.month() as u8, birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
