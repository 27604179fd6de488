//! Value types for Wikibase snaks.
//!
//! The set of datatypes is closed: nine known tags, plus [`DataType::Other`]
//! which carries any tag this crate does not model so it can be preserved.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use num_bigint::{BigInt, Sign};
use url::Url;

use crate::error::DecodeError;
use crate::model::{ItemId, PropertyId};
use crate::util::datetime::{format_wire_time, parse_wire_time};

/// Datatype tag of a snak (the `datatype` attribute).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `wikibase-item`
    Item,
    /// `wikibase-property`
    Property,
    /// `commonsMedia`
    CommonsMedia,
    /// `string`
    String,
    /// `url`
    Url,
    /// `monolingualtext`
    MonolingualText,
    /// `time`
    Time,
    /// `globe-coordinate`
    GlobeCoordinate,
    /// `quantity`
    Quantity,
    /// Any tag without a value model, kept verbatim.
    Other(String),
}

impl DataType {
    /// Maps a wire tag to a datatype. Never fails: unknown tags become
    /// [`DataType::Other`].
    pub fn from_wire(tag: &str) -> DataType {
        const KNOWN: [(&str, DataType); 9] = [
            ("wikibase-item", DataType::Item),
            ("wikibase-property", DataType::Property),
            ("commonsMedia", DataType::CommonsMedia),
            ("string", DataType::String),
            ("url", DataType::Url),
            ("monolingualtext", DataType::MonolingualText),
            ("time", DataType::Time),
            ("globe-coordinate", DataType::GlobeCoordinate),
            ("quantity", DataType::Quantity),
        ];

        KNOWN
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .map(|(_, data_type)| data_type)
            .unwrap_or_else(|| DataType::Other(tag.to_string()))
    }

    /// Returns the wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Item => "wikibase-item",
            DataType::Property => "wikibase-property",
            DataType::CommonsMedia => "commonsMedia",
            DataType::String => "string",
            DataType::Url => "url",
            DataType::MonolingualText => "monolingualtext",
            DataType::Time => "time",
            DataType::GlobeCoordinate => "globe-coordinate",
            DataType::Quantity => "quantity",
            DataType::Other(tag) => tag,
        }
    }

    /// Returns the `type` of the datavalue carrying this datatype, or `None`
    /// for unknown datatypes.
    pub fn value_type(&self) -> Option<&'static str> {
        match self {
            DataType::Item | DataType::Property => Some("wikibase-entityid"),
            DataType::CommonsMedia | DataType::String | DataType::Url => Some("string"),
            DataType::MonolingualText => Some("monolingualtext"),
            DataType::Time => Some("time"),
            DataType::GlobeCoordinate => Some("globecoordinate"),
            DataType::Quantity => Some("quantity"),
            DataType::Other(_) => None,
        }
    }

    /// Returns true for the nine modelled datatypes.
    pub fn is_known(&self) -> bool {
        !matches!(self, DataType::Other(_))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity of a time value (the `precision` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TimePrecision {
    GigaYear = 0,
    HundredMegaYear = 1,
    TenMegaYear = 2,
    MegaYear = 3,
    HundredKiloYear = 4,
    TenKiloYear = 5,
    Millennium = 6,
    Century = 7,
    Decade = 8,
    Year = 9,
    Month = 10,
    Day = 11,
    Hour = 12,
    Minute = 13,
    Second = 14,
}

impl TimePrecision {
    /// Creates a precision from its wire code.
    pub fn from_u8(v: u8) -> Option<TimePrecision> {
        Some(match v {
            0 => TimePrecision::GigaYear,
            1 => TimePrecision::HundredMegaYear,
            2 => TimePrecision::TenMegaYear,
            3 => TimePrecision::MegaYear,
            4 => TimePrecision::HundredKiloYear,
            5 => TimePrecision::TenKiloYear,
            6 => TimePrecision::Millennium,
            7 => TimePrecision::Century,
            8 => TimePrecision::Decade,
            9 => TimePrecision::Year,
            10 => TimePrecision::Month,
            11 => TimePrecision::Day,
            12 => TimePrecision::Hour,
            13 => TimePrecision::Minute,
            14 => TimePrecision::Second,
            _ => return None,
        })
    }

    /// Returns the wire code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Era of a time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Era {
    CommonEra,
    BeforeCommonEra,
}

/// A point in time at some precision.
///
/// `year` is signed as written on the wire. A negative year is BCE and its
/// magnitude is the year of that era: `-0044` is 44 BCE, not the
/// astronomical year -44 (45 BCE). `month`, `day` and `time_of_day` are only
/// set when the precision covers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time {
    pub year: BigInt,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub time_of_day: Option<NaiveTime>,
    pub precision: TimePrecision,
    /// Tolerance before the instant, in units of `precision`.
    pub before: u32,
    /// Tolerance after the instant, in units of `precision`.
    pub after: u32,
    /// UTC offset in minutes.
    pub timezone: i16,
    pub calendar_model: Option<Url>,
}

impl Time {
    /// Creates a time carrying only a year.
    pub fn new(year: impl Into<BigInt>, precision: TimePrecision) -> Self {
        Self {
            year: year.into(),
            month: None,
            day: None,
            time_of_day: None,
            precision,
            before: 0,
            after: 0,
            timezone: 0,
            calendar_model: None,
        }
    }

    /// Parses a wire time string such as `+1969-07-20T00:00:00Z`.
    pub fn from_wire(value: &str, precision: TimePrecision) -> Result<Self, DecodeError> {
        let parsed = parse_wire_time(value, precision).map_err(|e| DecodeError::InvalidTime {
            value: value.to_string(),
            precision: precision.as_u8(),
            reason: e.message,
        })?;
        Ok(Self {
            year: parsed.year,
            month: parsed.month,
            day: parsed.day,
            time_of_day: parsed.time_of_day,
            ..Self::new(0, precision)
        })
    }

    /// Sets the tolerance pair.
    pub fn with_tolerance(mut self, before: u32, after: u32) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    /// Sets the calendar model.
    pub fn with_calendar_model(mut self, calendar_model: Url) -> Self {
        self.calendar_model = Some(calendar_model);
        self
    }

    /// Sets the UTC offset in minutes.
    pub fn with_timezone(mut self, timezone: i16) -> Self {
        self.timezone = timezone;
        self
    }

    /// Returns the era implied by the sign of the year.
    ///
    /// Year zero is always CE: the wire form `-0000` is rejected when parsed.
    pub fn era(&self) -> Era {
        if self.year.sign() == Sign::Minus {
            Era::BeforeCommonEra
        } else {
            Era::CommonEra
        }
    }

    /// Returns the year counted within its era (always non-negative).
    pub fn year_of_era(&self) -> BigInt {
        BigInt::from_biguint(Sign::Plus, self.year.magnitude().clone())
    }

    /// Returns the proleptic Gregorian date, if the precision is at least a
    /// month and the year fits chrono's range.
    ///
    /// Month-precision values are placed on the first of the month. BCE
    /// years are shifted onto chrono's astronomical numbering here, and only
    /// here.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        if self.precision < TimePrecision::Month {
            return None;
        }
        let year_of_era = i32::try_from(self.year.magnitude()).ok()?;
        let year = match self.era() {
            Era::CommonEra => year_of_era,
            Era::BeforeCommonEra => 1 - year_of_era,
        };
        let day = if self.precision == TimePrecision::Month {
            1
        } else {
            self.day?
        };
        NaiveDate::from_ymd_opt(year, u32::from(self.month?), u32::from(day))
    }

    /// Formats the wire time string.
    pub fn to_wire_string(&self) -> String {
        format_wire_time(
            &self.year,
            self.month,
            self.day,
            self.time_of_day,
            self.precision,
        )
    }
}

/// A geographic coordinate on some globe.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub precision: Option<f64>,
    /// Globe item; Earth is assumed when `None`.
    pub globe: Option<ItemId>,
}

impl GlobeCoordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range degrees.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DecodeError> {
        let latitude = finite("latitude", latitude)?;
        let longitude = finite("longitude", longitude)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DecodeError::OutOfRange {
                field: "latitude",
                value: latitude,
            });
        }
        if !(-360.0..=360.0).contains(&longitude) {
            return Err(DecodeError::OutOfRange {
                field: "longitude",
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            precision: None,
            globe: None,
        })
    }

    /// Sets the precision in degrees.
    pub fn with_precision(mut self, precision: f64) -> Result<Self, DecodeError> {
        self.precision = Some(finite("precision", precision)?);
        Ok(self)
    }

    /// Sets the globe item.
    pub fn with_globe(mut self, globe: ItemId) -> Self {
        self.globe = Some(globe);
        self
    }
}

/// An amount with bounds and an optional unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub amount: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Unit item; dimensionless when `None`.
    pub unit: Option<ItemId>,
}

impl Quantity {
    /// Creates an exact quantity (both bounds equal the amount).
    pub fn new(amount: f64) -> Result<Self, DecodeError> {
        let amount = finite("amount", amount)?;
        Ok(Self {
            amount,
            lower_bound: amount,
            upper_bound: amount,
            unit: None,
        })
    }

    /// Sets the bounds.
    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Result<Self, DecodeError> {
        self.lower_bound = finite("lowerBound", lower_bound)?;
        self.upper_bound = finite("upperBound", upper_bound)?;
        Ok(self)
    }

    /// Sets the unit item.
    pub fn with_unit(mut self, unit: ItemId) -> Self {
        self.unit = Some(unit);
        self
    }
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, DecodeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DecodeError::NonFiniteNumber { field, value })
    }
}

/// A typed snak value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Link to an item.
    Item(ItemId),
    /// Link to a property.
    Property(PropertyId),
    /// File name on Wikimedia Commons.
    CommonsMedia(String),
    /// Plain string.
    String(String),
    /// Absolute URL.
    Url(Url),
    /// Text in a given language.
    MonolingualText { language: String, text: String },
    Time(Time),
    GlobeCoordinate(GlobeCoordinate),
    Quantity(Quantity),
}

impl Value {
    /// Returns the datatype this value belongs to.
    ///
    /// `String` maps to `string`; other string-shaped datatypes cannot be
    /// told apart from the value alone.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Item(_) => DataType::Item,
            Value::Property(_) => DataType::Property,
            Value::CommonsMedia(_) => DataType::CommonsMedia,
            Value::String(_) => DataType::String,
            Value::Url(_) => DataType::Url,
            Value::MonolingualText { .. } => DataType::MonolingualText,
            Value::Time(_) => DataType::Time,
            Value::GlobeCoordinate(_) => DataType::GlobeCoordinate,
            Value::Quantity(_) => DataType::Quantity,
        }
    }

    /// Creates a URL value, rejecting anything that is not an absolute URL.
    pub fn url(raw: &str) -> Result<Value, DecodeError> {
        Url::parse(raw)
            .map(Value::Url)
            .map_err(|e| DecodeError::InvalidUrl {
                field: "url",
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    /// Creates a monolingual text value. The language code must be non-empty.
    pub fn monolingual(language: &str, text: &str) -> Result<Value, DecodeError> {
        if language.is_empty() {
            return Err(DecodeError::missing_attribute("value", "language"));
        }
        Ok(Value::MonolingualText {
            language: language.to_string(),
            text: text.to_string(),
        })
    }

    /// Returns the item if this is an item value.
    pub fn as_item(&self) -> Option<&ItemId> {
        match self {
            Value::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Returns the text of string-shaped values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::CommonsMedia(s) => Some(s),
            Value::Url(url) => Some(url.as_str()),
            Value::MonolingualText { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Validates this value according to Wikibase rules.
    ///
    /// Returns an error description if invalid, None if valid.
    pub fn validate(&self) -> Option<&'static str> {
        match self {
            Value::GlobeCoordinate(c) => {
                if !c.latitude.is_finite() || !c.longitude.is_finite() {
                    return Some("non-finite coordinate");
                }
                if !(-90.0..=90.0).contains(&c.latitude) {
                    return Some("latitude out of range [-90, +90]");
                }
                if !(-360.0..=360.0).contains(&c.longitude) {
                    return Some("longitude out of range [-360, +360]");
                }
                if let Some(p) = c.precision {
                    if !p.is_finite() {
                        return Some("non-finite coordinate precision");
                    }
                }
            }
            Value::Quantity(q) => {
                if !q.amount.is_finite() || !q.lower_bound.is_finite() || !q.upper_bound.is_finite() {
                    return Some("non-finite quantity");
                }
                if q.lower_bound > q.amount || q.amount > q.upper_bound {
                    return Some("quantity amount outside its bounds");
                }
            }
            Value::Time(t) => {
                if t.precision >= TimePrecision::Month && t.month.is_none() {
                    return Some("time precision requires a month");
                }
                if t.precision >= TimePrecision::Day && t.day.is_none() {
                    return Some("time precision requires a day");
                }
            }
            Value::MonolingualText { language, .. } => {
                if language.is_empty() {
                    return Some("empty language code");
                }
            }
            _ => {}
        }
        None
    }
}

impl From<ItemId> for Value {
    fn from(item: ItemId) -> Self {
        Value::Item(item)
    }
}

impl From<PropertyId> for Value {
    fn from(property: PropertyId) -> Self {
        Value::Property(property)
    }
}

impl From<Time> for Value {
    fn from(time: Time) -> Self {
        Value::Time(time)
    }
}

impl From<GlobeCoordinate> for Value {
    fn from(coordinate: GlobeCoordinate) -> Self {
        Value::GlobeCoordinate(coordinate)
    }
}

impl From<Quantity> for Value {
    fn from(quantity: Quantity) -> Self {
        Value::Quantity(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_datatype_tags() {
        for tag in [
            "wikibase-item",
            "wikibase-property",
            "commonsMedia",
            "string",
            "url",
            "monolingualtext",
            "time",
            "globe-coordinate",
            "quantity",
        ] {
            let data_type = DataType::from_wire(tag);
            assert!(data_type.is_known(), "{tag}");
            assert_eq!(data_type.as_str(), tag);
        }

        assert_eq!(DataType::from_wire("commonsmedia"), DataType::CommonsMedia);
        assert_eq!(
            DataType::from_wire("geo-shape"),
            DataType::Other("geo-shape".to_string())
        );
        assert_eq!(DataType::from_wire("geo-shape").as_str(), "geo-shape");
        assert_eq!(DataType::from_wire("geo-shape").value_type(), None);
        assert_eq!(DataType::Url.value_type(), Some("string"));
    }

    #[test]
    fn test_precision_codes() {
        assert_eq!(TimePrecision::from_u8(9), Some(TimePrecision::Year));
        assert_eq!(TimePrecision::from_u8(11), Some(TimePrecision::Day));
        assert_eq!(TimePrecision::from_u8(15), None);
        for code in 0..=14u8 {
            assert_eq!(TimePrecision::from_u8(code).unwrap().as_u8(), code);
        }
    }

    #[test]
    fn test_time_era() {
        let t = Time::from_wire("-0044-03-15T00:00:00Z", TimePrecision::Day).unwrap();
        assert_eq!(t.era(), Era::BeforeCommonEra);
        assert_eq!(t.year_of_era(), BigInt::from(44));
        // 44 BCE is astronomical year -43
        assert_eq!(t.calendar_date(), NaiveDate::from_ymd_opt(-43, 3, 15));

        let t = Time::from_wire("+1969-07-20T00:00:00Z", TimePrecision::Day).unwrap();
        assert_eq!(t.era(), Era::CommonEra);
        assert_eq!(t.calendar_date(), NaiveDate::from_ymd_opt(1969, 7, 20));
    }

    #[test]
    fn test_time_bce_leap_day() {
        let t = Time::from_wire("-0045-02-29T00:00:00Z", TimePrecision::Day).unwrap();
        assert_eq!(t.era(), Era::BeforeCommonEra);
        assert_eq!(t.calendar_date(), NaiveDate::from_ymd_opt(-44, 2, 29));
        assert_eq!(t.to_wire_string(), "-0045-02-29T00:00:00Z");

        let err = Time::from_wire("-0044-02-29T00:00:00Z", TimePrecision::Day).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_time_negative_year_zero() {
        let err = Time::from_wire("-0000-00-00T00:00:00Z", TimePrecision::Year).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);
        let t = Time::from_wire("+0000-00-00T00:00:00Z", TimePrecision::Year).unwrap();
        assert_eq!(t.era(), Era::CommonEra);
    }

    #[test]
    fn test_time_month_placeholder() {
        let t = Time::from_wire("+1969-07-20T00:00:00Z", TimePrecision::Month).unwrap();
        assert_eq!(t.day, None);
        assert_eq!(t.calendar_date(), NaiveDate::from_ymd_opt(1969, 7, 1));
        assert_eq!(t.to_wire_string(), "+1969-07-00T00:00:00Z");

        let t = Time::new(1969, TimePrecision::Year);
        assert_eq!(t.calendar_date(), None);
    }

    #[test]
    fn test_time_invalid() {
        let err = Time::from_wire("yesterday", TimePrecision::Day).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_url_value() {
        assert!(Value::url("https://www.wikidata.org/wiki/Q42").is_ok());
        assert!(Value::url("/wiki/Q42").is_err());
        assert!(Value::url("not a url").is_err());
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(GlobeCoordinate::new(52.5, 13.4).is_ok());
        assert!(GlobeCoordinate::new(91.0, 0.0).is_err());
        assert!(GlobeCoordinate::new(0.0, 361.0).is_err());
        assert!(GlobeCoordinate::new(f64::NAN, 0.0).is_err());
        assert!(GlobeCoordinate::new(0.0, 0.0).unwrap().with_precision(f64::INFINITY).is_err());
    }

    #[test]
    fn test_quantity_validation() {
        let q = Quantity::new(10.0).unwrap();
        assert_eq!(q.lower_bound, 10.0);
        assert!(Value::Quantity(q.clone()).validate().is_none());

        let q = q.with_bounds(11.0, 12.0).unwrap();
        assert!(Value::Quantity(q).validate().is_some());
        assert!(Quantity::new(f64::NAN).is_err());
    }

    #[test]
    fn test_value_data_type() {
        assert_eq!(Value::Item(ItemId::from_numeric(5)).data_type(), DataType::Item);
        assert_eq!(Value::String("x".into()).data_type(), DataType::String);
        assert_eq!(
            Value::monolingual("en", "hello").unwrap().data_type(),
            DataType::MonolingualText
        );
        assert!(Value::monolingual("", "hello").is_err());
    }
}
