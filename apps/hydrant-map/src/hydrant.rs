//! Hydrant entities decoded from OpenStreetMap node tags.
//!
//! Every display value is derived from the raw tags once: enumerated tags
//! map to German labels (unknown values are shown quoted), free-text tags
//! pass through, and anything missing renders as `-`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::overpass::OverpassNode;

pub const UNKNOWN_REFERENCE: &str = "??";
pub const MISSING_VALUE: &str = "-";
pub const DEFAULT_TITLE: &str = "Hydrant";

const SURVEY_DATE_FORMAT: &str = "%d.%m.%Y";

const TAG_REFERENCE: &str = "ref";
const TAG_TYPE: &str = "fire_hydrant:type";
const TAG_POSITION: &str = "fire_hydrant:position";
const TAG_DESCRIPTION: &str = "description";
const TAG_DIAMETER: &str = "fire_hydrant:diameter";
const TAG_COUPLING_TYPE: &str = "fire_hydrant:coupling_type";
const TAG_COUPLINGS: &str = "fire_hydrant:couplings";
const TAG_COUPLINGS_LEGACY: &str = "couplings";
const TAG_OPERATOR: &str = "operator";
const TAG_WATER_SOURCE: &str = "water_source";
const TAG_SURVEY_DATE: &str = "survey:date";

/// An enumerated tag value with a fixed German display label.
pub trait TagLabel: Sized + Copy {
    fn from_tag(raw: &str) -> Option<Self>;
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrantKind {
    Underground,
    Pillar,
    Wall,
    Pipe,
    SuctionPoint,
    Pond,
}

impl TagLabel for HydrantKind {
    fn from_tag(raw: &str) -> Option<Self> {
        match raw {
            "underground" => Some(Self::Underground),
            "pillar" => Some(Self::Pillar),
            "wall" => Some(Self::Wall),
            "pipe" => Some(Self::Pipe),
            "suction_point" => Some(Self::SuctionPoint),
            "pond" => Some(Self::Pond),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Underground => "Unterflurhydrant",
            Self::Pillar => "Überflurhydrant",
            Self::Wall => "Wandanschluss",
            Self::Pipe => "Verschlossenes Rohr",
            Self::SuctionPoint => "Saugstelle",
            Self::Pond => "Teich",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrantPosition {
    Green,
    Sidewalk,
    ParkingLot,
    Street,
}

impl TagLabel for HydrantPosition {
    fn from_tag(raw: &str) -> Option<Self> {
        match raw {
            "green" => Some(Self::Green),
            "sidewalk" => Some(Self::Sidewalk),
            "parking_lot" => Some(Self::ParkingLot),
            "lane" | "street" | "roadside" => Some(Self::Street),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Green => "Grünfläche",
            Self::Sidewalk => "Bürgersteig",
            Self::ParkingLot => "Stellplatzfläche",
            Self::Street => "Straßenfläche",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterSource {
    Main,
    WaterTank,
    Pond,
    Stream,
    Groundwater,
    PoweredPump,
    Canal,
    Lake,
}

impl TagLabel for WaterSource {
    fn from_tag(raw: &str) -> Option<Self> {
        match raw {
            // values documented on the OSM wiki
            "main" => Some(Self::Main),
            "water_tank" => Some(Self::WaterTank),
            "pond" => Some(Self::Pond),
            "stream" => Some(Self::Stream),
            // values mappers use in the wild
            "groundwater" => Some(Self::Groundwater),
            "piped" | "water_works" | "wasserleitung" => Some(Self::Main),
            "powered_pump" => Some(Self::PoweredPump),
            "canal" => Some(Self::Canal),
            "lake" => Some(Self::Lake),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Main => "Trinkwassernetz",
            Self::WaterTank => "Wassertank",
            Self::Pond => "Teich",
            Self::Stream => "Bach",
            Self::Groundwater => "Grundwasser",
            Self::PoweredPump => "Pumpe",
            Self::Canal => "Kanal",
            Self::Lake => "See",
        }
    }
}

/// The tags a hydrant view cares about. Empty values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct HydrantTags {
    reference: Option<String>,
    kind: Option<String>,
    position: Option<String>,
    description: Option<String>,
    diameter: Option<String>,
    coupling_type: Option<String>,
    couplings: Option<String>,
    operator: Option<String>,
    water_source: Option<String>,
    survey_date: Option<String>,
}

impl HydrantTags {
    fn from_raw(tags: &BTreeMap<String, String>) -> Self {
        let tag = |key: &str| tags.get(key).filter(|value| !value.is_empty()).cloned();
        Self {
            reference: tag(TAG_REFERENCE),
            kind: tag(TAG_TYPE),
            position: tag(TAG_POSITION),
            description: tag(TAG_DESCRIPTION),
            diameter: tag(TAG_DIAMETER),
            coupling_type: tag(TAG_COUPLING_TYPE),
            couplings: tag(TAG_COUPLINGS).or_else(|| tag(TAG_COUPLINGS_LEGACY)),
            operator: tag(TAG_OPERATOR),
            water_source: tag(TAG_WATER_SOURCE),
            survey_date: tag(TAG_SURVEY_DATE),
        }
    }
}

/// A fire hydrant decoded from one Overpass node.
///
/// Immutable after construction; every display getter is a pure function
/// of the tags captured at decode time and never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrant {
    id: i64,
    latitude: f64,
    longitude: f64,
    reference: String,
    tags: HydrantTags,
}

impl Hydrant {
    pub fn from_node(node: OverpassNode) -> Self {
        let tags = HydrantTags::from_raw(&node.tags);
        let reference = tags
            .reference
            .clone()
            .unwrap_or_else(|| UNKNOWN_REFERENCE.to_string());
        Self {
            id: node.id,
            latitude: node.lat,
            longitude: node.lon,
            reference,
            tags,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn kind(&self) -> String {
        decode_enumerated::<HydrantKind>(self.tags.kind.as_deref())
    }

    pub fn position(&self) -> String {
        decode_enumerated::<HydrantPosition>(self.tags.position.as_deref())
    }

    pub fn description(&self) -> String {
        passthrough(self.tags.description.as_deref())
    }

    pub fn diameter(&self) -> String {
        match self.tags.diameter.as_deref() {
            None => MISSING_VALUE.to_string(),
            Some(raw) if is_numeric(raw) => format!("{raw} mm"),
            Some(raw) => raw.to_string(),
        }
    }

    pub fn coupling_type(&self) -> String {
        passthrough(self.tags.coupling_type.as_deref())
    }

    pub fn couplings(&self) -> String {
        passthrough(self.tags.couplings.as_deref())
    }

    pub fn operator(&self) -> String {
        passthrough(self.tags.operator.as_deref())
    }

    pub fn water_source(&self) -> String {
        decode_enumerated::<WaterSource>(self.tags.water_source.as_deref())
    }

    /// Survey date as `DD.MM.YYYY`, or `-` when missing or unparseable.
    pub fn survey_date(&self) -> String {
        self.tags
            .survey_date
            .as_deref()
            .and_then(parse_survey_date)
            .map(|date| date.format(SURVEY_DATE_FORMAT).to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string())
    }

    /// Title for the detail dialog: the hydrant type, or a generic label.
    pub fn title(&self) -> String {
        let kind = self.kind();
        if kind == MISSING_VALUE {
            DEFAULT_TITLE.to_string()
        } else {
            kind
        }
    }
}

fn decode_enumerated<T: TagLabel>(raw: Option<&str>) -> String {
    match raw.filter(|value| !value.is_empty()) {
        None => MISSING_VALUE.to_string(),
        Some(value) => T::from_tag(value)
            .map(|known| known.label().to_string())
            .unwrap_or_else(|| format!("\"{value}\"")),
    }
}

fn passthrough(raw: Option<&str>) -> String {
    raw.filter(|value| !value.is_empty())
        .unwrap_or(MISSING_VALUE)
        .to_string()
}

/// Whether a browser would read `raw` as a number: blank, a signed decimal
/// with optional exponent, `Infinity`, or an unsigned `0x`/`0o`/`0b` literal.
fn is_numeric(raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        return true;
    }
    if let Some((digits, radix)) = radix_literal(value) {
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    if unsigned == "Infinity" {
        return true;
    }
    // f64 parsing also takes `inf` and `nan` spellings
    unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        && value.parse::<f64>().is_ok()
}

fn radix_literal(value: &str) -> Option<(&str, u32)> {
    let (prefix, digits) = value.split_at_checked(2)?;
    match prefix {
        "0x" | "0X" => Some((digits, 16)),
        "0o" | "0O" => Some((digits, 8)),
        "0b" | "0B" => Some((digits, 2)),
        _ => None,
    }
}

fn parse_survey_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.date());
        }
    }
    if let Some((year, month)) = raw.split_once('-') {
        if is_digits(year, 4) && is_digits(month, 2) {
            return NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1);
        }
        return None;
    }
    if is_digits(raw, 4) {
        return NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1);
    }
    None
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}
