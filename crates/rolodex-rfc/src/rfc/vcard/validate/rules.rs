//! Per-property rule table.
//!
//! Each property name maps to the versions that define it and one rule per
//! version range. Names missing from the table are extensions: they are
//! defined everywhere and only get the global parameter checks.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use super::shape;
use crate::rfc::vcard::core::{VCardParameter, VCardVersion, find_param};

/// A `VALUE` parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Uri,
    Date,
    Time,
    DateTime,
    DateAndOrTime,
    Timestamp,
    Boolean,
    Integer,
    Float,
    UtcOffset,
    LanguageTag,
    /// Inline payload (3.0 `binary`, 2.1 `inline`).
    Binary,
}

impl ValueType {
    /// Parses a `VALUE` parameter, accepting the legacy spellings `datetime`,
    /// `url`, `cid`, `content-id` and `inline`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let value = match s.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "uri" | "url" | "cid" | "content-id" => Self::Uri,
            "date" => Self::Date,
            "time" => Self::Time,
            "date-time" | "datetime" => Self::DateTime,
            "date-and-or-time" => Self::DateAndOrTime,
            "timestamp" => Self::Timestamp,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "utc-offset" => Self::UtcOffset,
            "language-tag" => Self::LanguageTag,
            "binary" | "inline" => Self::Binary,
            _ => return None,
        };
        Some(value)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Uri => "uri",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::DateAndOrTime => "date-and-or-time",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::UtcOffset => "utc-offset",
            Self::LanguageTag => "language-tag",
            Self::Binary => "binary",
        }
    }

    /// Returns whether `value` has this type's shape.
    #[must_use]
    pub fn matches(self, value: &str) -> bool {
        match self {
            Self::Text | Self::Binary => true,
            Self::Uri => shape::is_uri(value),
            Self::Date => shape::is_date(value),
            Self::Time => shape::is_time(value),
            Self::DateTime => shape::is_date_time(value),
            Self::DateAndOrTime => shape::is_date_and_or_time(value),
            Self::Timestamp => shape::is_timestamp(value),
            Self::Boolean => shape::is_boolean(value),
            Self::Integer => shape::is_integer(value),
            Self::Float => shape::is_float(value),
            Self::UtcOffset => shape::is_utc_offset(value),
            Self::LanguageTag => shape::is_language_tag(value),
        }
    }
}

/// When value fields split on `;` are put back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    Never,
    Always,
    /// Only in 2.1 documents, where free text is not escaped.
    Legacy21,
    /// Unless `VALUE=text` is declared.
    UriValued,
    /// Only when `VALUE=uri` is declared.
    ValueUri,
}

impl Join {
    /// Rejoins `values` with `;` when the policy applies.
    #[must_use]
    pub fn apply(
        self,
        values: Vec<String>,
        version: VCardVersion,
        params: &[VCardParameter],
    ) -> Vec<String> {
        if values.len() < 2 {
            return values;
        }

        let declared = find_param(params, "VALUE").and_then(VCardParameter::first);
        let join = match self {
            Self::Never => false,
            Self::Always => true,
            Self::Legacy21 => version == VCardVersion::V2_1,
            Self::UriValued => !declared.is_some_and(|v| v.eq_ignore_ascii_case("text")),
            Self::ValueUri => declared.is_some_and(|v| v.eq_ignore_ascii_case("uri")),
        };

        if join { vec![values.join(";")] } else { values }
    }
}

/// Value shape check applied after arity and parameter checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Free,
    /// Every non-empty value has one of these shapes, unless `VALUE=text`.
    Each(&'static [ValueType]),
    /// Shape given by the declared `VALUE`, or `default` when none.
    ByValueParam { default: Option<ValueType> },
    /// `sex[;identity]` with sex one of `M F O N U` or empty.
    Gender,
    /// `integer;uri`.
    ClientPidMap,
    /// The literal `VCARD`.
    Profile,
}

/// Constraint on the `ENCODING` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingRule {
    Any,
    /// Only base64 when present.
    Binary,
    /// Must be absent.
    Forbidden,
}

/// Constraints on one property in a range of versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyRule {
    pub min: usize,
    pub max: Option<usize>,
    /// Allowed `VALUE` types besides `text`.
    pub value_types: &'static [ValueType],
    pub text_allowed: bool,
    pub type_vocab: Option<&'static [&'static str]>,
    pub shape: Shape,
    pub encoding: EncodingRule,
    pub join: Join,
}

impl PropertyRule {
    /// One text value.
    const fn single() -> Self {
        Self {
            min: 1,
            max: Some(1),
            value_types: &[],
            text_allowed: true,
            type_vocab: None,
            shape: Shape::Free,
            encoding: EncodingRule::Any,
            join: Join::Never,
        }
    }

    const fn arity(mut self, min: usize, max: Option<usize>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    const fn values(mut self, types: &'static [ValueType], text_allowed: bool) -> Self {
        self.value_types = types;
        self.text_allowed = text_allowed;
        self
    }

    const fn vocab(mut self, vocab: &'static [&'static str]) -> Self {
        self.type_vocab = Some(vocab);
        self
    }

    const fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    const fn encoding(mut self, encoding: EncodingRule) -> Self {
        self.encoding = encoding;
        self
    }

    const fn join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }
}

/// The versions defining a property and its rule per version range.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub available: RangeInclusive<VCardVersion>,
    variants: Vec<(RangeInclusive<VCardVersion>, PropertyRule)>,
}

impl PropertySpec {
    /// Returns the rule for `version`. Outside the defining versions the
    /// nearest version's rule applies.
    #[must_use]
    pub fn rule(&self, version: VCardVersion) -> Option<&PropertyRule> {
        self.variants
            .iter()
            .find(|(range, _)| range.contains(&version))
            .or_else(|| {
                if version < *self.available.start() {
                    self.variants.first()
                } else {
                    self.variants.last()
                }
            })
            .map(|(_, rule)| rule)
    }
}

pub const TYPE_TEL: &[&str] = &[
    "home", "msg", "work", "pref", "voice", "fax", "cell", "video", "pager", "bbs", "modem", "car",
    "text", "isdn", "pcs", "textphone", "main", "other",
];

pub const TYPE_TEL_V4: &[&str] = &[
    "text", "voice", "fax", "cell", "video", "pager", "textphone", "home", "work", "pref", "main",
    "other",
];

pub const LABEL_TEL: &[&str] = &[
    "dom", "intl", "postal", "parcel", "home", "work", "pref", "other",
];

pub const TYPE_EMAIL: &[&str] = &[
    "internet", "x400", "pref", "dom", "intl", "postal", "parcel", "home", "work", "cell",
    "school", "other",
];

pub const TYPE_EMAIL_V4: &[&str] = &["home", "work", "pref", "other", "internet"];

pub const TYPE_RELATED: &[&str] = &[
    "contact",
    "acquaintance",
    "friend",
    "met",
    "co-worker",
    "colleague",
    "co-resident",
    "neighbor",
    "child",
    "parent",
    "sibling",
    "spouse",
    "kin",
    "muse",
    "crush",
    "date",
    "sweetheart",
    "me",
    "agent",
    "emergency",
];

const DATES: &[ValueType] = &[
    ValueType::DateAndOrTime,
    ValueType::Date,
    ValueType::DateTime,
    ValueType::Timestamp,
];
const URI: &[ValueType] = &[ValueType::Uri];
const MEDIA: &[ValueType] = &[ValueType::Uri, ValueType::Binary];

static RULES: LazyLock<HashMap<&'static str, PropertySpec>> = LazyLock::new(build_rules);

#[expect(clippy::too_many_lines)]
fn build_rules() -> HashMap<&'static str, PropertySpec> {
    use VCardVersion::{V2_1, V3, V4};

    let every = |rule: PropertyRule| vec![(V2_1..=V4, rule)];
    let split = |legacy: PropertyRule, modern: PropertyRule| {
        vec![(V2_1..=V3, legacy), (V4..=V4, modern)]
    };

    let single = PropertyRule::single();
    let uri_only = single
        .values(URI, false)
        .shape(Shape::Each(URI))
        .join(Join::Always);
    let date_like = single
        .values(DATES, true)
        .shape(Shape::ByValueParam { default: None });
    let media_legacy = single
        .values(MEDIA, false)
        .shape(Shape::ByValueParam { default: None })
        .encoding(EncodingRule::Binary)
        .join(Join::Always);
    let media_modern = single
        .values(URI, false)
        .shape(Shape::ByValueParam {
            default: Some(ValueType::Uri),
        })
        .encoding(EncodingRule::Forbidden)
        .join(Join::Always);

    let entries: Vec<(&'static str, RangeInclusive<VCardVersion>, Vec<_>)> = vec![
        ("VERSION", V2_1..=V4, every(single)),
        ("FN", V2_1..=V4, every(single)),
        ("N", V2_1..=V4, every(single.arity(5, Some(5)))),
        ("NICKNAME", V3..=V4, every(single)),
        ("PHOTO", V2_1..=V4, split(media_legacy, media_modern)),
        ("LOGO", V2_1..=V4, split(media_legacy, media_modern)),
        ("SOUND", V2_1..=V4, split(media_legacy, media_modern)),
        (
            "KEY",
            V2_1..=V4,
            split(media_legacy.values(MEDIA, true), media_modern.values(URI, true)),
        ),
        ("BDAY", V2_1..=V4, every(date_like)),
        ("ANNIVERSARY", V4..=V4, every(date_like)),
        ("DEATHDATE", V4..=V4, every(date_like)),
        (
            "BIRTHPLACE",
            V4..=V4,
            every(single.values(URI, true).shape(Shape::ByValueParam { default: None })),
        ),
        (
            "DEATHPLACE",
            V4..=V4,
            every(single.values(URI, true).shape(Shape::ByValueParam { default: None })),
        ),
        ("GENDER", V4..=V4, every(single.arity(1, Some(2)).shape(Shape::Gender))),
        (
            "ADR",
            V2_1..=V4,
            split(
                single.arity(7, Some(7)).vocab(LABEL_TEL),
                single.arity(7, Some(7)),
            ),
        ),
        (
            "LABEL",
            V2_1..=V3,
            every(single.vocab(LABEL_TEL).join(Join::Legacy21)),
        ),
        (
            "TEL",
            V2_1..=V4,
            split(
                single
                    .arity(1, None)
                    .values(URI, true)
                    .vocab(TYPE_TEL)
                    .shape(Shape::ByValueParam { default: None })
                    .join(Join::ValueUri),
                single
                    .arity(1, None)
                    .values(URI, true)
                    .vocab(TYPE_TEL_V4)
                    .shape(Shape::ByValueParam { default: None })
                    .join(Join::ValueUri),
            ),
        ),
        (
            "EMAIL",
            V2_1..=V4,
            split(single.vocab(TYPE_EMAIL), single.vocab(TYPE_EMAIL_V4)),
        ),
        ("MAILER", V2_1..=V3, every(single)),
        (
            "IMPP",
            V3..=V4,
            every(uri_only),
        ),
        (
            "LANG",
            V4..=V4,
            every(
                single
                    .values(&[ValueType::LanguageTag], false)
                    .shape(Shape::Each(&[ValueType::LanguageTag])),
            ),
        ),
        (
            "TZ",
            V2_1..=V4,
            split(
                single
                    .values(&[ValueType::UtcOffset], true)
                    .shape(Shape::ByValueParam {
                        default: Some(ValueType::UtcOffset),
                    }),
                single
                    .values(&[ValueType::UtcOffset, ValueType::Uri], true)
                    .shape(Shape::ByValueParam { default: None }),
            ),
        ),
        (
            "GEO",
            V2_1..=V4,
            split(
                single
                    .arity(2, Some(2))
                    .values(&[ValueType::Float], false)
                    .shape(Shape::Each(&[ValueType::Float])),
                single.values(URI, false).shape(Shape::Each(URI)),
            ),
        ),
        ("TITLE", V2_1..=V4, every(single)),
        ("ROLE", V2_1..=V4, every(single)),
        ("AGENT", V2_1..=V3, every(single.values(URI, true).shape(Shape::ByValueParam { default: None }))),
        ("ORG", V2_1..=V4, every(single.arity(1, None))),
        ("MEMBER", V4..=V4, every(uri_only)),
        (
            "RELATED",
            V4..=V4,
            every(
                single
                    .values(URI, true)
                    .vocab(TYPE_RELATED)
                    .shape(Shape::ByValueParam {
                        default: Some(ValueType::Uri),
                    })
                    .join(Join::UriValued),
            ),
        ),
        ("CATEGORIES", V3..=V4, every(single)),
        ("NOTE", V2_1..=V4, every(single.arity(0, Some(1)).join(Join::Legacy21))),
        ("PRODID", V3..=V4, every(single.arity(0, Some(1)).join(Join::Legacy21))),
        (
            "REV",
            V2_1..=V4,
            split(
                single
                    .values(&[ValueType::Timestamp, ValueType::Date, ValueType::DateTime], false)
                    .shape(Shape::Each(&[ValueType::Timestamp, ValueType::Date])),
                single
                    .values(&[ValueType::Timestamp], false)
                    .shape(Shape::Each(&[ValueType::Timestamp])),
            ),
        ),
        ("SORT-STRING", V3..=V3, every(single)),
        (
            "UID",
            V2_1..=V4,
            every(single.values(URI, true).shape(Shape::ByValueParam { default: None })),
        ),
        ("URL", V2_1..=V4, every(single.values(URI, false).join(Join::Always))),
        (
            "SOURCE",
            V3..=V4,
            split(single.values(URI, false).join(Join::Always), uri_only),
        ),
        ("NAME", V3..=V3, every(single)),
        ("PROFILE", V3..=V3, every(single.shape(Shape::Profile))),
        ("CLASS", V3..=V3, every(single)),
        ("KIND", V4..=V4, every(single)),
        ("XML", V4..=V4, every(single)),
        ("FBURL", V4..=V4, every(uri_only)),
        ("CALADRURI", V4..=V4, every(uri_only)),
        ("CALURI", V4..=V4, every(uri_only)),
        ("CAPURI", V4..=V4, every(uri_only)),
        (
            "CLIENTPIDMAP",
            V4..=V4,
            every(single.arity(2, Some(2)).shape(Shape::ClientPidMap)),
        ),
        ("HOBBY", V4..=V4, every(single)),
        ("INTEREST", V4..=V4, every(single)),
        ("EXPERTISE", V4..=V4, every(single)),
        ("ORG-DIRECTORY", V4..=V4, every(single.values(URI, true))),
    ];

    entries
        .into_iter()
        .map(|(name, available, variants)| (name, PropertySpec { available, variants }))
        .collect()
}

/// Returns the table entry for a property name.
#[must_use]
pub fn spec(name: &str) -> Option<&'static PropertySpec> {
    RULES.get(name.to_ascii_uppercase().as_str())
}

/// Returns the rule for a property name in a version.
#[must_use]
pub fn lookup(name: &str, version: VCardVersion) -> Option<&'static PropertyRule> {
    spec(name).and_then(|s| s.rule(version))
}

/// Returns how split value fields of a property are rejoined.
#[must_use]
pub fn join_policy(name: &str, version: VCardVersion) -> Join {
    lookup(name, version).map_or(Join::Never, |r| r.join)
}

/// Returns whether `version` defines the property. Extension and unknown
/// names are defined in every version.
#[must_use]
pub fn is_defined(name: &str, version: VCardVersion) -> bool {
    spec(name).is_none_or(|s| s.available.contains(&version))
}

/// Returns the TYPE vocabulary checked for a property in a version.
#[must_use]
pub fn type_vocabulary(name: &str, version: VCardVersion) -> Option<&'static [&'static str]> {
    lookup(name, version).and_then(|r| r.type_vocab)
}
