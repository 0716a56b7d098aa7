//! Property rewrites for each adjacent version pair.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::rfc::vcard::codec::{self, TransferEncoding};
use crate::rfc::vcard::core::{VCardParameter, VCardProperty, VCardValue, VCardVersion, merge_param, names};
use crate::rfc::vcard::validate::rules::ValueType;

/// A property between versions: everything but the version, still mutable.
#[derive(Debug, Clone)]
pub(super) struct Draft {
    pub group: Option<String>,
    pub name: String,
    pub params: Vec<VCardParameter>,
    pub values: Vec<VCardValue>,
}

impl Draft {
    #[must_use]
    pub fn from_property(property: &VCardProperty) -> Self {
        Self {
            group: property.group.clone(),
            name: property.name.clone(),
            params: property.params.clone(),
            values: property.values.clone(),
        }
    }

    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn take(&mut self, name: &str) -> Option<VCardParameter> {
        let pos = self.params.iter().position(|p| p.name.eq_ignore_ascii_case(name))?;
        Some(self.params.remove(pos))
    }

    fn set(&mut self, param: VCardParameter) {
        self.take(&param.name);
        self.params.push(param);
    }

    fn add_types(&mut self, values: Vec<String>) {
        if !values.is_empty() {
            merge_param(&mut self.params, VCardParameter::multi("TYPE", values));
        }
    }

    fn param_first(&self, name: &str) -> Option<String> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.first().map(str::to_string))
    }

    fn transfer(&self) -> Option<TransferEncoding> {
        TransferEncoding::from_params(&self.params)
    }

    /// Rewrites the VALUE parameter to the spelling `version` uses.
    fn respell_value_type(&mut self, version: VCardVersion) {
        let Some(raw) = self.take("VALUE") else {
            return;
        };
        let spelled = match raw.first().and_then(ValueType::parse) {
            Some(ValueType::Uri) if version == VCardVersion::V2_1 => "URL".to_string(),
            Some(t) => t.as_str().to_string(),
            None => {
                self.params.push(raw);
                return;
            }
        };
        self.params.push(VCardParameter::value_type(spelled));
    }
}

/// Rewrites one property for the next version. `None` drops it.
pub(super) type Step = fn(Draft) -> Option<Draft>;

const STEPS: &[(VCardVersion, VCardVersion, Step)] = &[
    (VCardVersion::V2_1, VCardVersion::V3, v21_to_v3),
    (VCardVersion::V3, VCardVersion::V4, v3_to_v4),
    (VCardVersion::V4, VCardVersion::V3, v4_to_v3),
    (VCardVersion::V3, VCardVersion::V2_1, v3_to_v21),
];

pub(super) fn step(from: VCardVersion, to: VCardVersion) -> Option<Step> {
    STEPS
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, step)| *step)
}

/// Top-level media type and default subtype of the binary-capable properties.
fn media_kind(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        names::PHOTO | names::LOGO => Some(("image", "jpeg")),
        names::SOUND => Some(("audio", "basic")),
        names::KEY => Some(("application", "pgp-keys")),
        _ => None,
    }
}

/// Parameters only 4.0 defines.
const V4_ONLY_PARAMS: &[&str] = &[
    "ALTID", "PID", "CALSCALE", "SORT-AS", "GEO", "TZ", "LABEL", "MEDIATYPE", "INDEX", "LEVEL",
    "CC", "AUTHOR", "AUTHOR-NAME", "CREATED", "DERIVED", "PHONETIC", "PROP-ID", "SCRIPT",
    "SERVICE-TYPE", "USERNAME",
];

/// ADR/LABEL delivery types 4.0 no longer has.
const DELIVERY_TYPES: &[&str] = &["dom", "intl", "postal", "parcel"];

fn v21_to_v3(mut draft: Draft) -> Option<Draft> {
    let base64 = draft.transfer() == Some(TransferEncoding::Base64);
    draft.take("ENCODING");
    draft.take("CHARSET");

    let mut types = Vec::new();
    draft.params.retain(|p| {
        if !p.is_bare() {
            return true;
        }
        let token = p.name.as_str();
        if !matches!(token, "BASE64" | "B" | "QUOTED-PRINTABLE" | "8BIT" | "7BIT") {
            types.push(token.to_string());
        }
        false
    });
    draft.add_types(types);
    if base64 {
        draft.params.push(VCardParameter::encoding("b"));
    }
    draft.respell_value_type(VCardVersion::V3);
    Some(draft)
}

fn v3_to_v4(mut draft: Draft) -> Option<Draft> {
    let mut types = Vec::new();
    draft.params.retain(|p| {
        if p.is_bare() {
            types.push(p.name.clone());
            return false;
        }
        true
    });
    draft.add_types(types);

    if draft.is(names::ADR)
        && let Some(type_param) = draft.take("TYPE")
    {
        let kept = type_param
            .split_values()
            .filter(|v| !DELIVERY_TYPES.iter().any(|d| d.eq_ignore_ascii_case(v)))
            .map(str::to_string)
            .collect();
        draft.add_types(kept);
    }

    if draft.is(names::GEO) && draft.values.len() == 2 {
        let lat = draft.values[0].to_text().trim().to_string();
        let lon = draft.values[1].to_text().trim().to_string();
        draft.values = vec![VCardValue::Text(format!("geo:{lat},{lon}"))];
    }

    if let Some((top, default_sub)) = media_kind(&draft.name) {
        media_to_data_uri(&mut draft, top, default_sub);
    }

    draft.respell_value_type(VCardVersion::V4);
    Some(draft)
}

/// Folds an inline payload into a `data:` URI; a URI reference keeps its
/// value and moves the TYPE subtype to MEDIATYPE.
fn media_to_data_uri(draft: &mut Draft, top: &str, default_sub: &str) {
    let base64 = draft.transfer() == Some(TransferEncoding::Base64);
    let subtype = draft
        .take("TYPE")
        .and_then(|p| p.first().map(str::to_ascii_lowercase));
    let mime = |sub: Option<&str>| match sub {
        Some(s) if s.contains('/') => s.to_string(),
        Some(s) => format!("{top}/{s}"),
        None => format!("{top}/{default_sub}"),
    };

    let payload = match draft.values.first() {
        Some(VCardValue::Binary(bytes)) => Some(STANDARD.encode(bytes)),
        Some(VCardValue::Text(text)) if base64 => {
            Some(text.chars().filter(|c| !c.is_whitespace()).collect())
        }
        _ => None,
    };

    draft.take("ENCODING");
    match payload {
        Some(data) => {
            draft.take("VALUE");
            let uri = format!("data:{};base64,{data}", mime(subtype.as_deref()));
            draft.values = vec![VCardValue::Text(uri)];
        }
        None => {
            if let Some(sub) = subtype {
                draft.set(VCardParameter::new("MEDIATYPE", mime(Some(&sub))));
            }
        }
    }
}

fn v4_to_v3(mut draft: Draft) -> Option<Draft> {
    let pref = draft.take("PREF").is_some();
    draft
        .params
        .retain(|p| !V4_ONLY_PARAMS.contains(&p.name.as_str()) || p.name == "MEDIATYPE");
    if pref {
        draft.add_types(vec!["pref".to_string()]);
    }

    if draft.is(names::GEO) {
        let text = draft.values.first().map(|v| v.to_text().into_owned())?;
        let coords = text.strip_prefix("geo:").unwrap_or(&text);
        let coords = coords.split(';').next().unwrap_or_default();
        let (lat, lon) = coords.split_once(',')?;
        let lon = lon.split(',').next().unwrap_or(lon);
        draft.values = vec![
            VCardValue::Text(lat.trim().to_string()),
            VCardValue::Text(lon.trim().to_string()),
        ];
    }

    if media_kind(&draft.name).is_some() {
        data_uri_to_media(&mut draft);
    }
    draft.take("MEDIATYPE");

    draft.respell_value_type(VCardVersion::V3);
    Some(draft)
}

/// Splits `data:<mime>[;base64],<payload>`.
fn parse_data_uri(uri: &str) -> Option<(&str, bool, &str)> {
    if !uri.get(..5)?.eq_ignore_ascii_case("data:") {
        return None;
    }
    let (meta, payload) = uri[5..].split_once(',')?;
    match meta.strip_suffix(";base64") {
        Some(mime) => Some((mime, true, payload)),
        None => Some((meta, false, payload)),
    }
}

fn data_uri_to_media(draft: &mut Draft) {
    let mediatype = draft.param_first("MEDIATYPE");
    let inline = draft
        .values
        .first()
        .and_then(VCardValue::as_text)
        .and_then(parse_data_uri)
        .filter(|(_, base64, _)| *base64)
        .and_then(|(mime, _, payload)| {
            codec::decode_base64(payload)
                .ok()
                .map(|bytes| (mime.to_string(), bytes))
        });

    match inline {
        Some((mime, bytes)) => {
            draft.take("VALUE");
            draft.set(VCardParameter::encoding("b"));
            if let Some((_, sub)) = mime.split_once('/') {
                draft.set(VCardParameter::type_param(sub.to_ascii_uppercase()));
            }
            draft.values = vec![VCardValue::Binary(bytes)];
        }
        None => {
            draft.set(VCardParameter::value_type("uri"));
            if let Some((_, sub)) = mediatype.as_deref().and_then(|m| m.split_once('/')) {
                draft.set(VCardParameter::type_param(sub.to_ascii_uppercase()));
            }
        }
    }
}

fn v3_to_v21(mut draft: Draft) -> Option<Draft> {
    if let Some(type_param) = draft.take("TYPE") {
        for token in type_param.split_values() {
            draft.params.push(VCardParameter::bare(token.to_ascii_uppercase()));
        }
    }

    match draft.transfer() {
        Some(TransferEncoding::Base64) => draft.set(VCardParameter::encoding("BASE64")),
        Some(TransferEncoding::QuotedPrintable) => {}
        None => {
            let non_ascii = draft
                .values
                .iter()
                .filter_map(VCardValue::as_text)
                .any(|t| !t.is_ascii());
            if non_ascii {
                draft.params.push(VCardParameter::encoding("QUOTED-PRINTABLE"));
                draft.set(VCardParameter::charset("UTF-8"));
            }
        }
    }

    draft.respell_value_type(VCardVersion::V2_1);
    Some(draft)
}
