//! Normalizes arbitrary client payloads into a [`GenerationRequest`].
//!
//! Sanitization is total: every input, including non-object payloads and
//! JSON-encoded strings that fail to parse, yields a fully defaulted request.
//! Values outside a field's allow-list resolve to the field's default and
//! the substitution is reported as an [`Adjustment`] instead of an error.

use serde_json::{Map, Value as JsonValue};
use url::Url;

use super::request::{
    AspectRatio, GenerationRequest, Mode, OutputFormat, Resolution, SafetyTolerance, Sku,
};

/// Longest scene text forwarded to the prompt, in characters.
pub const MAX_SCENE_CHARS: usize = 700;

/// Keys accepted for the reference image, in lookup order.
const REFERENCE_KEYS: [&str; 3] = ["reference_image_url", "reference_url", "ref_image_url"];

/// Why a field did not keep the value the client sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Absent, null or blank; the default applies.
    Missing,
    /// Present but outside the field's domain; the default applies.
    Unrecognized,
    /// Accepted after cutting it down to the field's bound.
    Truncated,
    /// Overridden by a cross-field invariant.
    Forced,
}

impl Fallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fallback::Missing => "missing",
            Fallback::Unrecognized => "unrecognized",
            Fallback::Truncated => "truncated",
            Fallback::Forced => "forced",
        }
    }
}

/// A normalized field value plus the reason it differs from the input, if it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub fallback: Option<Fallback>,
}

impl<T> Resolved<T> {
    fn exact(value: T) -> Self {
        Self {
            value,
            fallback: None,
        }
    }

    fn fallback(value: T, reason: Fallback) -> Self {
        Self {
            value,
            fallback: Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub field: &'static str,
    pub reason: Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub request: GenerationRequest,
    /// Substitutions made while normalizing; silently defaulted missing
    /// fields are not listed.
    pub adjustments: Vec<Adjustment>,
}

#[derive(Default)]
struct Adjustments(Vec<Adjustment>);

impl Adjustments {
    fn keep<T>(&mut self, field: &'static str, resolved: Resolved<T>) -> T {
        match resolved.fallback {
            None | Some(Fallback::Missing) => {}
            Some(reason) => self.0.push(Adjustment { field, reason }),
        }
        resolved.value
    }
}

/// Decodes a raw request body regardless of its declared content type.
///
/// Empty, non-UTF-8 and malformed bodies decode to `null`, which sanitizes to
/// a fully defaulted request.
pub fn decode_body(bytes: &[u8]) -> JsonValue {
    serde_json::from_slice(bytes).unwrap_or(JsonValue::Null)
}

pub fn sanitize(payload: JsonValue) -> Sanitized {
    let body = into_object(payload);
    let mut adjustments = Adjustments::default();

    let mode = adjustments.keep(
        "mode",
        resolve_enum(body.get("mode"), true, Mode::parse),
    );
    let scene = adjustments.keep("scene", resolve_scene(body.get("scene")));
    let sku = adjustments.keep("sku", resolve_enum(body.get("sku"), true, Sku::parse));
    let mut has_cap = adjustments.keep("tapa", resolve_bool(body.get("tapa"), true));
    if sku.requires_cap() && !has_cap {
        has_cap = adjustments.keep("tapa", Resolved::fallback(true, Fallback::Forced));
    }
    let aspect_ratio = adjustments.keep(
        "aspect_ratio",
        resolve_enum(body.get("aspect_ratio"), false, AspectRatio::parse),
    );
    let resolution = adjustments.keep(
        "resolution",
        resolve_enum(body.get("resolution"), false, Resolution::parse),
    );
    let output_format = adjustments.keep(
        "output_format",
        resolve_enum(body.get("output_format"), true, OutputFormat::parse),
    );
    let safety_tolerance = adjustments.keep(
        "safety_tolerance",
        resolve_safety_tolerance(body.get("safety_tolerance")),
    );
    let reference_field = REFERENCE_KEYS
        .into_iter()
        .find(|key| body.get(*key).is_some_and(|value| !value.is_null()))
        .unwrap_or(REFERENCE_KEYS[0]);
    let reference_image_url = adjustments.keep(
        "reference_image_url",
        resolve_reference(body.get(reference_field)),
    );

    Sanitized {
        request: GenerationRequest {
            mode,
            scene,
            sku,
            has_cap,
            aspect_ratio,
            resolution,
            output_format,
            safety_tolerance,
            reference_image_url,
        },
        adjustments: adjustments.0,
    }
}

/// Collapses the payload into an object; a string body is decoded once more.
fn into_object(payload: JsonValue) -> Map<String, JsonValue> {
    match payload {
        JsonValue::Object(map) => map,
        JsonValue::String(text) => match serde_json::from_str::<JsonValue>(&text) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

fn text(value: Option<&JsonValue>) -> Result<&str, Fallback> {
    match value {
        None | Some(JsonValue::Null) => Err(Fallback::Missing),
        Some(JsonValue::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(Fallback::Missing)
            } else {
                Ok(trimmed)
            }
        }
        Some(_) => Err(Fallback::Unrecognized),
    }
}

pub fn resolve_enum<T, F>(value: Option<&JsonValue>, lowercase: bool, parse: F) -> Resolved<T>
where
    T: Default,
    F: Fn(&str) -> Option<T>,
{
    let token = match text(value) {
        Ok(token) => token,
        Err(reason) => return Resolved::fallback(T::default(), reason),
    };
    let parsed = if lowercase {
        parse(token.to_lowercase().as_str())
    } else {
        parse(token)
    };
    match parsed {
        Some(value) => Resolved::exact(value),
        None => Resolved::fallback(T::default(), Fallback::Unrecognized),
    }
}

pub fn resolve_bool(value: Option<&JsonValue>, default: bool) -> Resolved<bool> {
    match value {
        None | Some(JsonValue::Null) => Resolved::fallback(default, Fallback::Missing),
        Some(JsonValue::Bool(flag)) => Resolved::exact(*flag),
        Some(JsonValue::Number(number)) => match number.as_f64() {
            Some(n) if n.is_finite() => Resolved::exact(n != 0.0),
            _ => Resolved::fallback(default, Fallback::Unrecognized),
        },
        Some(JsonValue::String(raw)) => match raw.trim().to_lowercase().as_str() {
            "" => Resolved::fallback(default, Fallback::Missing),
            "true" | "1" | "yes" | "y" => Resolved::exact(true),
            "false" | "0" | "no" | "n" => Resolved::exact(false),
            _ => Resolved::fallback(default, Fallback::Unrecognized),
        },
        Some(_) => Resolved::fallback(default, Fallback::Unrecognized),
    }
}

fn resolve_scene(value: Option<&JsonValue>) -> Resolved<Option<String>> {
    let scene = match text(value) {
        Ok(scene) => scene,
        Err(reason) => return Resolved::fallback(None, reason),
    };
    if scene.chars().count() <= MAX_SCENE_CHARS {
        return Resolved::exact(Some(scene.to_string()));
    }
    let cut: String = scene.chars().take(MAX_SCENE_CHARS).collect();
    Resolved::fallback(Some(cut.trim_end().to_string()), Fallback::Truncated)
}

fn resolve_safety_tolerance(value: Option<&JsonValue>) -> Resolved<SafetyTolerance> {
    let level = match value {
        None | Some(JsonValue::Null) => {
            return Resolved::fallback(SafetyTolerance::default(), Fallback::Missing);
        }
        Some(JsonValue::Number(number)) => number.as_u64(),
        Some(JsonValue::String(raw)) if raw.trim().is_empty() => {
            return Resolved::fallback(SafetyTolerance::default(), Fallback::Missing);
        }
        Some(JsonValue::String(raw)) => raw.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    match level
        .and_then(|level| u8::try_from(level).ok())
        .and_then(SafetyTolerance::new)
    {
        Some(tolerance) => Resolved::exact(tolerance),
        None => Resolved::fallback(SafetyTolerance::default(), Fallback::Unrecognized),
    }
}

/// Accepts only absolute `http(s)://` URLs; anything else disables reference mode.
fn resolve_reference(value: Option<&JsonValue>) -> Resolved<Option<String>> {
    let candidate = match text(value) {
        Ok(candidate) => candidate,
        Err(reason) => return Resolved::fallback(None, reason),
    };
    let lowered = candidate.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return Resolved::fallback(None, Fallback::Unrecognized);
    }
    match Url::parse(candidate) {
        Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => {
            Resolved::exact(Some(candidate.to_string()))
        }
        _ => Resolved::fallback(None, Fallback::Unrecognized),
    }
}
