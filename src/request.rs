//! JSON request and response envelope for a QR generation service.
//!
//! Field names follow the wire format of the service:
//!
//! ```json
//! {
//!   "QRName": "home page",
//!   "BasicInfo": [{ "website": "https://example.com" }],
//!   "Shape": ["circle"],
//!   "Logo": "https://example.com/logo.png"
//! }
//! ```
//!
//! Fetching the logo is the caller's job; [`handle`] takes the bytes.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::StyleConfig;
use crate::error::{Error, Result};
use crate::helper::{encode_base64_png, generate};
use crate::overlay::decode_logo;
use crate::shape::Shape;

/// Longest website URL accepted.
pub const MAX_URL_LENGTH: usize = 2000;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*",
    )
    .expect("URL pattern is valid")
});

/// A validated generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub name: String,
    pub website: String,
    pub shape: Option<Shape>,
    /// Where the caller should fetch the logo from.
    pub logo: Option<String>,
}

/// Response body: the request name and the base64 PNG.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    pub name: String,
    pub img: String,
}

impl GenerateRequest {
    /// Parses and validates a JSON request body.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(&value)
    }

    /// Validates an already parsed request body.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] for missing or mistyped fields.
    /// - [`Error::PayloadTooLong`] when the website exceeds [`MAX_URL_LENGTH`].
    /// - [`Error::InvalidUrl`] when the website is not an http(s) URL.
    pub fn from_value(value: &Value) -> Result<Self> {
        let payload = match value.as_object() {
            Some(obj) if !obj.is_empty() => obj,
            _ => return Err(invalid("Invalid JSON payload provided.")),
        };

        let name = payload
            .get("QRName")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("QRName is required and must be a string."))?;

        let basic_info = payload
            .get("BasicInfo")
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| invalid("BasicInfo is required and must be a non-empty list."))?;

        let website = basic_info[0]
            .get("website")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("website is required in BasicInfo and must be a string."))?;
        validate_website(website)?;

        // Only the first entry of the list is consulted
        let shape = payload
            .get("Shape")
            .and_then(Value::as_array)
            .and_then(|list| list.first())
            .and_then(Value::as_str)
            .and_then(Shape::from_selector);

        let logo = payload
            .get("Logo")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            website: website.to_string(),
            shape,
            logo,
        })
    }
}

/// Checks length, then URL shape.
pub fn validate_website(website: &str) -> Result<()> {
    let len = website.chars().count();
    if len > MAX_URL_LENGTH {
        return Err(Error::PayloadTooLong { len, max: MAX_URL_LENGTH });
    }
    if !URL_PATTERN.is_match(website) {
        return Err(Error::InvalidUrl(website.to_string()));
    }
    Ok(())
}

/// Runs the pipeline for `request` and wraps the PNG in a response.
///
/// `logo_bytes` are the fetched contents of `request.logo`, if any. `rng`
/// drives the decorative filler of shaped outputs.
pub fn handle<R: Rng + ?Sized>(
    request: &GenerateRequest,
    logo_bytes: Option<&[u8]>,
    rng: &mut R,
    config: &StyleConfig,
) -> Result<GenerateResponse> {
    let logo = logo_bytes.map(decode_logo).transpose()?;
    let img = generate(&request.website, logo.as_ref(), request.shape, rng, config)?;
    log::debug!("generated {}x{} image for {:?}", img.width(), img.height(), request.name);
    Ok(GenerateResponse {
        name: request.name.clone(),
        img: encode_base64_png(&img)?,
    })
}

fn invalid(message: &str) -> Error {
    Error::InvalidRequest(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn body(shape: Value) -> Value {
        json!({
            "QRName": "home",
            "BasicInfo": [{ "website": "https://example.com" }],
            "Shape": shape,
        })
    }

    #[test]
    fn test_parse_full_request() {
        let request = GenerateRequest::from_json(
            r#"{"QRName": "home", "BasicInfo": [{"website": "https://www.example.com/a?b=c"}],
                "Shape": ["Hexagon"], "Logo": "https://example.com/logo.png"}"#,
        ).unwrap();
        assert_eq!(request.name, "home");
        assert_eq!(request.website, "https://www.example.com/a?b=c");
        assert_eq!(request.shape, Some(Shape::Hexagon));
        assert_eq!(request.logo.as_deref(), Some("https://example.com/logo.png"));
    }

    #[test]
    fn test_shape_selection_is_lenient() {
        let parse = |v: Value| GenerateRequest::from_value(&body(v)).unwrap().shape;
        assert_eq!(parse(json!(["circle"])), Some(Shape::Circle));
        assert_eq!(parse(json!(["circle", "hexagon"])), Some(Shape::Circle));
        assert_eq!(parse(json!(["star"])), None);
        assert_eq!(parse(json!([])), None);
        assert_eq!(parse(json!("circle")), None);
        assert_eq!(parse(json!([42])), None);
        assert_eq!(parse(Value::Null), None);
    }

    #[test]
    fn test_missing_fields() {
        let err = GenerateRequest::from_value(&json!({})).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let err = GenerateRequest::from_value(&json!({"QRName": 1})).unwrap_err();
        assert_eq!(err.to_string(), "QRName is required and must be a string.");

        let err = GenerateRequest::from_value(&json!({"QRName": "a", "BasicInfo": []})).unwrap_err();
        assert_eq!(err.to_string(), "BasicInfo is required and must be a non-empty list.");

        let err = GenerateRequest::from_value(&json!({"QRName": "a", "BasicInfo": [{}]})).unwrap_err();
        assert_eq!(err.to_string(), "website is required in BasicInfo and must be a string.");
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(GenerateRequest::from_json("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_validate_website() {
        assert!(validate_website("https://example.com").is_ok());
        assert!(validate_website("http://sub.example.co.uk/path#frag").is_ok());
        assert!(matches!(validate_website("ftp://example.com"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_website("example.com"), Err(Error::InvalidUrl(_))));

        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(validate_website(&long), Err(Error::PayloadTooLong { max: MAX_URL_LENGTH, .. })));
    }

    #[test]
    fn test_handle_builds_response() {
        let config = StyleConfig::default();
        let request = GenerateRequest::from_value(&body(json!(["circle"]))).unwrap();
        let response = handle(&request, None, &mut StdRng::seed_from_u64(5), &config).unwrap();
        assert_eq!(response.name, "home");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "home");
        assert!(json["img"].as_str().unwrap().starts_with("iVBORw0KGgo"));

        let bytes = general_purpose::STANDARD.decode(&response.img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        let expected = generate("https://example.com", None, Some(Shape::Circle),
            &mut StdRng::seed_from_u64(5), &config).unwrap();
        assert_eq!(decoded, expected);

        let again = handle(&request, None, &mut StdRng::seed_from_u64(5), &config).unwrap();
        assert_eq!(again, response);
    }

    #[test]
    fn test_handle_rejects_bad_logo() {
        let request = GenerateRequest::from_value(&body(Value::Null)).unwrap();
        let err = handle(&request, Some(b"not an image"), &mut rand::rng(), &StyleConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::LogoDecode(_)));
    }
}
