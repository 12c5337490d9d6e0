//! multipart/form-data encoding for the upstream art APIs.
//!
//! The upstreams are browser-facing endpoints, so the encoder mirrors the
//! body a browser produces: WebKit-style boundary, bare string parts, no
//! per-part content type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::Rng;

const BOUNDARY_PREFIX: &str = "----WebKitFormBoundary";
const BOUNDARY_TOKEN_LEN: usize = 16;

/// An encoded form body with its boundary-qualified content type.
#[derive(Debug, Clone)]
pub struct FormBody {
    pub body: String,
    pub content_type: String,
}

fn boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{BOUNDARY_PREFIX}{token}")
}

/// Serialize name/value fields into a multipart/form-data body.
pub fn encode(fields: &[(&str, String)]) -> FormBody {
    let boundary = boundary();
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    FormBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    }
}

/// Anonymous client id: URL-safe base64, no padding, over 32 random bytes.
fn client_id() -> String {
    let mut raw = [0u8; 32];
    rand::thread_rng().fill(&mut raw[..]);
    URL_SAFE_NO_PAD.encode(raw)
}

/// Unix timestamp with millisecond precision, as the upstream expects.
fn request_timestamp() -> String {
    format!("{:.3}", chrono::Utc::now().timestamp_millis() as f64 / 1000.0)
}

/// Field set for the magicstudio art generator.
pub fn magicstudio_fields(prompt: &str) -> Vec<(&'static str, String)> {
    vec![
        ("prompt", prompt.to_string()),
        ("output_format", "bytes".to_string()),
        ("user_profile_id", "null".to_string()),
        ("anonymous_user_id", uuid::Uuid::new_v4().to_string()),
        ("request_timestamp", request_timestamp()),
        ("user_is_subscribed", "false".to_string()),
        ("client_id", client_id()),
    ]
}

/// Field set for the creart text2image API.
pub fn creart_fields(prompt: &str) -> Vec<(&'static str, String)> {
    vec![
        ("prompt", prompt.to_string()),
        ("input_image_type", "text2image".to_string()),
        ("input_image_base64", String::new()),
        ("negative_prompt", String::new()),
        ("aspect_ratio", "1x1".to_string()),
        ("guidance_scale", "9.5".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_has_fixed_prefix() {
        let b = boundary();
        assert!(b.starts_with(BOUNDARY_PREFIX));
        let token = &b[BOUNDARY_PREFIX.len()..];
        assert_eq!(token.len(), BOUNDARY_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_encode_structure() {
        let form = encode(&[
            ("prompt", "a cat".to_string()),
            ("aspect_ratio", "1x1".to_string()),
        ]);

        let boundary = form
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("content type declares the boundary");

        assert!(form
            .body
            .contains(&format!("--{boundary}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\na cat\r\n")));
        assert!(form
            .body
            .contains("Content-Disposition: form-data; name=\"aspect_ratio\"\r\n\r\n1x1\r\n"));
        assert!(form.body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_encode_empty_value() {
        let form = encode(&[("negative_prompt", String::new())]);
        assert!(form
            .body
            .contains("Content-Disposition: form-data; name=\"negative_prompt\"\r\n\r\n\r\n"));
    }

    #[test]
    fn test_client_id_shape() {
        let id = client_id();
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(id.len(), 43);
        assert!(!id.contains('='));
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_client_id_unique() {
        assert_ne!(client_id(), client_id());
    }

    #[test]
    fn test_request_timestamp_has_three_decimals() {
        let ts = request_timestamp();
        let (_, frac) = ts.split_once('.').expect("timestamp has a decimal point");
        assert_eq!(frac.len(), 3);
    }

    #[test]
    fn test_magicstudio_fields() {
        let fields = magicstudio_fields("a red fox");
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "prompt",
                "output_format",
                "user_profile_id",
                "anonymous_user_id",
                "request_timestamp",
                "user_is_subscribed",
                "client_id",
            ]
        );
        assert_eq!(fields[0].1, "a red fox");
        assert_eq!(fields[1].1, "bytes");
        assert_eq!(fields[2].1, "null");
        assert_eq!(fields[5].1, "false");
        // anonymous_user_id parses as a UUID
        assert!(uuid::Uuid::parse_str(&fields[3].1).is_ok());
    }

    #[test]
    fn test_creart_fields() {
        let fields = creart_fields("a red fox");
        assert_eq!(
            fields,
            vec![
                ("prompt", "a red fox".to_string()),
                ("input_image_type", "text2image".to_string()),
                ("input_image_base64", String::new()),
                ("negative_prompt", String::new()),
                ("aspect_ratio", "1x1".to_string()),
                ("guidance_scale", "9.5".to_string()),
            ]
        );
    }
}
