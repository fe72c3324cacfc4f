//! Canned image service responses

#![allow(dead_code)]

/// A successful generation with one hosted image.
pub const SUCCESS_BODY: &str = r#"{
  "created": 1700000000,
  "data": [
    {
      "revised_prompt": "A tiny home nestled among pine trees",
      "url": "https://example/img.png"
    }
  ]
}"#;

/// Parsed fine, but the image entry has no URL.
pub const NO_URL_BODY: &str = r#"{ "created": 1700000000, "data": [ { "b64_json": "aGVsbG8=" } ] }"#;

/// `data` is present but empty.
pub const EMPTY_DATA_BODY: &str = r#"{ "created": 1700000000, "data": [] }"#;

/// Error object as returned alongside a 400.
pub const CONTENT_POLICY_BODY: &str = r#"{
  "error": {
    "code": "content_policy_violation",
    "message": "Your request was rejected as a result of our safety system.",
    "param": null,
    "type": "invalid_request_error"
  }
}"#;

/// Error object embedded in a 200 response.
pub const EMBEDDED_ERROR_BODY: &str =
    r#"{ "data": [ { "url": "https://example/img.png" } ], "error": { "message": "quota exceeded" } }"#;

/// What a misbehaving proxy hands back.
pub const HTML_BODY: &str = "<html><body><h1>502 Bad Gateway</h1></body></html>";

/// A URL that is not absolute.
pub const RELATIVE_URL_BODY: &str = r#"{ "data": [ { "url": "/images/img.png" } ] }"#;

/// Prompts used across scenarios
pub const CABIN_IN_THE_WOODS: &str = "A cabin in the woods";
pub const CABIN: &str = "A cabin";
