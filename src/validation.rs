//! Validation of incoming webmention submissions.
//!
//! Validation is a pure function of the request and the allow-list. It runs
//! before any queue or store access, so a rejected request never mutates
//! state.
//!
//! # Rules
//!
//! Checked in order; the first violated rule is reported:
//!
//! | index | rule |
//! |-------|------|
//! | 0 | method is `POST` |
//! | 1 | `Content-Type` is `application/x-www-form-urlencoded` |
//! | 2 | body is a form with non-empty `source` and `target` |
//! | 3 | `source` differs from `target` |
//! | 4 | both are absolute URLs |
//! | 5 | `target` starts with an allow-listed prefix (if a list is configured) |
//! | 6 | `target` scheme is `http` or `https` |

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use thiserror::Error;
use url::Url;
use url::form_urlencoded;

use crate::config::AllowList;
use crate::types::Mention;

/// The only media type accepted for submissions.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("method {0} not allowed, expected POST")]
    MethodNotAllowed(Method),

    #[error("unsupported content type: {}", .0.as_deref().unwrap_or("<none>"))]
    UnsupportedContentType(Option<String>),

    #[error("body is not a valid form")]
    MalformedBody,

    #[error("missing form field: {0}")]
    MissingField(&'static str),

    #[error("source and target are the same URL")]
    SelfMention,

    #[error("{field} is not an absolute URL: {reason}")]
    InvalidUrl {
        field: &'static str,
        reason: url::ParseError,
    },

    #[error("target is not on the allow-list")]
    TargetNotAllowed,

    #[error("target scheme {0:?} is not http or https")]
    UnsupportedScheme(String),
}

impl Rejection {
    /// Index of the violated rule in evaluation order.
    pub fn rule_index(&self) -> usize {
        match self {
            Rejection::MethodNotAllowed(_) => 0,
            Rejection::UnsupportedContentType(_) => 1,
            Rejection::MalformedBody | Rejection::MissingField(_) => 2,
            Rejection::SelfMention => 3,
            Rejection::InvalidUrl { .. } => 4,
            Rejection::TargetNotAllowed => 5,
            Rejection::UnsupportedScheme(_) => 6,
        }
    }
}

/// Validates a raw submission and extracts the mention it claims.
pub fn validate_submission(
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
    allow_list: &AllowList,
) -> Result<Mention, Rejection> {
    if *method != Method::POST {
        return Err(Rejection::MethodNotAllowed(method.clone()));
    }

    check_content_type(headers)?;

    let mention = parse_form(body)?;

    if mention.source == mention.target {
        return Err(Rejection::SelfMention);
    }

    parse_absolute("source", &mention.source)?;
    let target = parse_absolute("target", &mention.target)?;

    if !allow_list.is_empty() && !allow_list.matches(&mention.target) {
        return Err(Rejection::TargetNotAllowed);
    }

    if !matches!(target.scheme(), "http" | "https") {
        return Err(Rejection::UnsupportedScheme(target.scheme().to_string()));
    }

    Ok(mention)
}

/// Boolean form of [`validate_submission`].
pub fn is_valid(
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
    allow_list: &AllowList,
) -> bool {
    validate_submission(method, headers, body, allow_list).is_ok()
}

fn check_content_type(headers: &HeaderMap) -> Result<(), Rejection> {
    let value = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(Rejection::UnsupportedContentType(None))?;

    // Ignore parameters such as `; charset=utf-8`.
    let media_type = value.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        Ok(())
    } else {
        Err(Rejection::UnsupportedContentType(Some(value.to_string())))
    }
}

/// Extracts `source` and `target` from a form body. The first occurrence of
/// each key wins.
fn parse_form(body: &[u8]) -> Result<Mention, Rejection> {
    if std::str::from_utf8(body).is_err() {
        return Err(Rejection::MalformedBody);
    }

    let mut source = None;
    let mut target = None;
    for (key, value) in form_urlencoded::parse(body) {
        match &*key {
            "source" if source.is_none() => source = Some(value.into_owned()),
            "target" if target.is_none() => target = Some(value.into_owned()),
            _ => {}
        }
    }

    let source = source
        .filter(|s| !s.is_empty())
        .ok_or(Rejection::MissingField("source"))?;
    let target = target
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::MissingField("target"))?;

    Ok(Mention::new(source, target))
}

fn parse_absolute(field: &'static str, value: &str) -> Result<Url, Rejection> {
    Url::parse(value).map_err(|reason| Rejection::InvalidUrl { field, reason })
}
