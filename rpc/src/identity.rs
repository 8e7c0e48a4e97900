//! Caller identity from gateway headers.
//!
//! The identity gateway authenticates the user and forwards:
//! - `x-caller-email` (required)
//! - `x-caller-name` (defaults to the email)
//! - `x-caller-avatar`
//! - `x-caller-admin`: `true` or `1` asserts the admin claim

use axum::http::HeaderMap;
use reunite_types::{Caller, Identity};

use crate::error::RpcError;

pub const EMAIL_HEADER: &str = "x-caller-email";
pub const NAME_HEADER: &str = "x-caller-name";
pub const AVATAR_HEADER: &str = "x-caller-avatar";
pub const ADMIN_HEADER: &str = "x-caller-admin";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, RpcError> {
    let email = header(headers, EMAIL_HEADER).ok_or(RpcError::MissingIdentity(EMAIL_HEADER))?;
    let name = header(headers, NAME_HEADER).unwrap_or(email);

    let mut identity = Identity::new(name, email);
    if let Some(avatar) = header(headers, AVATAR_HEADER) {
        identity = identity.with_avatar(avatar);
    }

    let is_admin = header(headers, ADMIN_HEADER)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false);

    Ok(Caller { identity, is_admin })
}
