//! Static security headers added to every response.

use actix_web::middleware::DefaultHeaders;

pub const XSS_PROTECTION: (&str, &str) = ("X-XSS-Protection", "1; mode=block");
pub const FRAME_OPTIONS: (&str, &str) = ("X-Frame-Options", "deny");

/// `X-XSS-Protection: 1; mode=block` and `X-Frame-Options: deny`, unless the
/// handler already set them.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(XSS_PROTECTION)
        .add(FRAME_OPTIONS)
}
