//! # MockupMagic Gate
//!
//! Server-side password gate for the MockupMagic mockup studio. The
//! browser front-end presents a shared password; on a match this service
//! issues an opaque gate token (`base64("<issued-at-millis>-verified")`)
//! with a 24 hour advisory expiry.
//!
//! The token is deliberately not a security boundary: it is unsigned,
//! never persisted, and nothing verifies it afterwards. The gate exists
//! to keep casual visitors out of a pre-launch UI, nothing more.

pub mod cli;
pub mod gate;
