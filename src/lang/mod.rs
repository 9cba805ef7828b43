//! Language-code resolution.
//!
//! Turns free-form language strings (`"Spanish"`, `"es-MX"`, `"deutsch"`)
//! into normalized ISO-639 primary subtags the translation and synthesis
//! services accept.  Resolution never fails — unknown input falls back to
//! the default code (`"en"`).

pub mod code;

pub use code::{LanguageCode, AUTO, DEFAULT_CODE};
