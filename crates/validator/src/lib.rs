//! Answer validation for vitrine
//!
//! The last gate before a generated answer reaches the user. Three
//! independent, composable checks:
//!
//! - [`ResponseValidator::literal_search`]: exact lookup in the raw
//!   markup, answered with the matching raw-text sentence
//! - [`ResponseValidator::corroborate`]: an answer must be supported by
//!   at least two independent sources
//! - [`ResponseValidator::anti_hallucination`]: numbers and
//!   benefit/guarantee claims must exist in the source material
//!
//! Rejected answers are not errors: the caller substitutes a
//! deterministic fallback, either a literal search hit or a
//! [`template_reply`] built purely from structured fields.

mod fallback;
mod validator;

pub use fallback::template_reply;
pub use validator::{ResponseValidator, Source, ValidationResult, ValidatorConfig};
