//! Input validation for untrusted data.
//!
//! Every template id, name and markup body arriving over HTTP is checked
//! here before it reaches the store.

use thiserror::Error;

/// Maximum length for template IDs (UUIDs are 36 chars).
pub const MAX_TEMPLATE_ID_LEN: usize = 64;
/// Maximum length for template names.
pub const MAX_TEMPLATE_NAME_LEN: usize = 200;
/// Maximum size of a template's HTML.
pub const MAX_HTML_LEN: usize = 5 * 1024 * 1024; // 5MB
/// Maximum size of a template's CSS.
pub const MAX_CSS_LEN: usize = 5 * 1024 * 1024; // 5MB

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Template ID exceeds maximum length.
    #[error("template id too long (max {MAX_TEMPLATE_ID_LEN} chars)")]
    IdTooLong,
    /// Template ID is empty or contains invalid characters.
    #[error("template id contains invalid characters")]
    IdInvalidChars,
    /// Name missing or blank.
    #[error("Both 'name' and 'html' fields are required.")]
    NameRequired,
    /// Name exceeds maximum length.
    #[error("template name too long (max {MAX_TEMPLATE_NAME_LEN} chars)")]
    NameTooLong,
    /// HTML missing or blank.
    #[error("Both 'name' and 'html' fields are required.")]
    HtmlRequired,
    /// HTML exceeds maximum size.
    #[error("template html too large (max {MAX_HTML_LEN} bytes)")]
    HtmlTooLarge,
    /// CSS exceeds maximum size.
    #[error("template css too large (max {MAX_CSS_LEN} bytes)")]
    CssTooLarge,
}

impl ValidationError {
    /// Short label used for the validation failure metric.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IdTooLong | Self::IdInvalidChars => "template_id",
            Self::NameRequired | Self::NameTooLong => "name",
            Self::HtmlRequired | Self::HtmlTooLarge => "html",
            Self::CssTooLarge => "css",
        }
    }
}

/// Check if a character is valid for IDs (ASCII alphanumeric, hyphen, or underscore).
fn is_valid_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Validate a template ID.
///
/// Valid template IDs:
/// - 1-64 characters
/// - ASCII alphanumeric, hyphen, underscore only (UUIDs are valid)
///
/// IDs double as file names in the data directory, so anything that could
/// escape it is refused here.
///
/// # Errors
///
/// Returns [`ValidationError::IdTooLong`] if the ID exceeds 64 characters.
/// Returns [`ValidationError::IdInvalidChars`] if the ID is empty or contains invalid characters.
pub fn validate_template_id(id: &str) -> Result<(), ValidationError> {
    if id.len() > MAX_TEMPLATE_ID_LEN {
        return Err(ValidationError::IdTooLong);
    }
    if id.is_empty() || !id.chars().all(is_valid_id_char) {
        return Err(ValidationError::IdInvalidChars);
    }
    Ok(())
}

/// Validate a template name. Leading and trailing whitespace is ignored.
///
/// # Errors
///
/// Returns [`ValidationError::NameRequired`] for a blank name and
/// [`ValidationError::NameTooLong`] past 200 characters.
pub fn validate_template_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if name.chars().count() > MAX_TEMPLATE_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Validate template HTML.
///
/// # Errors
///
/// Returns [`ValidationError::HtmlRequired`] for blank markup and
/// [`ValidationError::HtmlTooLarge`] past 5MB.
pub fn validate_html(html: &str) -> Result<(), ValidationError> {
    if html.len() > MAX_HTML_LEN {
        return Err(ValidationError::HtmlTooLarge);
    }
    if html.trim().is_empty() {
        return Err(ValidationError::HtmlRequired);
    }
    Ok(())
}

/// Validate template CSS. Empty CSS is allowed.
///
/// # Errors
///
/// Returns [`ValidationError::CssTooLarge`] past 5MB.
pub fn validate_css(css: &str) -> Result<(), ValidationError> {
    if css.len() > MAX_CSS_LEN {
        return Err(ValidationError::CssTooLarge);
    }
    Ok(())
}

/// Validate every field of a template body.
///
/// # Errors
///
/// Returns the first failing field's error, checked name, html, css.
pub fn validate_template(name: &str, html: &str, css: &str) -> Result<(), ValidationError> {
    validate_template_name(name)?;
    validate_html(html)?;
    validate_css(css)
}
