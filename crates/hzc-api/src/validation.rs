use crate::error::ApiError;

/// Code point ranges of CJK ideographs, including the extension blocks and
/// compatibility ideographs.
const CJK_RANGES: &[(u32, u32)] = &[
    (0x4E00, 0x9FFF),
    (0x3400, 0x4DBF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
    (0x2B740, 0x2B81F),
    (0x2B820, 0x2CEAF),
    (0xF900, 0xFAFF),
    (0x2F800, 0x2FA1F),
];

pub fn is_chinese_char(c: char) -> bool {
    let cp = u32::from(c);
    CJK_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

pub fn contains_chinese(text: &str) -> bool {
    text.chars().any(is_chinese_char)
}

/// Validate the Chinese side of a new card
///
/// # Examples
/// ```
/// use hzc_api::validation::validate_chinese_text;
///
/// assert!(validate_chinese_text("你好").is_ok());
/// assert!(validate_chinese_text("hello").is_err());
/// ```
pub fn validate_chinese_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::Validation(
            "Chinese text cannot be empty".to_string(),
        ));
    }

    if !contains_chinese(text) {
        return Err(ApiError::Validation(format!(
            "'{}' does not contain any Chinese characters",
            text.trim()
        )));
    }

    Ok(())
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
