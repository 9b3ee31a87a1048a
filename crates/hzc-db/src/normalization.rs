//! Duplicate-detection key for card text.
//!
//! Two cards are duplicates when their Chinese text matches after trimming
//! surrounding whitespace and ignoring case. Text is NFC-composed first so
//! that the same pinyin-with-tones typed two ways still compares equal.

use unicode_normalization::UnicodeNormalization;

/// Normalize card text into the key used for duplicate detection.
///
/// Applies the following transformations in order:
/// 1. Trim surrounding whitespace
/// 2. Unicode NFC composition
/// 3. Lowercase
pub fn normalize_chinese_key(s: &str) -> String {
    s.trim().nfc().collect::<String>().to_lowercase()
}
