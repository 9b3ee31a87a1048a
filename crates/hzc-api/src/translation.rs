//! Boundary to the translation service used when creating cards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pinyin::to_pinyin;

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("translation service unavailable: {0}")]
    Unavailable(String),
    #[error("no translation found for '{0}'")]
    NoResult(String),
}

/// Result of translating a piece of Chinese text. Services may omit pinyin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub chinese: String,
    pub pinyin: Option<String>,
    pub english: String,
}

pub trait Translator: Send + Sync {
    fn translate(&self, chinese: &str) -> Result<Translation, TranslationError>;
}

/// Offline translator backed by a fixed glossary.
#[derive(Debug, Clone)]
pub struct GlossaryTranslator {
    entries: Vec<(String, Option<String>, String)>,
}

impl GlossaryTranslator {
    pub fn new() -> Self {
        let entries = [
            ("你好", Some("nǐ hǎo"), "hello"),
            ("谢谢", Some("xiè xiè"), "thank you"),
            ("再见", Some("zài jiàn"), "goodbye"),
            ("中国", Some("zhōng guó"), "China"),
            ("学习", None, "to study"),
            ("语言", None, "language"),
            ("汉语", None, "Chinese language"),
            ("英语", None, "English language"),
            ("水", None, "water"),
            ("茶", None, "tea"),
            ("米饭", None, "cooked rice"),
            ("我爱你", None, "I love you"),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(c, p, e)| (c.to_string(), p.map(str::to_string), e.to_string()))
                .collect(),
        }
    }

    /// Add or replace a glossary entry.
    pub fn with_entry(
        mut self,
        chinese: impl Into<String>,
        pinyin: Option<String>,
        english: impl Into<String>,
    ) -> Self {
        let chinese = chinese.into();
        self.entries.retain(|(c, _, _)| *c != chinese);
        self.entries.push((chinese, pinyin, english.into()));
        self
    }
}

impl Default for GlossaryTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for GlossaryTranslator {
    fn translate(&self, chinese: &str) -> Result<Translation, TranslationError> {
        let text = chinese.trim();
        self.entries
            .iter()
            .find(|(c, _, _)| c == text)
            .map(|(c, pinyin, english)| Translation {
                chinese: c.clone(),
                pinyin: pinyin.clone(),
                english: english.clone(),
            })
            .ok_or_else(|| TranslationError::NoResult(text.to_string()))
    }
}

/// Translate `chinese`, filling in pinyin locally if the service left it
/// out or returned it blank.
pub fn translate_with_fallback(
    translator: &dyn Translator,
    chinese: &str,
) -> Result<Translation, TranslationError> {
    let mut translation = translator.translate(chinese)?;
    let missing = translation
        .pinyin
        .as_deref()
        .is_none_or(|p| p.trim().is_empty());
    if missing {
        tracing::debug!(chinese = %translation.chinese, "pinyin missing, using local fallback");
        translation.pinyin = Some(to_pinyin(&translation.chinese));
    }
    Ok(translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Translator for Offline {
        fn translate(&self, _: &str) -> Result<Translation, TranslationError> {
            Err(TranslationError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_glossary_hit() {
        let t = GlossaryTranslator::new().translate("你好").unwrap();
        assert_eq!(t.english, "hello");
        assert_eq!(t.pinyin.as_deref(), Some("nǐ hǎo"));
    }

    #[test]
    fn test_glossary_miss() {
        assert!(matches!(
            GlossaryTranslator::new().translate("龘"),
            Err(TranslationError::NoResult(_))
        ));
    }

    #[test]
    fn test_fallback_fills_missing_pinyin() {
        let translator = GlossaryTranslator::new();
        let t = translate_with_fallback(&translator, "学习").unwrap();
        assert_eq!(t.pinyin.as_deref(), Some("xué xí"));
        assert_eq!(t.english, "to study");
    }

    #[test]
    fn test_fallback_fills_blank_pinyin() {
        let translator = GlossaryTranslator::new().with_entry("你好", Some("  ".into()), "hi");
        let t = translate_with_fallback(&translator, "你好").unwrap();
        assert_eq!(t.pinyin.as_deref(), Some("nǐ hǎo"));
        assert_eq!(t.english, "hi");
    }

    #[test]
    fn test_service_failure_is_returned() {
        assert!(matches!(
            translate_with_fallback(&Offline, "你好"),
            Err(TranslationError::Unavailable(_))
        ));
    }
}
