//! Offline pinyin transliteration used when a translation comes back
//! without pinyin.
//!
//! Readings come from the `pinyin` crate with tone marks. A short phrase
//! table takes precedence for words whose first dictionary reading is the
//! wrong one in context. Anything without a reading passes through
//! untouched, so the function is total.

use ::pinyin::ToPinyin;

/// Phrases containing a heteronym whose default reading is wrong here
const PHRASES: &[(&str, &str)] = &[
    ("银行", "yín háng"),
    ("音乐", "yīn yuè"),
    ("睡觉", "shuì jiào"),
    ("觉得", "jué de"),
    ("还是", "hái shì"),
    ("什么", "shén me"),
    ("朋友们", "péng yǒu men"),
];

/// Transliterate `text` into space-separated pinyin syllables.
///
/// Deterministic and never fails. Characters without a known reading are
/// kept as they are; whitespace in the input only separates tokens.
pub fn to_pinyin(text: &str) -> String {
    let mut syllables: Vec<String> = Vec::new();
    let mut passthrough = String::new();
    let mut rest = text.trim();

    while let Some(c) = rest.chars().next() {
        if let Some((phrase, reading)) = PHRASES.iter().find(|(p, _)| rest.starts_with(p)) {
            flush(&mut passthrough, &mut syllables);
            syllables.push((*reading).to_string());
            rest = &rest[phrase.len()..];
            continue;
        }

        if let Some(reading) = c.to_pinyin() {
            flush(&mut passthrough, &mut syllables);
            syllables.push(reading.with_tone().to_string());
        } else if c.is_whitespace() {
            flush(&mut passthrough, &mut syllables);
        } else {
            passthrough.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut passthrough, &mut syllables);

    syllables.join(" ")
}

fn flush(passthrough: &mut String, syllables: &mut Vec<String>) {
    if !passthrough.is_empty() {
        syllables.push(std::mem::take(passthrough));
    }
}
