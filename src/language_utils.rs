use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and normalizing ISO 639-1 (2-letter)
/// and ISO 639-2 (3-letter) language codes, and for naming languages the way help
/// project files expect.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterparts
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Windows locale identifiers used in the `Language=` option of help projects
const LOCALE_IDS: &[(&str, &str)] = &[
    ("ar", "0x401 Arabic (Saudi Arabia)"),
    ("cs", "0x405 Czech"),
    ("da", "0x406 Danish"),
    ("de", "0x407 German (Germany)"),
    ("el", "0x408 Greek"),
    ("en", "0x409 English (United States)"),
    ("es", "0xc0a Spanish (International Sort)"),
    ("fi", "0x40b Finnish"),
    ("fr", "0x40c French (France)"),
    ("he", "0x40d Hebrew"),
    ("hu", "0x40e Hungarian"),
    ("id", "0x421 Indonesian"),
    ("it", "0x410 Italian (Italy)"),
    ("ja", "0x411 Japanese"),
    ("ko", "0x412 Korean"),
    ("nb", "0x414 Norwegian (Bokmal)"),
    ("nl", "0x413 Dutch (Netherlands)"),
    ("no", "0x414 Norwegian (Bokmal)"),
    ("pl", "0x415 Polish"),
    ("pt", "0x416 Portuguese (Brazil)"),
    ("ro", "0x418 Romanian"),
    ("ru", "0x419 Russian"),
    ("sk", "0x41b Slovak"),
    ("sv", "0x41d Swedish"),
    ("th", "0x41e Thai"),
    ("tr", "0x41f Turkish"),
    ("uk", "0x422 Ukrainian"),
    ("vi", "0x42a Vietnamese"),
    ("zh", "0x804 Chinese (PRC)"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if part2b_to_part2t(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match validate_language_code(&normalized_code)? {
        LanguageCodeType::Part1 => Language::from_639_1(&normalized_code)
            .map(|lang| lang.to_639_3().to_string())
            .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code)),
        LanguageCodeType::Part2T => Ok(normalized_code),
        LanguageCodeType::Part2B => part2b_to_part2t(&normalized_code)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang
        .to_639_1()
        .map(str::to_string)
        .unwrap_or(part2t))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Windows locale identifier for a language, as written in a help project file
pub fn locale_id(code: &str) -> Option<&'static str> {
    let part1 = normalize_to_part1_or_part2t(code).ok()?;
    LOCALE_IDS
        .iter()
        .find(|(c, _)| *c == part1)
        .map(|(_, lcid)| *lcid)
}

/// Default output file name prefix for a target language, e.g. `[EN] `
pub fn output_marker(target_language: &str) -> String {
    let code = normalize_to_part1_or_part2t(target_language).unwrap_or_else(|_| target_language.trim().to_string());
    format!("[{}] ", code.to_uppercase())
}
