/*!
 * Tests for language code utilities
 */

use anyhow::Result;
use chm_translator::language_utils::{self, LanguageCodeType};

#[test]
fn test_validate_language_code_withEachKind_shouldClassify() -> Result<()> {
    assert_eq!(language_utils::validate_language_code("ja")?, LanguageCodeType::Part1);
    assert_eq!(language_utils::validate_language_code("JPN")?, LanguageCodeType::Part2T);
    assert_eq!(language_utils::validate_language_code("chi")?, LanguageCodeType::Part2B);
    assert!(language_utils::validate_language_code("xx").is_err());
    assert!(language_utils::validate_language_code("").is_err());
    Ok(())
}

#[test]
fn test_normalize_withMixedCodes_shouldAgree() -> Result<()> {
    assert_eq!(language_utils::normalize_to_part2t("en")?, "eng");
    assert_eq!(language_utils::normalize_to_part2t("ger")?, "deu");
    assert_eq!(language_utils::normalize_to_part1_or_part2t("zho")?, "zh");
    assert_eq!(language_utils::normalize_to_part2t("fre")?, language_utils::normalize_to_part2t("fr")?);
    Ok(())
}

#[test]
fn test_get_language_name_shouldReturnEnglishName() -> Result<()> {
    assert_eq!(language_utils::get_language_name("ja")?, "Japanese");
    assert_eq!(language_utils::get_language_name("eng")?, "English");
    Ok(())
}

#[test]
fn test_locale_id_withKnownAndUnknownLanguages() {
    assert_eq!(language_utils::locale_id("en"), Some("0x409 English (United States)"));
    assert_eq!(language_utils::locale_id("jpn"), Some("0x411 Japanese"));
    assert_eq!(language_utils::locale_id("chi"), Some("0x804 Chinese (PRC)"));
    assert_eq!(language_utils::locale_id("haw"), None);
    assert_eq!(language_utils::locale_id("not a code"), None);
}

#[test]
fn test_output_marker_shouldUseUppercaseShortCode() {
    assert_eq!(language_utils::output_marker("eng"), "[EN] ");
    assert_eq!(language_utils::output_marker("haw"), "[HAW] ");
    assert_eq!(language_utils::output_marker("zz"), "[ZZ] ");
}
