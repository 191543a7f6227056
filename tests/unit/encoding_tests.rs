/*!
 * Tests for encoding detection and conversion
 */

use anyhow::Result;
use chm_translator::encoding::{self, EncodingResolver};
use chm_translator::errors::EncodingError;
use encoding_rs::{GBK, SHIFT_JIS, UTF_16LE, UTF_8, WINDOWS_1252};

const JAPANESE_PAGE: &str = "<html><body><h1>操作ガイド</h1><p>このヘルプでは、アプリケーションの基本的な使い方を説明します。\
設定画面を開いて、表示する言語を選択してください。</p></body></html>";

#[test]
fn test_decode_withUndeclaredShiftJis_shouldDetectIt() -> Result<()> {
    let (bytes, _, _) = SHIFT_JIS.encode(JAPANESE_PAGE);

    let decoded = EncodingResolver::new().decode(&bytes)?;

    assert_eq!(decoded.encoding, SHIFT_JIS);
    assert_eq!(decoded.text, JAPANESE_PAGE);
    Ok(())
}

#[test]
fn test_decode_withUtf8Text_shouldDetectUtf8() -> Result<()> {
    let decoded = EncodingResolver::new().decode(JAPANESE_PAGE.as_bytes())?;

    assert_eq!(decoded.encoding, UTF_8);
    assert_eq!(decoded.text, JAPANESE_PAGE);
    Ok(())
}

#[test]
fn test_decode_withUtf16ByteOrderMark_shouldStripMark() -> Result<()> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "目次".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let decoded = EncodingResolver::with_source_encoding(Some("gbk"))?.decode(&bytes)?;

    assert_eq!(decoded.encoding, UTF_16LE);
    assert_eq!(decoded.text, "目次");
    Ok(())
}

#[test]
fn test_decode_withForcedGbk_shouldUseIt() -> Result<()> {
    let (bytes, _, _) = GBK.encode("简体中文帮助");

    let decoded = EncodingResolver::with_source_encoding(Some("GB2312"))?.decode(&bytes)?;

    assert_eq!(decoded.encoding, GBK);
    assert_eq!(decoded.text, "简体中文帮助");
    Ok(())
}

#[test]
fn test_decode_withInvalidShiftJis_shouldFail() -> Result<()> {
    let resolver = EncodingResolver::with_source_encoding(Some("shift_jis"))?;

    let result = resolver.decode(b"<p>\x82</p>\x81");

    assert!(matches!(result, Err(EncodingError::DecodeFailed { .. })));
    Ok(())
}

#[test]
fn test_with_source_encoding_withBlankLabel_shouldDetect() -> Result<()> {
    let resolver = EncodingResolver::with_source_encoding(Some("  "))?;
    let (bytes, _, _) = SHIFT_JIS.encode(JAPANESE_PAGE);

    assert_eq!(resolver.detect(&bytes), (SHIFT_JIS, 0));
    Ok(())
}

#[test]
fn test_resolve_label_withAliases_shouldResolve() -> Result<()> {
    assert_eq!(encoding::resolve_label("utf8")?, UTF_8);
    assert_eq!(encoding::resolve_label(" Shift_JIS ")?, SHIFT_JIS);
    assert_eq!(encoding::resolve_label("latin1")?, WINDOWS_1252);
    assert!(encoding::resolve_label("replacement").is_err());
    Ok(())
}

#[test]
fn test_encode_withShiftJisOutput_shouldRoundTripThroughDecoder() -> Result<()> {
    let bytes = encoding::encode("目次と索引", SHIFT_JIS);

    let decoded = EncodingResolver::with_source_encoding(Some("shift_jis"))?.decode(&bytes)?;

    assert_eq!(decoded.text, "目次と索引");
    assert_eq!(encoding::default_output_encoding(), UTF_8);
    Ok(())
}
