/*!
 * Tests for page text translation
 */

use anyhow::Result;
use std::sync::Arc;

use chm_translator::encoding::EncodingResolver;
use chm_translator::markup::MarkupTree;
use chm_translator::providers::mock::MockProvider;
use chm_translator::translation::{PageTranslator, TranslationClient};

fn translator(provider: MockProvider) -> PageTranslator {
    let client = Arc::new(TranslationClient::new(Arc::new(provider)));
    PageTranslator::new(client, "ja", "en")
}

/// Removes the text of every text node, leaving only the structure
fn skeleton(markup: &str) -> String {
    let mut tree = MarkupTree::parse(markup);
    for id in tree.text_nodes() {
        let _ = tree.replace_text(id, "");
    }
    tree.serialize()
}

#[tokio::test]
async fn test_translate_markup_withWorkingProvider_shouldPreserveStructure() {
    let page = "<html><head><title>ヘルプ</title></head>\n<body class=main>\n<h1>はじめに</h1>\n<p>こんにちは<br>世界</p>\n</body></html>";

    let (translated, report) = translator(MockProvider::working()).translate_markup(page).await;

    assert_eq!(
        translated,
        "<html><head><title>[EN] ヘルプ</title></head>\n<body class=main>\n<h1>[EN] はじめに</h1>\n<p>[EN] こんにちは<br>[EN] 世界</p>\n</body></html>"
    );
    assert_eq!(skeleton(&translated), skeleton(page));
    assert_eq!(report.translated, 4);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_translate_markup_withShortAndScriptText_shouldSkipThem() {
    let provider = MockProvider::working();
    let page = "<p>a</p><p>ab</p><p> \n </p><script>var s = \"こんにちは\";</script><style>p { x: y }</style><p>日本</p>";

    let (translated, report) = translator(provider.clone()).translate_markup(page).await;

    assert_eq!(
        translated,
        "<p>a</p><p>[EN] ab</p><p> \n </p><script>var s = \"こんにちは\";</script><style>p { x: y }</style><p>[EN] 日本</p>"
    );
    assert_eq!(provider.requests(), vec!["ab".to_string(), "日本".to_string()]);
    assert_eq!(report.translated, 2);
    assert_eq!(report.skipped, 4);
}

#[tokio::test]
async fn test_translate_markup_withFailingProvider_shouldKeepPageByteIdentical() {
    let page = "<HTML><BODY>\r\n<P>最初の段落</P>\r\n<P>A &amp; B の説明</P>\r\n</BODY></HTML>";

    let (translated, report) = translator(MockProvider::failing()).translate_markup(page).await;

    assert_eq!(translated, page);
    assert_eq!(report.translated, 0);
    assert_eq!(report.failed, 2);
}

#[tokio::test]
async fn test_translate_markup_withPartialDictionary_shouldFallBackPerNode() {
    let provider = MockProvider::dictionary([("はい", "Yes")]);
    let page = "<ul><li>はい</li><li>いいえ</li></ul>";

    let (translated, report) = translator(provider).translate_markup(page).await;

    assert_eq!(translated, "<ul><li>Yes</li><li>いいえ</li></ul>");
    assert_eq!(report.translated, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_translate_markup_withSurroundingWhitespace_shouldKeepIt() {
    let provider = MockProvider::dictionary([("設定を開く", "Open settings")]);
    let page = "<td>\r\n    設定を開く\r\n</td>";

    let (translated, _) = translator(provider.clone()).translate_markup(page).await;

    assert_eq!(translated, "<td>\r\n    Open settings\r\n</td>");
    assert_eq!(provider.requests(), vec!["設定を開く".to_string()]);
}

#[tokio::test]
async fn test_translate_markup_withMarkupInTranslation_shouldEscapeIt() {
    let provider = MockProvider::dictionary([("比較", "a < b & <i>c</i>")]);

    let (translated, _) = translator(provider).translate_markup("<p>比較</p>").await;

    assert_eq!(translated, "<p>a &lt; b &amp; &lt;i&gt;c&lt;/i&gt;</p>");
}

#[tokio::test]
async fn test_translate_markup_withEntities_shouldSendDecodedText() {
    let provider = MockProvider::dictionary([("R&D 部門", "R&D department")]);

    let (translated, _) = translator(provider).translate_markup("<p>R&amp;D 部門</p>").await;

    assert_eq!(translated, "<p>R&amp;D department</p>");
}

#[tokio::test]
async fn test_translate_markup_withHtmlNamedEntities_shouldSendDecodedText() {
    let provider = MockProvider::working();

    let (translated, _) = translator(provider.clone()).translate_markup("<p>caf&eacute; cr&egrave;me</p>").await;

    assert_eq!(translated, "<p>[EN] café crème</p>");
    assert_eq!(provider.requests(), vec!["café crème".to_string()]);
}

#[tokio::test]
async fn test_translate_bytes_withShiftJisPage_shouldWriteUtf8AndUpdateCharset() -> Result<()> {
    let page = "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=shift_jis\"></head><body><p>目次</p></body></html>";
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(page);
    let resolver = EncodingResolver::with_source_encoding(Some("shift_jis"))?;
    let provider = MockProvider::dictionary([("目次", "Contents")]);

    let (output, report) = translator(provider).translate_bytes(&bytes, &resolver).await?;

    assert_eq!(
        String::from_utf8(output)?,
        "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\"></head><body><p>Contents</p></body></html>"
    );
    assert_eq!(report.translated, 1);
    Ok(())
}

#[tokio::test]
async fn test_translate_bytes_withUtf16OutputEncoding_shouldDeclareTheBytesWritten() -> Result<()> {
    let page = "<html><head><meta charset=\"shift_jis\"></head><body><p>目次</p></body></html>";
    let resolver = EncodingResolver::with_source_encoding(Some("utf-8"))?;
    let provider = MockProvider::dictionary([("目次", "Contents")]);
    let translator = translator(provider).with_output_encoding(encoding_rs::UTF_16LE);

    let (output, _) = translator.translate_bytes(page.as_bytes(), &resolver).await?;

    assert_eq!(
        String::from_utf8(output)?,
        "<html><head><meta charset=\"UTF-8\"></head><body><p>Contents</p></body></html>"
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_bytes_withMalformedBytes_shouldReportDecodeError() -> Result<()> {
    let resolver = EncodingResolver::with_source_encoding(Some("utf-8"))?;
    let bytes = b"<p>broken \xFF\xFE text</p>";

    let result = translator(MockProvider::working()).translate_bytes(bytes, &resolver).await;

    assert!(result.is_err());
    Ok(())
}
