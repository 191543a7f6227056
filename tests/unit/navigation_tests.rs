/*!
 * Tests for contents and index label translation
 */

use std::sync::Arc;

use chm_translator::markup::MarkupTree;
use chm_translator::providers::mock::MockProvider;
use chm_translator::translation::{NavigationTranslator, TranslationClient};

const CONTENTS: &str = "<!DOCTYPE HTML PUBLIC \"-//IETF//DTD HTML//EN\">\r\n\
<HTML>\r\n<HEAD>\r\n<meta name=\"GENERATOR\" content=\"Microsoft&reg; HTML Help Workshop 4.1\">\r\n</HEAD><BODY>\r\n\
<OBJECT type=\"text/site properties\">\r\n\t<param name=\"ImageType\" value=\"Folder\">\r\n</OBJECT>\r\n\
<UL>\r\n\t<LI> <OBJECT type=\"text/sitemap\">\r\n\t\t<param name=\"Name\" value=\"はじめに\">\r\n\
\t\t<param name=\"Local\" value=\"intro.htm\">\r\n\t\t<param name=\"ImageNumber\" value=\"11\">\r\n\t\t</OBJECT>\r\n\
\t<UL>\r\n\t\t<LI> <OBJECT type=\"text/sitemap\">\r\n\t\t\t<param name=\"Name\" value=\"インストール\">\r\n\
\t\t\t<param name=\"Local\" value=\"install.htm\">\r\n\t\t\t</OBJECT>\r\n\t</UL>\r\n</UL>\r\n</BODY></HTML>\r\n";

fn translator(provider: MockProvider) -> NavigationTranslator {
    let client = Arc::new(TranslationClient::new(Arc::new(provider)));
    NavigationTranslator::new(client, "ja", "en")
}

#[tokio::test]
async fn test_translate_markup_withContentsFile_shouldChangeOnlyNameValues() {
    let provider = MockProvider::dictionary([("はじめに", "Introduction"), ("インストール", "Installation")]);

    let (translated, report) = translator(provider.clone()).translate_markup(CONTENTS).await;

    let expected = CONTENTS
        .replace("value=\"はじめに\"", "value=\"Introduction\"")
        .replace("value=\"インストール\"", "value=\"Installation\"");
    assert_eq!(translated, expected);
    assert_eq!(report.translated, 2);
    assert_eq!(
        provider.requests(),
        vec!["はじめに".to_string(), "インストール".to_string()]
    );
}

#[tokio::test]
async fn test_label_params_withPropertiesObject_shouldOnlySelectNameParams() {
    let tree = MarkupTree::parse(CONTENTS);

    let labels = NavigationTranslator::label_params(&tree);

    assert_eq!(labels.len(), 2);
}

#[tokio::test]
async fn test_translate_markup_withFailingLabel_shouldKeepOriginalValue() {
    let provider = MockProvider::dictionary([("はじめに", "Introduction")]);

    let (translated, report) = translator(provider).translate_markup(CONTENTS).await;

    assert!(translated.contains("value=\"Introduction\""));
    assert!(translated.contains("<param name=\"Name\" value=\"インストール\">"));
    assert_eq!(report.translated, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_translate_markup_withEmptyValueAndLowercaseName_shouldHandleBoth() {
    let provider = MockProvider::working();
    let index = "<UL><LI><OBJECT type=\"text/sitemap\"><param name=\"name\" value=\"\"><param name=\"name\" value=\"索引\"></OBJECT></UL>";

    let (translated, report) = translator(provider.clone()).translate_markup(index).await;

    assert_eq!(
        translated,
        "<UL><LI><OBJECT type=\"text/sitemap\"><param name=\"name\" value=\"\"><param name=\"name\" value=\"[EN] 索引\"></OBJECT></UL>"
    );
    assert_eq!(report.skipped, 1);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_markup_withParamOutsideObject_shouldLeaveItAlone() {
    let provider = MockProvider::working();
    let markup = "<param name=\"Name\" value=\"外\"><OBJECT><param name=\"Name\" value=\"中身\"></OBJECT>";

    let (translated, _) = translator(provider).translate_markup(markup).await;

    assert_eq!(
        translated,
        "<param name=\"Name\" value=\"外\"><OBJECT><param name=\"Name\" value=\"[EN] 中身\"></OBJECT>"
    );
}

#[tokio::test]
async fn test_translate_markup_withNamedEntityInLabel_shouldSendDecodedLabel() {
    let provider = MockProvider::working();
    let markup = "<OBJECT type=\"text/sitemap\"><param name=\"Name\" value=\"&Uuml;bersicht\"></OBJECT>";

    let (translated, _) = translator(provider.clone()).translate_markup(markup).await;

    assert_eq!(
        translated,
        "<OBJECT type=\"text/sitemap\"><param name=\"Name\" value=\"[EN] Übersicht\"></OBJECT>"
    );
    assert_eq!(provider.requests(), vec!["Übersicht".to_string()]);
}
