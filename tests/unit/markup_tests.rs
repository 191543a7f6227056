/*!
 * Tests for the markup tree
 */

use anyhow::Result;
use chm_translator::markup::{MarkupTree, NodeKind};

const LEGACY_PAGE: &str = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\r\n\
<HTML>\r\n<HEAD>\r\n<meta http-equiv=\"Content-Type\" content=\"text/html; charset=Shift_JIS\">\r\n\
<TITLE>操作ガイド</TITLE>\r\n<style type=\"text/css\">p > a { color: red }</style>\r\n</HEAD>\r\n\
<BODY bgcolor=#FFFFFF TEXT='black'>\r\n<!-- generated -->\r\n<H1 align=center>はじめに</H1>\r\n\
<P>A &amp; B&nbsp;&copy; 2004<BR>\r\n<IMG SRC=\"img/a.gif\" ALT=\"図\">\r\n\
<script language=\"JavaScript\">if (a < b && c > d) { document.write(\"</p>\"); }</script>\r\n\
<TABLE><TR><TD>1<TD>2</TABLE></font>\r\n</BODY>\r\n</HTML>\r\n";

#[test]
fn test_serialize_withUntouchedLegacyPage_shouldBeByteIdentical() {
    let tree = MarkupTree::parse(LEGACY_PAGE);

    assert_eq!(tree.serialize(), LEGACY_PAGE);
    assert_eq!(tree.to_string(), LEGACY_PAGE);
}

#[test]
fn test_serialize_withMalformedInput_shouldNeverLoseBytes() {
    let inputs = [
        "",
        "plain text only",
        "<p>unclosed <b>bold",
        "</div> stray end tag",
        "a < b and c <= d",
        "<p attr=\"unterminated>text",
        "<!-- unterminated comment",
        "<a href=x.htm>link</A>",
    ];

    for input in inputs {
        assert_eq!(MarkupTree::parse(input).serialize(), input, "input: {:?}", input);
    }
}

#[test]
fn test_text_withCharacterReferences_shouldDecode() -> Result<()> {
    let tree = MarkupTree::parse("<p>A &amp; B&nbsp;&#x3042;</p>");
    let id = tree.text_nodes()[0];

    assert_eq!(tree.text(id)?, "A & B\u{a0}あ");
    Ok(())
}

#[test]
fn test_scriptContent_withMarkupInside_shouldStayOneTextNode() {
    let tree = MarkupTree::parse("<script>document.write(\"<p>x</p>\");</script><p>after</p>");
    let script = tree.elements_named("script")[0];

    assert_eq!(tree.children(script).len(), 1);
    assert!(matches!(tree.kind(tree.children(script)[0]), NodeKind::Text(_)));
    assert_eq!(tree.elements_named("p").len(), 1);
}

#[test]
fn test_replace_text_withMarkupCharacters_shouldNotChangeStructure() -> Result<()> {
    let mut tree = MarkupTree::parse("<div><p>old</p><p>keep</p></div>");
    let first = tree.text_nodes()[0];

    tree.replace_text(first, "<b>new</b> & more")?;

    assert_eq!(
        tree.serialize(),
        "<div><p>&lt;b&gt;new&lt;/b&gt; &amp; more</p><p>keep</p></div>"
    );
    let reparsed = MarkupTree::parse(&tree.serialize());
    assert_eq!(reparsed.elements_named("b").len(), 0);
    assert_eq!(reparsed.elements_named("p").len(), 2);
    Ok(())
}

#[test]
fn test_replace_text_withElementId_shouldFail() {
    let mut tree = MarkupTree::parse("<p>x</p>");
    let p = tree.elements_named("p")[0];

    assert!(tree.replace_text(p, "y").is_err());
    assert_eq!(tree.serialize(), "<p>x</p>");
}

#[test]
fn test_set_attribute_withQuoteInValue_shouldEscapeAndTouchOnlyThatTag() -> Result<()> {
    let source = "<OBJECT type=\"text/sitemap\">\n<param name=\"Name\" value=\"old\">\n<param name=\"Local\" value=\"a.htm\">\n</OBJECT>";
    let mut tree = MarkupTree::parse(source);
    let name_param = tree.elements_named("param")[0];

    tree.set_attribute(name_param, "value", "say \"hi\" & <go>")?;

    assert_eq!(
        tree.serialize(),
        "<OBJECT type=\"text/sitemap\">\n<param name=\"Name\" value=\"say &quot;hi&quot; &amp; &lt;go&gt;\">\n<param name=\"Local\" value=\"a.htm\">\n</OBJECT>"
    );
    let value = tree.element(name_param).and_then(|e| e.attribute("value")).map(|v| v.into_owned());
    assert_eq!(value.as_deref(), Some("say \"hi\" & <go>"));
    Ok(())
}

#[test]
fn test_parse_withNavigationList_shouldNestObjectsUnderListItems() {
    let source = "<UL><LI><OBJECT type=\"text/sitemap\"><param name=\"Name\" value=\"A\"></OBJECT>\
<UL><LI><OBJECT type=\"text/sitemap\"><param name=\"Name\" value=\"A.1\"></OBJECT></UL>\
<LI><OBJECT type=\"text/sitemap\"><param name=\"Name\" value=\"B\"></OBJECT></UL>";
    let tree = MarkupTree::parse(source);

    let outer = tree.elements_named("ul")[0];
    assert_eq!(tree.children(outer).len(), 2);
    for param in tree.elements_named("param") {
        let parent = tree.parent(param).and_then(|p| tree.element(p)).map(|e| e.name().to_string());
        assert_eq!(parent.as_deref(), Some("object"));
    }
    assert_eq!(tree.serialize(), source);
}
