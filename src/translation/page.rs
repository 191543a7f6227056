/*!
 * Page text rewriting.
 *
 * A page is parsed into a `MarkupTree`, every eligible text node is translated in
 * document order and replaced through the tree, and the tree is serialized again.
 * Nothing outside eligible text nodes changes, except a declared character set that
 * no longer matches the output encoding.
 */

use encoding_rs::Encoding;
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::encoding::{self, EncodingResolver};
use crate::errors::EncodingError;
use crate::markup::{MarkupTree, NodeId, NodeKind};
use crate::translation::TranslationClient;

/// Shortest text (in characters, after trimming) that is sent for translation
pub const MIN_TRANSLATABLE_CHARS: usize = 2;

/// Elements whose direct text content is never translated
pub const SKIPPED_CONTAINERS: &[&str] = &["script", "style", "img"];

static CHARSET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(charset\s*=\s*)([^\s;]+)").unwrap());

/// Counts of what happened to the text of one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageReport {
    /// Text nodes or labels replaced with a translation
    pub translated: usize,
    /// Eligible items whose translation failed and kept their original text
    pub failed: usize,
    /// Text nodes that were not eligible
    pub skipped: usize,
}

impl PageReport {
    pub fn merge(&mut self, other: PageReport) {
        self.translated += other.translated;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Whether a text node should be sent for translation
pub fn is_eligible(tree: &MarkupTree, id: NodeId) -> bool {
    if !matches!(tree.kind(id), NodeKind::Text(_)) {
        return false;
    }
    if tree
        .parent_element_name(id)
        .is_some_and(|name| SKIPPED_CONTAINERS.contains(&name))
    {
        return false;
    }
    tree.text(id)
        .map(|text| text.trim().chars().count() >= MIN_TRANSLATABLE_CHARS)
        .unwrap_or(false)
}

/// Split text into leading whitespace, core and trailing whitespace
pub(crate) fn split_whitespace(text: &str) -> (&str, &str, &str) {
    let core_start = text.len() - text.trim_start().len();
    let core_end = text.trim_end().len();
    if core_start >= core_end {
        return (text, "", "");
    }
    (&text[..core_start], &text[core_start..core_end], &text[core_end..])
}

/// Point every `<meta>` charset declaration at `encoding`
pub(crate) fn update_charset_declarations(tree: &mut MarkupTree, encoding: &'static Encoding) {
    let name = encoding.output_encoding().name();

    for id in tree.elements_named("meta") {
        let Some(element) = tree.element(id) else {
            continue;
        };

        let update = if let Some(charset) = element.attribute("charset") {
            (!charset.eq_ignore_ascii_case(name)).then(|| ("charset", name.to_string()))
        } else if element
            .attribute("http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("content-type"))
        {
            element.attribute("content").and_then(|content| {
                let current = CHARSET_REGEX.captures(&content)?.get(2)?.as_str().to_string();
                (!current.eq_ignore_ascii_case(name)).then(|| {
                    let replaced = CHARSET_REGEX.replace(&content, |caps: &regex::Captures| format!("{}{}", &caps[1], name));
                    ("content", replaced.into_owned())
                })
            })
        } else {
            None
        };

        if let Some((attribute, value)) = update {
            if let Err(e) = tree.set_attribute(id, attribute, &value) {
                warn!("Failed to declare charset {} in meta {}: {}", name, attribute, e);
                continue;
            }
            trace!("Declaring charset {} in meta {}", name, attribute);
        }
    }
}

/// Translates the text of markup pages
#[derive(Debug, Clone)]
pub struct PageTranslator {
    client: Arc<TranslationClient>,
    source_language: String,
    target_language: String,
    output_encoding: &'static Encoding,
}

impl PageTranslator {
    pub fn new(client: Arc<TranslationClient>, source_language: &str, target_language: &str) -> Self {
        Self {
            client,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            output_encoding: encoding::default_output_encoding(),
        }
    }

    pub fn with_output_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.output_encoding = encoding;
        self
    }

    /// Translate every eligible text node of the tree in document order
    pub async fn translate_tree(&self, tree: &mut MarkupTree) -> PageReport {
        let mut report = PageReport::default();

        for id in tree.text_nodes() {
            if !is_eligible(tree, id) {
                report.skipped += 1;
                continue;
            }

            let Ok(text) = tree.text(id).map(|t| t.into_owned()) else {
                continue;
            };
            let (leading, core, trailing) = split_whitespace(&text);

            let unit = self
                .client
                .translate_unit(core, &self.source_language, &self.target_language)
                .await;
            if unit.fell_back {
                report.failed += 1;
                continue;
            }

            let replacement = format!("{}{}{}", leading, unit.translated.trim(), trailing);
            if tree.replace_text(id, &replacement).is_ok() {
                report.translated += 1;
            }
        }

        report
    }

    /// Translate a page held as text
    pub async fn translate_markup(&self, markup: &str) -> (String, PageReport) {
        let mut tree = MarkupTree::parse(markup);
        let report = self.translate_tree(&mut tree).await;
        update_charset_declarations(&mut tree, self.output_encoding);
        (tree.serialize(), report)
    }

    /// Decode, translate and re-encode a page
    pub async fn translate_bytes(
        &self,
        bytes: &[u8],
        resolver: &EncodingResolver,
    ) -> Result<(Vec<u8>, PageReport), EncodingError> {
        let decoded = resolver.decode(bytes)?;
        debug!("Page decoded as {}", decoded.encoding.name());

        let (markup, report) = self.translate_markup(&decoded.text).await;
        Ok((encoding::encode(&markup, self.output_encoding).into_owned(), report))
    }
}
