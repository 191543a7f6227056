use encoding_rs::Encoding;
use log::debug;
use std::sync::Arc;

use crate::encoding::{self, EncodingResolver};
use crate::errors::EncodingError;
use crate::markup::{MarkupTree, NodeId};
use crate::translation::page::{update_charset_declarations, PageReport};
use crate::translation::TranslationClient;

// @module: Label translation for contents (.hhc) and index (.hhk) files

/// Parameter whose value is the visible label of a navigation record
const LABEL_PARAM: &str = "Name";

/// Translates the `Name` labels of navigation records.
///
/// Records look like `<OBJECT type="text/sitemap"><param name="Name" value="..."><param
/// name="Local" value="page.htm"></OBJECT>`. Only the `value` of `Name` params changes;
/// links, image numbers and the text between records stay byte-identical.
#[derive(Debug, Clone)]
pub struct NavigationTranslator {
    client: Arc<TranslationClient>,
    source_language: String,
    target_language: String,
    output_encoding: &'static Encoding,
}

impl NavigationTranslator {
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

    /// `param` elements inside an `object` whose name is `Name`, in document order
    pub fn label_params(tree: &MarkupTree) -> Vec<NodeId> {
        tree.elements_named("param")
            .into_iter()
            .filter(|id| {
                tree.element(*id)
                    .and_then(|e| e.attribute("name"))
                    .is_some_and(|name| name.eq_ignore_ascii_case(LABEL_PARAM))
            })
            .filter(|id| has_object_ancestor(tree, *id))
            .collect()
    }

    pub async fn translate_tree(&self, tree: &mut MarkupTree) -> PageReport {
        let mut report = PageReport::default();

        for id in Self::label_params(tree) {
            let Some(value) = tree
                .element(id)
                .and_then(|e| e.attribute("value"))
                .map(|v| v.into_owned())
            else {
                report.skipped += 1;
                continue;
            };
            if value.trim().is_empty() {
                report.skipped += 1;
                continue;
            }

            let unit = self
                .client
                .translate_unit(&value, &self.source_language, &self.target_language)
                .await;
            if unit.fell_back {
                report.failed += 1;
                continue;
            }

            if tree.set_attribute(id, "value", unit.translated.trim()).is_ok() {
                report.translated += 1;
            }
        }

        debug!(
            "Navigation labels: {} translated, {} failed",
            report.translated, report.failed
        );
        report
    }

    pub async fn translate_markup(&self, markup: &str) -> (String, PageReport) {
        let mut tree = MarkupTree::parse(markup);
        let report = self.translate_tree(&mut tree).await;
        update_charset_declarations(&mut tree, self.output_encoding);
        (tree.serialize(), report)
    }

    pub async fn translate_bytes(
        &self,
        bytes: &[u8],
        resolver: &EncodingResolver,
    ) -> Result<(Vec<u8>, PageReport), EncodingError> {
        let decoded = resolver.decode(bytes)?;
        let (markup, report) = self.translate_markup(&decoded.text).await;
        Ok((encoding::encode(&markup, self.output_encoding).into_owned(), report))
    }
}

fn has_object_ancestor(tree: &MarkupTree, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    while let Some(parent) = current {
        if tree.element(parent).is_some_and(|e| e.name() == "object") {
            return true;
        }
        current = tree.parent(parent);
    }
    false
}
