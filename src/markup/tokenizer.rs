use once_cell::sync::Lazy;
use regex::Regex;

// @module: Lenient tokenizer for help-archive markup

// @const: One attribute: name, then an optional double-quoted, single-quoted or bare value
static ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// Elements whose content is raw text up to the matching close tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// How an attribute value was quoted in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    None,
}

/// An attribute as written in a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name with its original spelling
    pub name: String,
    /// Raw value, entities still escaped; `None` for valueless attributes
    pub value: Option<String>,
    /// Quote style of the value
    pub quote: Quote,
}

/// A lexical unit of markup; every variant borrows its exact source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Comment(&'a str),
    /// `<!DOCTYPE ...>`, `<?xml ...?>`, `<![CDATA[...]]>` and other `<!...>` constructs
    Declaration(&'a str),
    StartTag {
        raw: &'a str,
        name: &'a str,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        raw: &'a str,
        name: &'a str,
    },
}

/// Splits markup into tokens without ever failing.
///
/// Anything that does not look like a complete tag is returned as text, so the
/// concatenation of all token sources is always the input itself.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text_element: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_element: None,
        }
    }

    fn markup(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        let rest = &self.input[start..];
        let bytes = rest.as_bytes();

        if rest.starts_with("<!--") {
            let len = rest[4..].find("-->").map(|i| i + 7).unwrap_or(rest.len());
            self.pos += len;
            return Some(Token::Comment(&self.input[start..self.pos]));
        }

        if rest.starts_with("<![CDATA[") {
            let len = rest.find("]]>").map(|i| i + 3).unwrap_or(rest.len());
            self.pos += len;
            return Some(Token::Declaration(&self.input[start..self.pos]));
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let len = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            self.pos += len;
            return Some(Token::Declaration(&self.input[start..self.pos]));
        }

        if rest.starts_with("</") {
            if !bytes.get(2).is_some_and(|b| b.is_ascii_alphabetic()) {
                return None;
            }
            let len = rest.find('>')? + 1;
            let raw = &self.input[start..start + len];
            let name = tag_name(&raw[2..]);
            self.pos += len;
            return Some(Token::EndTag { raw, name });
        }

        if bytes.get(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            let len = start_tag_length(rest)?;
            let raw = &self.input[start..start + len];
            let name = tag_name(&raw[1..]);
            let inner = &raw[1 + name.len()..len - 1];
            let self_closing = inner.trim_end().ends_with('/');
            let attributes = parse_attributes(inner);
            self.pos += len;

            let lower = name.to_ascii_lowercase();
            if !self_closing && RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
                self.raw_text_element = Some(lower);
            }

            return Some(Token::StartTag {
                raw,
                name,
                attributes,
                self_closing,
            });
        }

        None
    }

    fn text(&mut self) -> Token<'a> {
        let start = self.pos;
        // The first character may be a '<' that did not open any markup
        let first_len = self.input[start..].chars().next().map_or(1, char::len_utf8);
        let mut search = start + first_len;

        loop {
            match self.input[search..].find('<') {
                Some(i) => {
                    let at = search + i;
                    if starts_markup(&self.input[at..]) {
                        self.pos = at;
                        break;
                    }
                    search = at + 1;
                }
                None => {
                    self.pos = self.input.len();
                    break;
                }
            }
        }

        Token::Text(&self.input[start..self.pos])
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.input.len() {
            return None;
        }

        if let Some(element) = self.raw_text_element.take() {
            let rest = &self.input[self.pos..];
            let end = find_closing_tag(rest, &element).unwrap_or(rest.len());
            if end > 0 {
                let text = &rest[..end];
                self.pos += end;
                return Some(Token::Text(text));
            }
        }

        if self.input[self.pos..].starts_with('<') {
            if let Some(token) = self.markup() {
                return Some(token);
            }
        }

        Some(self.text())
    }
}

/// Whether `s` (starting at a '<') opens something the tokenizer treats as markup
fn starts_markup(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.get(1) {
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => bytes.get(2).is_some_and(|b| b.is_ascii_alphabetic()),
        Some(b) => b.is_ascii_alphabetic(),
        None => false,
    }
}

fn tag_name(s: &str) -> &str {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(s.len());
    &s[..end]
}

/// Length of the start tag at the beginning of `rest`, honouring quoted values
fn start_tag_length(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut after_equals = false;

    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '>' => return Some(i + 1),
                '"' | '\'' if after_equals => quote = Some(c),
                '=' => {
                    after_equals = true;
                    continue;
                }
                c if c.is_whitespace() => continue,
                _ => {}
            },
        }
        after_equals = false;
    }

    None
}

/// Case-insensitive search for `</name` followed by a tag delimiter
fn find_closing_tag(haystack: &str, name: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    let needle = format!("</{}", name);
    let mut from = 0;

    while let Some(i) = lower[from..].find(&needle) {
        let at = from + i;
        let after = at + needle.len();
        match lower.as_bytes().get(after) {
            None | Some(b'>') | Some(b'/') => return Some(at),
            Some(b) if b.is_ascii_whitespace() => return Some(at),
            _ => from = after,
        }
    }

    None
}

fn parse_attributes(inner: &str) -> Vec<Attribute> {
    ATTRIBUTE_REGEX
        .captures_iter(inner)
        .map(|caps| {
            let name = caps[1].to_string();
            let (value, quote) = if let Some(v) = caps.get(2) {
                (Some(v.as_str().to_string()), Quote::Double)
            } else if let Some(v) = caps.get(3) {
                (Some(v.as_str().to_string()), Quote::Single)
            } else if let Some(v) = caps.get(4) {
                (Some(v.as_str().to_string()), Quote::None)
            } else {
                (None, Quote::None)
            };
            Attribute { name, value, quote }
        })
        .collect()
}
