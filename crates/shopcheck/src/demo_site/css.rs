//! The CSS subset the simulated storefront understands: compound selectors
//! (`tag`, `*`, `.class`, `#id`, `[attr]`, `[attr=value]`) joined by the
//! descendant combinator.

use regex::Regex;
use std::sync::OnceLock;

use crate::result::{ShopcheckError, ShopcheckResult};

static TAG: OnceLock<Regex> = OnceLock::new();
static TOKEN: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG.get_or_init(|| Regex::new(r"^(\*|[a-zA-Z][a-zA-Z0-9-]*)").unwrap())
}

fn token_re() -> &'static Regex {
    TOKEN.get_or_init(|| {
        Regex::new(
            r#"\.([\w-]+)|#([\w-]+)|\[\s*([\w-]+)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\]\s"']+))\s*)?\]"#,
        )
        .unwrap()
    })
}

/// `[name]` or `[name=value]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrTest {
    pub name: String,
    pub value: Option<String>,
}

/// One compound selector, e.g. `div.inventory_item[data-test="inventory-item"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrTest>,
}

impl Compound {
    /// Whether an element with this tag and these attributes matches
    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        if self.tag.as_deref().is_some_and(|t| !t.eq_ignore_ascii_case(tag)) {
            return false;
        }
        if !self.ids.iter().all(|id| attr("id") == Some(id.as_str())) {
            return false;
        }
        let classes = attr("class").unwrap_or_default();
        if !self
            .classes
            .iter()
            .all(|c| classes.split_whitespace().any(|have| have == c))
        {
            return false;
        }
        self.attrs.iter().all(|test| match (&test.value, attr(&test.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        })
    }
}

/// A parsed selector: compounds from outermost to innermost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    pub compounds: Vec<Compound>,
}

impl CssSelector {
    pub fn parse(source: &str) -> ShopcheckResult<Self> {
        let invalid = |message: &str| ShopcheckError::InvalidSelector {
            selector: source.to_string(),
            message: message.to_string(),
        };
        let compounds = split_compounds(source)
            .map_err(|m| invalid(&m))?
            .into_iter()
            .map(|part| parse_compound(part).map_err(|m| invalid(&m)))
            .collect::<ShopcheckResult<Vec<_>>>()?;
        if compounds.is_empty() {
            return Err(invalid("empty selector"));
        }
        Ok(Self { compounds })
    }
}

/// Split on whitespace outside brackets and quotes
fn split_compounds(source: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut start = None;
    let mut depth = 0_u32;
    let mut quote: Option<char> = None;

    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>' | '+' | '~' | ',' | ':') if depth == 0 => {
                return Err(format!("'{c}' is not supported"));
            }
            (None, c) if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&source[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if quote.is_some() || depth > 0 {
        return Err("unbalanced brackets or quotes".to_string());
    }
    if let Some(s) = start {
        parts.push(&source[s..]);
    }
    Ok(parts)
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut rest = part;
    if let Some(m) = tag_re().find(part) {
        if m.as_str() != "*" {
            compound.tag = Some(m.as_str().to_ascii_lowercase());
        }
        rest = &part[m.end()..];
    }
    let mut cursor = 0;
    for caps in token_re().captures_iter(rest) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() != cursor {
            break;
        }
        cursor = whole.end();
        if let Some(class) = caps.get(1) {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(id) = caps.get(2) {
            compound.ids.push(id.as_str().to_string());
        } else if let Some(name) = caps.get(3) {
            let value = caps
                .get(4)
                .or_else(|| caps.get(5))
                .or_else(|| caps.get(6))
                .map(|v| v.as_str().to_string());
            compound.attrs.push(AttrTest {
                name: name.as_str().to_string(),
                value,
            });
        }
    }
    if cursor != rest.len() {
        return Err(format!("cannot parse '{}'", &rest[cursor..]));
    }
    Ok(compound)
}
