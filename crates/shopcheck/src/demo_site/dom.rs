//! Virtual DOM for the simulated storefront.
//!
//! Screens are rendered as a [`Node`] tree, then flattened into a [`Dom`]
//! arena in document (pre-order) order. An element's id is its child-index
//! path from the root (`e:0.2.1`), so it stays stable across re-renders of
//! the same screen and goes stale once the screen changes shape.

use std::collections::BTreeSet;

use super::css::{Compound, CssSelector};
use super::store::Action;
use crate::driver::ElementHandle;
use crate::locator::{normalize_whitespace, text_matches, AriaRole, Filter, Selector, Step};
use crate::result::ShopcheckResult;

/// Element under construction
#[derive(Debug, Clone, Default)]
pub struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
    action: Option<Action>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn test_id(self, id: impl Into<String>) -> Self {
        self.attr("data-test", id)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on_click(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Add the `hidden` attribute when `hidden` is true
    pub fn hidden_if(self, hidden: bool) -> Self {
        if hidden {
            self.attr("hidden", "")
        } else {
            self
        }
    }
}

#[derive(Debug)]
struct Element {
    path: String,
    tag: String,
    attrs: Vec<(String, String)>,
    parent: Option<usize>,
    /// One past the last index of this element's subtree
    end: usize,
    action: Option<Action>,
    visible: bool,
    text: String,
}

/// Flattened, queryable document
#[derive(Debug)]
pub struct Dom {
    elements: Vec<Element>,
}

impl Dom {
    pub fn build(root: Node) -> Self {
        let mut dom = Self {
            elements: Vec::new(),
        };
        let _ = dom.push(root, None, "e:0".to_string(), true);
        dom
    }

    fn push(&mut self, node: Node, parent: Option<usize>, path: String, parent_visible: bool) -> usize {
        let hidden = node.attrs.iter().any(|(n, _)| n == "hidden")
            || (node.tag == "input"
                && node
                    .attrs
                    .iter()
                    .any(|(n, v)| n == "type" && v.eq_ignore_ascii_case("hidden")));
        let visible = parent_visible && !hidden;
        let idx = self.elements.len();
        let mut parts = vec![node.text];
        self.elements.push(Element {
            path: path.clone(),
            tag: node.tag,
            attrs: node.attrs,
            parent,
            end: idx + 1,
            action: node.action,
            visible,
            text: String::new(),
        });
        for (i, child) in node.children.into_iter().enumerate() {
            let c = self.push(child, Some(idx), format!("{path}.{i}"), visible);
            parts.push(self.elements[c].text.clone());
        }
        let end = self.elements.len();
        let element = &mut self.elements[idx];
        element.end = end;
        element.text = normalize_whitespace(&parts.join(" "));
        idx
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Index of the element with this handle id
    pub fn find(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.path == id)
    }

    pub fn tag(&self, idx: usize) -> &str {
        &self.elements[idx].tag
    }

    pub fn attr(&self, idx: usize, name: &str) -> Option<&str> {
        self.elements[idx]
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self, idx: usize) -> &str {
        &self.elements[idx].text
    }

    pub fn is_visible(&self, idx: usize) -> bool {
        self.elements[idx].visible
    }

    pub fn is_enabled(&self, idx: usize) -> bool {
        self.attr(idx, "disabled").is_none()
    }

    /// Whether the element accepts typed text
    pub fn is_editable(&self, idx: usize) -> bool {
        matches!(self.role(idx), Some(AriaRole::Textbox))
    }

    /// Click target: the nearest element at or above `idx` with an action
    pub fn action_for(&self, idx: usize) -> Option<Action> {
        let mut current = Some(idx);
        while let Some(i) = current {
            if let Some(action) = self.elements[i].action {
                return Some(action);
            }
            current = self.elements[i].parent;
        }
        None
    }

    fn input_type(&self, idx: usize) -> String {
        self.attr(idx, "type").unwrap_or("text").to_ascii_lowercase()
    }

    /// Implicit or explicit ARIA role
    pub fn role(&self, idx: usize) -> Option<AriaRole> {
        if let Some(role) = self.attr(idx, "role") {
            return AriaRole::from_attr(role);
        }
        match self.tag(idx) {
            "button" => Some(AriaRole::Button),
            "input" => match self.input_type(idx).as_str() {
                "submit" | "button" | "reset" => Some(AriaRole::Button),
                "text" | "password" | "email" | "search" | "tel" | "url" => Some(AriaRole::Textbox),
                _ => None,
            },
            "textarea" => Some(AriaRole::Textbox),
            "a" if self.attr(idx, "href").is_some() => Some(AriaRole::Link),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(AriaRole::Heading),
            "img" => Some(AriaRole::Img),
            "nav" => Some(AriaRole::Navigation),
            _ => None,
        }
    }

    /// Accessible name: `aria-label`, then the input value, placeholder or
    /// alt text as the role dictates, then the text content
    pub fn accessible_name(&self, idx: usize) -> String {
        if let Some(label) = self.attr(idx, "aria-label") {
            return label.to_string();
        }
        let role = self.role(idx);
        let name = match (self.tag(idx), role) {
            ("input", Some(AriaRole::Button)) => self.attr(idx, "value"),
            (_, Some(AriaRole::Textbox)) => self.attr(idx, "placeholder"),
            ("img", _) => self.attr(idx, "alt"),
            _ => Some(self.text(idx)),
        };
        name.unwrap_or_default().to_string()
    }

    pub fn handle(&self, idx: usize) -> ElementHandle {
        let element = &self.elements[idx];
        ElementHandle {
            id: element.path.clone(),
            tag_name: element.tag.clone(),
            text_content: element.text.clone(),
            visible: element.visible,
            enabled: self.is_enabled(idx),
        }
    }

    /// Elements strictly inside `scope`, or every element for the document
    fn descendants(&self, scope: Option<usize>) -> std::ops::Range<usize> {
        match scope {
            None => 0..self.elements.len(),
            Some(i) => i + 1..self.elements[i].end,
        }
    }

    fn compound_matches(&self, compound: &Compound, idx: usize) -> bool {
        compound.matches(self.tag(idx), |name| self.attr(idx, name))
    }

    fn css_matches(&self, css: &CssSelector, idx: usize) -> bool {
        let Some((last, outer)) = css.compounds.split_last() else {
            return false;
        };
        if !self.compound_matches(last, idx) {
            return false;
        }
        // descendant combinators only, so the nearest matching ancestor is
        // always the right one to anchor the next compound on
        let mut ancestor = self.elements[idx].parent;
        for compound in outer.iter().rev() {
            loop {
                let Some(a) = ancestor else { return false };
                ancestor = self.elements[a].parent;
                if self.compound_matches(compound, a) {
                    break;
                }
            }
        }
        true
    }

    fn select(&self, scope: Option<usize>, selector: &Selector) -> ShopcheckResult<Vec<usize>> {
        let candidates = self.descendants(scope);
        Ok(match selector {
            Selector::Css { css } => {
                let css = CssSelector::parse(css)?;
                candidates.filter(|i| self.css_matches(&css, *i)).collect()
            }
            Selector::TestId { id } => candidates
                .filter(|i| self.attr(*i, "data-test") == Some(id.as_str()))
                .collect(),
            Selector::Role { role, name, exact } => candidates
                .filter(|i| {
                    self.role(*i) == Some(*role)
                        && self.is_visible(*i)
                        && name
                            .as_ref()
                            .map_or(true, |n| text_matches(&self.accessible_name(*i), n, *exact))
                })
                .collect(),
            Selector::Text { text, exact } => {
                // a scope whose own text matches counts as a candidate
                let hits: Vec<usize> = scope
                    .into_iter()
                    .chain(candidates)
                    .filter(|i| text_matches(self.text(*i), text, *exact))
                    .collect();
                // innermost only: drop any hit with another hit inside it
                hits.iter()
                    .copied()
                    .filter(|i| {
                        !hits
                            .iter()
                            .any(|j| *j > *i && *j < self.elements[*i].end)
                    })
                    .collect()
            }
        })
    }

    fn run(&self, roots: &[Option<usize>], steps: &[Step]) -> ShopcheckResult<Vec<usize>> {
        let mut scopes: Vec<Option<usize>> = roots.to_vec();
        let mut found = Vec::new();
        for step in steps {
            let mut next = BTreeSet::new();
            for scope in &scopes {
                next.extend(self.select(*scope, &step.selector)?);
            }
            found = next.into_iter().collect();
            for filter in &step.filters {
                found = match filter {
                    Filter::Has { steps } => {
                        let mut kept = Vec::new();
                        for idx in found {
                            if !self.run(&[Some(idx)], steps)?.is_empty() {
                                kept.push(idx);
                            }
                        }
                        kept
                    }
                    Filter::HasText { text } => found
                        .into_iter()
                        .filter(|i| text_matches(self.text(*i), text, false))
                        .collect(),
                    Filter::Nth { index } => found.get(*index).copied().into_iter().collect(),
                };
            }
            scopes = found.iter().map(|i| Some(*i)).collect();
        }
        Ok(found)
    }

    /// Resolve a locator chain from the document, in document order
    pub fn query(&self, steps: &[Step]) -> ShopcheckResult<Vec<usize>> {
        self.run(&[None], steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ShopcheckError;

    fn sample() -> Dom {
        Dom::build(
            Node::new("body").children([
                Node::new("div").class("header").test_id("primary-header").children([
                    Node::new("button").id("menu").text("Open Menu").on_click(Action::OpenMenu),
                    Node::new("nav").hidden_if(true).child(
                        Node::new("a").attr("href", "#").text("Logout").on_click(Action::Logout),
                    ),
                ]),
                Node::new("div").class("inventory_item").test_id("inventory-item").children([
                    Node::new("a").attr("href", "#").on_click(Action::OpenItem(4)).child(
                        Node::new("div").class("inventory_item_name").text("Sauce Labs Backpack"),
                    ),
                    Node::new("div").class("inventory_item_price").text("$29.99"),
                ]),
                Node::new("div").class("inventory_item").test_id("inventory-item").children([
                    Node::new("a").attr("href", "#").on_click(Action::OpenItem(0)).child(
                        Node::new("div").class("inventory_item_name").text("Sauce Labs Bike Light"),
                    ),
                    Node::new("div").class("inventory_item_price").text("$9.99"),
                ]),
                Node::new("input").id("user-name").attr("placeholder", "Username"),
                Node::new("input")
                    .attr("type", "submit")
                    .attr("value", "Login")
                    .attr("disabled", ""),
            ]),
        )
    }

    fn q(dom: &Dom, steps: Vec<Step>) -> Vec<String> {
        dom.query(&steps)
            .unwrap()
            .into_iter()
            .map(|i| dom.handle(i).id)
            .collect()
    }

    mod build_tests {
        use super::*;

        #[test]
        fn test_paths_and_text() {
            let dom = sample();
            assert_eq!(dom.handle(0).id, "e:0");
            let item = dom.find("e:0.1").unwrap();
            assert_eq!(dom.text(item), "Sauce Labs Backpack $29.99");
            assert!(dom.find("e:9").is_none());
            assert!(!dom.is_empty());
        }

        #[test]
        fn test_hidden_propagates_to_descendants() {
            let dom = sample();
            let logout = dom.find("e:0.0.1.0").unwrap();
            assert_eq!(dom.tag(logout), "a");
            assert!(!dom.is_visible(logout));
        }

        #[test]
        fn test_action_bubbles_to_ancestor() {
            let dom = sample();
            let name = dom.find("e:0.1.0.0").unwrap();
            assert_eq!(dom.action_for(name), Some(Action::OpenItem(4)));
            assert_eq!(dom.action_for(0), None);
        }

        #[test]
        fn test_roles_and_names() {
            let dom = sample();
            let input = dom.find("e:0.3").unwrap();
            assert_eq!(dom.role(input), Some(AriaRole::Textbox));
            assert_eq!(dom.accessible_name(input), "Username");
            assert!(dom.is_editable(input));
            let submit = dom.find("e:0.4").unwrap();
            assert_eq!(dom.role(submit), Some(AriaRole::Button));
            assert_eq!(dom.accessible_name(submit), "Login");
            assert!(!dom.handle(submit).enabled);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_css_descendant() {
            let dom = sample();
            let ids = q(&dom, vec![Step::new(Selector::css(".inventory_item .inventory_item_name"))]);
            assert_eq!(ids, vec!["e:0.1.0.0", "e:0.2.0.0"]);
        }

        #[test]
        fn test_role_skips_hidden() {
            let dom = sample();
            assert!(q(&dom, vec![Step::new(Selector::role_named(AriaRole::Link, "Logout"))]).is_empty());
            assert_eq!(
                q(&dom, vec![Step::new(Selector::role(AriaRole::Link))]).len(),
                2
            );
        }

        #[test]
        fn test_text_is_innermost() {
            let dom = sample();
            assert_eq!(
                q(&dom, vec![Step::new(Selector::text("sauce labs backpack"))]),
                vec!["e:0.1.0.0"]
            );
            assert_eq!(
                q(
                    &dom,
                    vec![
                        Step::new(Selector::css("button")),
                        Step::new(Selector::text("Open Menu"))
                    ]
                ),
                vec!["e:0.0.0"]
            );
        }

        #[test]
        fn test_scoped_steps_and_filters() {
            let dom = sample();
            let row = Step {
                selector: Selector::test_id("inventory-item"),
                filters: vec![Filter::Has {
                    steps: vec![Step::new(Selector::text("Bike Light"))],
                }],
            };
            assert_eq!(q(&dom, vec![row.clone()]), vec!["e:0.2"]);
            assert_eq!(
                q(&dom, vec![row, Step::new(Selector::css(".inventory_item_price"))]),
                vec!["e:0.2.1"]
            );

            let second = Step {
                selector: Selector::css(".inventory_item"),
                filters: vec![Filter::Nth { index: 1 }],
            };
            assert_eq!(q(&dom, vec![second]), vec!["e:0.2"]);

            let by_text = Step {
                selector: Selector::css(".inventory_item"),
                filters: vec![Filter::HasText {
                    text: "$29.99".to_string(),
                }],
            };
            assert_eq!(q(&dom, vec![by_text]), vec!["e:0.1"]);
        }

        #[test]
        fn test_bad_css_is_an_error() {
            let dom = sample();
            assert!(matches!(
                dom.query(&[Step::new(Selector::css("div > a"))]),
                Err(ShopcheckError::InvalidSelector { .. })
            ));
        }
    }
}
