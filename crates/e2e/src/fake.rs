//! In-memory browser session for exercising checks and waits without a
//! browser. Pages can be made eventually consistent: nodes that render late
//! and attributes that change a few reads after a click.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{E2eError, E2eResult};
use crate::session::{BrowserSession, Locator};
use crate::views;

#[derive(Debug, Clone)]
pub struct FakeNode {
    tag: String,
    id: Option<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    displayed: bool,
    enabled: bool,
    children: Vec<usize>,
    hidden_lookups: u32,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            attrs: BTreeMap::new(),
            text: String::new(),
            displayed: true,
            enabled: true,
            children: Vec::new(),
            hidden_lookups: 0,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self.attrs.insert("id".to_string(), id.to_string());
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    fn matches(&self, locator: Locator<'_>) -> bool {
        match locator {
            Locator::Id(id) => self.id.as_deref() == Some(id),
            Locator::ClassName(class) => self.has_class(class),
            Locator::TagName(tag) => self.tag.eq_ignore_ascii_case(tag),
            Locator::Css(selector) => {
                if let Some(id) = selector.strip_prefix('#') {
                    self.id.as_deref() == Some(id)
                } else if let Some(class) = selector.strip_prefix('.') {
                    self.has_class(class)
                } else {
                    self.tag.eq_ignore_ascii_case(selector)
                }
            }
            Locator::XPath(".//*") | Locator::XPath("//*") => true,
            Locator::XPath(xpath) => xpath
                .strip_prefix("//")
                .is_some_and(|tag| self.tag.eq_ignore_ascii_case(tag)),
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone)]
struct Change {
    target: usize,
    attr: String,
    value: String,
    stale_reads: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    nodes: Vec<FakeNode>,
    title: String,
    source: String,
    visited: Vec<String>,
    scripts: Vec<(String, Vec<Value>)>,
    on_click: HashMap<usize, Vec<Change>>,
    pending: Vec<Change>,
    failure: Option<String>,
    quit: bool,
}

impl FakeState {
    fn check(&self) -> E2eResult<()> {
        if let Some(message) = &self.failure {
            return Err(E2eError::Session(message.clone()));
        }
        if self.quit {
            return Err(E2eError::Session("session already closed".to_string()));
        }
        Ok(())
    }

    fn node(&self, index: usize) -> E2eResult<&FakeNode> {
        self.nodes
            .get(index)
            .ok_or_else(|| E2eError::Session(format!("stale element {}", index)))
    }

    /// Descendants of `root` in document order
    fn descendants(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[root].children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(self.nodes[index].children.iter().rev().copied());
        }
        out
    }

    /// One lookup: matching, rendered nodes below `root`
    fn lookup(&mut self, root: usize, locator: Locator<'_>) -> Vec<usize> {
        let found = self
            .descendants(root)
            .into_iter()
            .filter(|&i| self.nodes[i].hidden_lookups == 0 && self.nodes[i].matches(locator))
            .collect();

        for node in &mut self.nodes {
            node.hidden_lookups = node.hidden_lookups.saturating_sub(1);
        }
        found
    }
}

pub struct FakeSession {
    state: Mutex<FakeState>,
}

impl FakeSession {
    /// Empty page with a root `html` node
    pub fn new(title: &str, source: &str) -> Self {
        let state = FakeState {
            nodes: vec![FakeNode::new("html")],
            title: title.to_string(),
            source: source.to_string(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// The GreenLight home page as the site renders it
    pub fn home_page() -> Self {
        let page = Self::new(
            views::PAGE_TITLE,
            &format!("<html><body><h1>{}</h1></body></html>", views::BANNER_TEXT),
        );
        let model = views::HomeViewModel::default();

        let first = page.add(
            FakeNode::new("div")
                .id(views::CONTAINER_IDS[0])
                .class(&views::container_class(1)),
        );
        let light = page.add_child(
            first,
            FakeNode::new("span")
                .id(views::STOPLIGHT_ID)
                .class(views::STOPLIGHT_CLASS),
        );
        page.add_child(
            light,
            FakeNode::new("img")
                .id(views::QR_CODE_ID)
                .attr("src", "https://localhost:44386/images/qr-code.png"),
        );

        let second = page.add(
            FakeNode::new("div")
                .id(views::CONTAINER_IDS[1])
                .class(&views::container_class(2)),
        );
        page.add_child(
            second,
            FakeNode::new("h3")
                .id(views::HEALTH_DECLARATION_HEADER_ID)
                .text(&model.health_declaration_header),
        );
        page.add_child(
            second,
            FakeNode::new("p")
                .id(views::HEALTH_DECLARATION_PARAGRAPH_ID)
                .text(&model.health_declaration_paragraph),
        );
        let accept = page.add_child(
            second,
            FakeNode::new("button")
                .id(views::ACCEPT_ID)
                .text(&format!("{} ✓", model.accept_text)),
        );
        let decline = page.add_child(
            second,
            FakeNode::new("button")
                .id(views::DECLINE_ID)
                .text(&model.decline_text),
        );

        let third = page.add(
            FakeNode::new("div")
                .id(views::CONTAINER_IDS[2])
                .class(&views::container_class(3)),
        );
        let form = page.add_child(third, FakeNode::new("form").id(views::REGISTRATION_FORM_ID));
        page.add_child(form, FakeNode::new("input").id(views::NAME_ID));
        page.add_child(form, FakeNode::new("input").id(views::EMAIL_ID));
        page.add_child(form, FakeNode::new("button").id(views::BTN_ACCEPT_ID));
        page.appear_after(form, 1);

        page.on_click(accept, light, "class", "stoplight green", 2);
        page.on_click(decline, light, "class", "stoplight red", 1);

        page
    }

    /// Append `node` under the root
    pub fn add(&self, node: FakeNode) -> usize {
        self.add_child(0, node)
    }

    pub fn add_child(&self, parent: usize, node: FakeNode) -> usize {
        let mut state = self.state.lock();
        let index = state.nodes.len();
        state.nodes.push(node);
        state.nodes[parent].children.push(index);
        index
    }

    /// Keep `node` out of the first `lookups` element searches
    pub fn appear_after(&self, node: usize, lookups: u32) {
        self.state.lock().nodes[node].hidden_lookups = lookups;
    }

    /// Clicking `button` sets `attr` on `target`, visible only after
    /// `stale_reads` reads of the old value
    pub fn on_click(
        &self,
        button: usize,
        target: usize,
        attr: &str,
        value: &str,
        stale_reads: u32,
    ) {
        self.state.lock().on_click.entry(button).or_default().push(Change {
            target,
            attr: attr.to_string(),
            value: value.to_string(),
            stale_reads,
        });
    }

    /// Make every further observation fail with `message`
    pub fn fail_observations(&self, message: &str) {
        self.state.lock().failure = Some(message.to_string());
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }

    /// Drop every node matching `locator`
    pub fn remove(&self, locator: Locator<'_>) {
        let mut state = self.state.lock();
        let doomed: Vec<usize> = state
            .descendants(0)
            .into_iter()
            .filter(|&i| state.nodes[i].matches(locator))
            .collect();
        for node in &mut state.nodes {
            node.children.retain(|c| !doomed.contains(c));
        }
    }

    /// Forget the click behaviour of `button`
    pub fn disable_clicks(&self, button: usize) {
        self.state.lock().on_click.remove(&button);
    }

    pub fn find_index(&self, id: &str) -> Option<usize> {
        let state = self.state.lock();
        state
            .nodes
            .iter()
            .position(|n| n.id.as_deref() == Some(id))
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().visited.clone()
    }

    pub fn scripts(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().scripts.clone()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Element = usize;

    async fn navigate(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.title.clone())
    }

    async fn page_source(&self) -> E2eResult<String> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.source.clone())
    }

    async fn find(&self, locator: Locator<'_>) -> E2eResult<Option<usize>> {
        let mut state = self.state.lock();
        state.check()?;
        Ok(state.lookup(0, locator).into_iter().next())
    }

    async fn find_all(&self, locator: Locator<'_>) -> E2eResult<Vec<usize>> {
        let mut state = self.state.lock();
        state.check()?;
        Ok(state.lookup(0, locator))
    }

    async fn find_children(&self, parent: &usize, locator: Locator<'_>) -> E2eResult<Vec<usize>> {
        let mut state = self.state.lock();
        state.check()?;
        state.node(*parent)?;
        Ok(state.lookup(*parent, locator))
    }

    async fn attribute(&self, element: &usize, name: &str) -> E2eResult<Option<String>> {
        let mut state = self.state.lock();
        state.check()?;
        state.node(*element)?;

        let mut applied = Vec::new();
        state.pending.retain_mut(|change| {
            if change.target != *element || change.attr != name {
                return true;
            }
            if change.stale_reads == 0 {
                applied.push(change.clone());
                return false;
            }
            change.stale_reads -= 1;
            true
        });
        for change in applied {
            state.nodes[change.target].attrs.insert(change.attr, change.value);
        }

        Ok(state.nodes[*element].attrs.get(name).cloned())
    }

    async fn text(&self, element: &usize) -> E2eResult<String> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(*element)?.text.clone())
    }

    async fn tag_name(&self, element: &usize) -> E2eResult<String> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(*element)?.tag.clone())
    }

    async fn is_displayed(&self, element: &usize) -> E2eResult<bool> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(*element)?.displayed)
    }

    async fn is_enabled(&self, element: &usize) -> E2eResult<bool> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(*element)?.enabled)
    }

    async fn click(&self, element: &usize) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.node(*element)?;
        let changes = state.on_click.get(element).cloned().unwrap_or_default();
        state.pending.extend(changes);
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        let mut state = self.state.lock();
        state.check()?;
        state.scripts.push((script.to_string(), args));
        Ok(Value::Null)
    }

    async fn quit(&self) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.quit = true;
        Ok(())
    }
}
