//! Declarative document-head model.
//!
//! Pages describe the head they want as a [`HeadState`]; the only
//! side-effecting step is rendering the state to HTML. Tags are keyed by
//! identity, so rebuilding a state upserts rather than duplicates, and two
//! states can be compared with [`diff`] to see exactly which tags a change
//! touches.

use crate::seo::html_escape;

/// Identity of a head tag. Two tags with the same id describe the same
/// DOM slot; upserting overwrites instead of duplicating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagId {
    Title,
    MetaName(String),
    MetaProperty(String),
    /// `<link rel="...">` keyed by rel value (canonical etc.)
    LinkRel(String),
    /// `<link rel="alternate" hreflang="...">` keyed by language code
    LinkAlternate(String),
    /// `<script>` keyed by a fixed marker (analytics tag id, JSON-LD type)
    Script(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadTag {
    pub id: TagId,
    /// Meta content, link href, script body, or title text.
    pub content: String,
    /// Extra rendered attributes (script src/async, data markers).
    pub attrs: Vec<(String, String)>,
}

impl HeadTag {
    pub fn new(id: TagId, content: impl AsRef<str>) -> Self {
        HeadTag {
            id,
            content: content.as_ref().to_string(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }
}

/// Ordered, identity-keyed set of head tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadState {
    tags: Vec<HeadTag>,
}

/// One step of reconciling a current head toward a desired one.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadOp {
    Insert(HeadTag),
    Update(HeadTag),
    Remove(TagId),
}

impl HeadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up by identity first; overwrite in place, otherwise append.
    pub fn upsert(&mut self, tag: HeadTag) {
        match self.tags.iter_mut().find(|t| t.id == tag.id) {
            Some(existing) => *existing = tag,
            None => self.tags.push(tag),
        }
    }

    pub fn get(&self, id: &TagId) -> Option<&HeadTag> {
        self.tags.iter().find(|t| &t.id == id)
    }

    pub fn remove(&mut self, id: &TagId) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| &t.id != id);
        self.tags.len() != before
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeadTag> {
        self.tags.iter()
    }

    /// Apply a reconciliation plan produced by [`diff`].
    pub fn apply(&mut self, ops: Vec<HeadOp>) {
        for op in ops {
            match op {
                HeadOp::Insert(tag) | HeadOp::Update(tag) => self.upsert(tag),
                HeadOp::Remove(id) => {
                    self.remove(&id);
                }
            }
        }
    }

    /// Render to HTML. This is the sole side-effecting boundary; everything
    /// upstream is pure state.
    pub fn render(&self) -> String {
        let mut html = String::new();
        for tag in &self.tags {
            match &tag.id {
                TagId::Title => {
                    html.push_str(&format!("<title>{}</title>\n", html_escape(&tag.content)));
                }
                TagId::MetaName(name) => {
                    html.push_str(&format!(
                        "<meta name=\"{}\" content=\"{}\">\n",
                        html_escape(name),
                        html_escape(&tag.content),
                    ));
                }
                TagId::MetaProperty(property) => {
                    html.push_str(&format!(
                        "<meta property=\"{}\" content=\"{}\">\n",
                        html_escape(property),
                        html_escape(&tag.content),
                    ));
                }
                TagId::LinkRel(rel) => {
                    html.push_str(&format!(
                        "<link rel=\"{}\" href=\"{}\">\n",
                        html_escape(rel),
                        html_escape(&tag.content),
                    ));
                }
                TagId::LinkAlternate(code) => {
                    html.push_str(&format!(
                        "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\">\n",
                        html_escape(code),
                        html_escape(&tag.content),
                    ));
                }
                TagId::Script(_) => {
                    let mut attrs = String::new();
                    for (name, value) in &tag.attrs {
                        if value.is_empty() {
                            attrs.push_str(&format!(" {}", name));
                        } else {
                            attrs.push_str(&format!(" {}=\"{}\"", name, html_escape(value)));
                        }
                    }
                    // Script bodies are vendor snippets or JSON-LD, not escaped
                    html.push_str(&format!("<script{}>{}</script>\n", attrs, tag.content));
                }
            }
        }
        html
    }
}

/// Pure reconciliation: the ops that turn `current` into `desired`.
/// Identical states produce an empty plan.
pub fn diff(current: &HeadState, desired: &HeadState) -> Vec<HeadOp> {
    let mut ops = Vec::new();

    for tag in &desired.tags {
        match current.get(&tag.id) {
            None => ops.push(HeadOp::Insert(tag.clone())),
            Some(existing) if existing != tag => ops.push(HeadOp::Update(tag.clone())),
            Some(_) => {}
        }
    }

    for tag in &current.tags {
        if desired.get(&tag.id).is_none() {
            ops.push(HeadOp::Remove(tag.id.clone()));
        }
    }

    ops
}
