use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::domain::page;
use crate::domain::{DocumentSession, ElementHandle, Locator, Scope, SessionError, SessionResult};
use crate::error::Result;

/// Offline [`DocumentSession`] over a saved copy of the tipping page. The
/// parsed document is held as a plain element arena so prediction writes can
/// mutate it; handles are arena indexes and never go stale.
#[derive(Debug)]
pub struct SnapshotSession {
    arena: Mutex<Arena>,
}

impl SnapshotSession {
    pub fn from_file(path: &Path) -> Result<Self> {
        let html = fs::read_to_string(path)?;
        Ok(Self::from_html(&html))
    }

    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut arena = Arena::default();
        arena.add_element(document.root_element(), None);
        Self {
            arena: Mutex::new(arena),
        }
    }

    /// Current value of the first input whose `name` contains `fragment`.
    pub fn field_value(&self, fragment: &'static str) -> Option<String> {
        let arena = self.lock();
        let matches = arena
            .select(Scope::Root, &Locator::NameContains(fragment))
            .ok()?;
        let index = *matches.first()?;
        arena.nodes[index].attrs.get("value").cloned()
    }

    /// Whether the form's submit control has been activated.
    pub fn submitted(&self) -> bool {
        let arena = self.lock();
        arena.clicked.iter().any(|&index| {
            arena.nodes[index]
                .attrs
                .get("name")
                .is_some_and(|name| name == page::SUBMIT_NAME)
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Arena> {
        self.arena.lock().expect("snapshot arena lock poisoned")
    }
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Node>,
    clicked: Vec<usize>,
}

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: HashMap<String, String>,
    text: String,
    children: Vec<usize>,
    parent: Option<usize>,
}

impl Arena {
    fn add_element(&mut self, element: ElementRef<'_>, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: element.value().name().to_string(),
            attrs: element
                .value()
                .attrs()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            text: normalize_text(element),
            children: Vec::new(),
            parent,
        });
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let child_id = self.add_element(child_element, Some(id));
                self.nodes[id].children.push(child_id);
            }
        }
        id
    }

    fn select(&self, scope: Scope, locator: &Locator) -> SessionResult<Vec<usize>> {
        let root = self.scope_root(scope)?;
        let matches = match locator {
            Locator::Cell(n) => {
                let cells = self.direct_cells(root);
                n.checked_sub(1)
                    .and_then(|i| cells.get(i))
                    .copied()
                    .into_iter()
                    .collect()
            }
            Locator::Cells => self.direct_cells(root),
            _ => {
                let mut found = Vec::new();
                self.walk_descendants(root, &mut |id| {
                    if self.matches(id, locator) {
                        found.push(id);
                    }
                });
                found
            }
        };
        Ok(matches)
    }

    fn scope_root(&self, scope: Scope) -> SessionResult<usize> {
        match scope {
            Scope::Root => Ok(0),
            Scope::Within(handle) => self.index_of(handle),
        }
    }

    fn index_of(&self, handle: ElementHandle) -> SessionResult<usize> {
        let index = handle.0 as usize;
        if index < self.nodes.len() {
            Ok(index)
        } else {
            Err(SessionError::Stale)
        }
    }

    /// Descendants of `root` in document order.
    fn walk_descendants(&self, root: usize, visit: &mut impl FnMut(usize)) {
        for &child in &self.nodes[root].children {
            visit(child);
            self.walk_descendants(child, visit);
        }
    }

    fn direct_cells(&self, root: usize) -> Vec<usize> {
        self.nodes[root]
            .children
            .iter()
            .copied()
            .filter(|&child| self.nodes[child].tag == "td")
            .collect()
    }

    fn matches(&self, id: usize, locator: &Locator) -> bool {
        let node = &self.nodes[id];
        match locator {
            Locator::Id(value) => node.attrs.get("id").is_some_and(|v| v == value),
            Locator::Name(value) => node.attrs.get("name").is_some_and(|v| v == value),
            Locator::NameContains(fragment) => {
                node.attrs.get("name").is_some_and(|v| v.contains(fragment))
            }
            Locator::ClassContains(fragment) => {
                node.attrs.get("class").is_some_and(|v| v.contains(fragment))
            }
            Locator::Rows => node.tag == "tr",
            Locator::Cell(_) | Locator::Cells => node.tag == "td",
        }
    }
}

fn normalize_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl DocumentSession for SnapshotSession {
    async fn find(
        &self,
        scope: Scope,
        locator: &Locator,
        _timeout: Duration,
    ) -> SessionResult<ElementHandle> {
        let arena = self.lock();
        arena
            .select(scope, locator)?
            .first()
            .map(|&id| ElementHandle(id as u64))
            .ok_or(SessionError::NotPresent)
    }

    async fn find_all(
        &self,
        scope: Scope,
        locator: &Locator,
        _timeout: Duration,
    ) -> SessionResult<Vec<ElementHandle>> {
        let arena = self.lock();
        Ok(arena
            .select(scope, locator)?
            .into_iter()
            .map(|id| ElementHandle(id as u64))
            .collect())
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> SessionResult<Option<String>> {
        let arena = self.lock();
        let index = arena.index_of(element)?;
        Ok(arena.nodes[index].attrs.get(name).cloned())
    }

    async fn text(&self, element: ElementHandle) -> SessionResult<String> {
        let arena = self.lock();
        let index = arena.index_of(element)?;
        Ok(arena.nodes[index].text.clone())
    }

    async fn click(&self, element: ElementHandle) -> SessionResult<()> {
        let mut arena = self.lock();
        let index = arena.index_of(element)?;
        arena.clicked.push(index);
        Ok(())
    }

    async fn force_click(&self, element: ElementHandle) -> SessionResult<()> {
        // A static arena has no interactability to bypass; same as a click.
        let mut arena = self.lock();
        let index = arena.index_of(element)?;
        arena.clicked.push(index);
        Ok(())
    }

    async fn clear_and_type(&self, element: ElementHandle, value: &str) -> SessionResult<()> {
        let mut arena = self.lock();
        let index = arena.index_of(element)?;
        arena.nodes[index]
            .attrs
            .insert("value".to_string(), value.to_string());
        Ok(())
    }

    async fn scroll_into_view(&self, element: ElementHandle) -> SessionResult<()> {
        let arena = self.lock();
        arena.index_of(element)?;
        Ok(())
    }

    async fn is_displayed(&self, element: ElementHandle) -> SessionResult<bool> {
        // Hiding is class-based in this document and inherits downwards.
        let arena = self.lock();
        let mut current = Some(arena.index_of(element)?);
        while let Some(index) = current {
            if arena.nodes[index]
                .attrs
                .get("class")
                .is_some_and(|class| class.contains(page::HIDDEN_CLASS))
            {
                return Ok(false);
            }
            current = arena.nodes[index].parent;
        }
        Ok(true)
    }

    async fn is_enabled(&self, element: ElementHandle) -> SessionResult<bool> {
        let arena = self.lock();
        let index = arena.index_of(element)?;
        Ok(!arena.nodes[index].attrs.contains_key("disabled"))
    }

    async fn tag_name(&self, element: ElementHandle) -> SessionResult<String> {
        let arena = self.lock();
        let index = arena.index_of(element)?;
        Ok(arena.nodes[index].tag.clone())
    }
}
