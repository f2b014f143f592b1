use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque reference to one element of a live document. Handles are issued by a
/// session and can be invalidated by it at any time; a stale handle must be
/// re-resolved through a fresh lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Where a lookup starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The document root.
    Root,
    /// Inside a previously found element.
    Within(ElementHandle),
}

/// The lookups the engine needs against the single-table document shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Element with this exact `id` attribute.
    Id(&'static str),
    /// Element with this exact `name` attribute.
    Name(&'static str),
    /// Element whose `name` attribute contains this fragment.
    NameContains(&'static str),
    /// Element whose `class` attribute contains this fragment.
    ClassContains(&'static str),
    /// All `tr` elements below the scope.
    Rows,
    /// The n-th `td` directly below the scope, 1-based.
    Cell(usize),
    /// All `td` elements directly below the scope.
    Cells,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={id}"),
            Locator::Name(name) => write!(f, "name={name}"),
            Locator::NameContains(fragment) => write!(f, "name*={fragment}"),
            Locator::ClassContains(fragment) => write!(f, "class*={fragment}"),
            Locator::Rows => write!(f, "rows"),
            Locator::Cell(n) => write!(f, "cell[{n}]"),
            Locator::Cells => write!(f, "cells"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("element not present within the wait window")]
    NotPresent,
    #[error("stale element reference")]
    Stale,
    #[error("element not interactable")]
    NotInteractable,
    #[error("document backend error: {0}")]
    Backend(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Access to a live, externally rendered document. Implementations are free to
/// poll, re-render or proxy to a browser; the engine only sees handles and the
/// error kinds above. All operations may suspend the caller up to the given
/// timeout while the document settles.
#[async_trait]
pub trait DocumentSession: Send + Sync {
    /// Waits up to `timeout` for one element matching `locator` under `scope`.
    async fn find(
        &self,
        scope: Scope,
        locator: &Locator,
        timeout: Duration,
    ) -> SessionResult<ElementHandle>;

    /// Waits up to `timeout` for matches; an empty result is `Ok`.
    async fn find_all(
        &self,
        scope: Scope,
        locator: &Locator,
        timeout: Duration,
    ) -> SessionResult<Vec<ElementHandle>>;

    /// Reads an attribute; `Ok(None)` means the element has no such attribute.
    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> SessionResult<Option<String>>;

    /// Reads the element's visible text content.
    async fn text(&self, element: ElementHandle) -> SessionResult<String>;

    async fn click(&self, element: ElementHandle) -> SessionResult<()>;

    /// Forced activation that bypasses interactability checks (the script-click
    /// of a browser session). Used as the submission fallback only.
    async fn force_click(&self, element: ElementHandle) -> SessionResult<()>;

    /// Clears the element, then types `value` into it, in one attempt.
    async fn clear_and_type(&self, element: ElementHandle, value: &str) -> SessionResult<()>;

    async fn scroll_into_view(&self, element: ElementHandle) -> SessionResult<()>;

    async fn is_displayed(&self, element: ElementHandle) -> SessionResult<bool>;

    async fn is_enabled(&self, element: ElementHandle) -> SessionResult<bool>;

    async fn tag_name(&self, element: ElementHandle) -> SessionResult<String>;
}
