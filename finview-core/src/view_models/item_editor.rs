use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use finview_contracts::notify::{ChangeNotifier, ResourceChanged};
use finview_model::prelude::*;
use tracing::{debug, warn};

use crate::error::{CoreError, TaskError, TaskResult};
use crate::reducer::{Context, Published, Reducer, TaskSlot};
use crate::session::UserSession;

const LOAD: TaskSlot = TaskSlot::new("editor-load");
/// Item update and the item re-fetch that follows it.
const UPDATE: TaskSlot = TaskSlot::new("editor-update");

/// One editable sub-collection of an item, such as its studios or tags.
#[async_trait]
pub trait ElementEditor: Send + Sync + 'static {
    type Element: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Name the prefix search matches against.
    fn element_name<'a>(&self, element: &'a Self::Element) -> &'a str;

    /// Every element the server knows of, for picking.
    async fn fetch_elements(
        &self,
        session: &UserSession,
    ) -> TaskResult<Vec<Self::Element>>;

    fn current(&self, item: &BaseItem) -> Vec<Self::Element>;

    /// Replace the sub-collection on `item`.
    fn apply(&self, item: &mut BaseItem, elements: Vec<Self::Element>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StudioEditor;

#[async_trait]
impl ElementEditor for StudioEditor {
    type Element = NameGuidPair;

    fn element_name<'a>(&self, element: &'a NameGuidPair) -> &'a str {
        element.name.as_deref().unwrap_or_default()
    }

    async fn fetch_elements(
        &self,
        session: &UserSession,
    ) -> TaskResult<Vec<NameGuidPair>> {
        let page = session.api().studios().await?;
        Ok(page
            .items
            .into_iter()
            .filter_map(|studio| {
                let id = studio.id;
                studio.name.map(|name| NameGuidPair::new(name, id))
            })
            .collect())
    }

    fn current(&self, item: &BaseItem) -> Vec<NameGuidPair> {
        item.studios.clone().unwrap_or_default()
    }

    fn apply(&self, item: &mut BaseItem, elements: Vec<NameGuidPair>) {
        item.studios = Some(elements);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagEditor;

#[async_trait]
impl ElementEditor for TagEditor {
    type Element = String;

    fn element_name<'a>(&self, element: &'a String) -> &'a str {
        element
    }

    async fn fetch_elements(
        &self,
        session: &UserSession,
    ) -> TaskResult<Vec<String>> {
        Ok(session.api().tags(session.user_id()).await?)
    }

    fn current(&self, item: &BaseItem) -> Vec<String> {
        item.tags.clone().unwrap_or_default()
    }

    fn apply(&self, item: &mut BaseItem, elements: Vec<String>) {
        item.tags = Some(elements);
    }
}

pub type StudioEditorViewModel = ItemEditorViewModel<StudioEditor>;
pub type TagEditorViewModel = ItemEditorViewModel<TagEditor>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction<T> {
    /// Fetch every element the server knows of.
    Load,
    /// Case-insensitive prefix match over the loaded elements.
    Search(String),
    Add(Vec<T>),
    Remove(Vec<T>),
    /// Replace the item's elements with this ordering.
    Reorder(Vec<T>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EditorState {
    #[default]
    Initial,
    Content,
    Error(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditorBackground {
    Loading,
    Updating,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Loaded,
    Updated,
    Error(CoreError),
}

pub struct EditorFields<T> {
    pub item: Published<BaseItem>,
    /// Everything [`EditorAction::Load`] fetched.
    pub elements: Published<Vec<T>>,
    /// Result of the last search.
    pub matches: Published<Vec<T>>,
}

impl<T> Clone for EditorFields<T> {
    fn clone(&self) -> Self {
        Self {
            item: self.item.clone(),
            elements: self.elements.clone(),
            matches: self.matches.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for EditorFields<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorFields")
            .field("item", &self.item)
            .field("elements", &self.elements)
            .field("matches", &self.matches)
            .finish()
    }
}

/// Edits one sub-collection of an item. Every mutation uploads the whole
/// resulting sub-collection, then re-fetches the item.
pub struct ItemEditorViewModel<E: ElementEditor> {
    editor: Arc<E>,
    session: UserSession,
    notifier: Arc<dyn ChangeNotifier>,
    item: Published<BaseItem>,
    elements: Published<Vec<E::Element>>,
    matches: Published<Vec<E::Element>>,
}

impl<E: ElementEditor> fmt::Debug for ItemEditorViewModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemEditorViewModel")
            .field("editor", &std::any::type_name::<E>())
            .field("item_id", &self.item.borrow().id)
            .field("elements", &self.elements.borrow().len())
            .finish()
    }
}

impl<E: ElementEditor> ItemEditorViewModel<E> {
    pub fn new(
        editor: E,
        session: UserSession,
        notifier: Arc<dyn ChangeNotifier>,
        item: BaseItem,
    ) -> Self {
        Self {
            editor: Arc::new(editor),
            session,
            notifier,
            item: Published::new(item),
            elements: Published::default(),
            matches: Published::default(),
        }
    }

    fn fail(err: CoreError, cx: &mut Context<Self>) {
        warn!(error = %err, "item editor action failed");
        cx.set_state(EditorState::Error(err.clone()));
        cx.emit(EditorEvent::Error(err));
    }

    fn load(&mut self, cx: &mut Context<Self>) {
        let editor = Arc::clone(&self.editor);
        let session = self.session.clone();
        let work = async move { editor.fetch_elements(&session).await };

        cx.spawn_fallible(
            LOAD,
            [EditorBackground::Loading],
            work,
            |this: &mut Self, result, cx| match result {
                Ok(elements) => {
                    debug!(count = elements.len(), "editor elements loaded");
                    this.elements.set(elements);
                    cx.set_state(EditorState::Content);
                    cx.emit(EditorEvent::Loaded);
                }
                Err(err) => Self::fail(err, cx),
            },
        );
    }

    fn search(&self, term: &str) -> Vec<E::Element> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        self.elements
            .borrow()
            .iter()
            .filter(|element| {
                self.editor
                    .element_name(element)
                    .to_lowercase()
                    .starts_with(&term)
            })
            .cloned()
            .collect()
    }

    /// Upload `elements` as the item's whole sub-collection.
    fn update(&mut self, elements: Vec<E::Element>, cx: &mut Context<Self>) {
        let mut item = self.item.get();
        let Some(item_id) = item.id else {
            Self::fail(CoreError::validation("item has no identifier"), cx);
            return;
        };
        self.editor.apply(&mut item, elements);

        let api = Arc::clone(self.session.api());
        let work = async move {
            api.update_item(item_id, &item).await?;
            Ok::<_, TaskError>(())
        };

        cx.spawn_fallible(
            UPDATE,
            [EditorBackground::Updating],
            work,
            move |this: &mut Self, result, cx| match result {
                Ok(()) => this.refresh_item(item_id, cx),
                Err(err) => Self::fail(err, cx),
            },
        );
    }

    fn refresh_item(&mut self, item_id: ItemId, cx: &mut Context<Self>) {
        let api = Arc::clone(self.session.api());
        let user_id = self.session.user_id();
        let work = async move {
            let item = api.item(user_id, item_id).await?;
            Ok::<_, TaskError>(item)
        };

        cx.spawn_fallible(
            UPDATE,
            [EditorBackground::Refreshing],
            work,
            |this: &mut Self, result, cx| match result {
                Ok(item) => {
                    this.item.set(item.clone());
                    this.notifier
                        .post(ResourceChanged::ItemMetadata(Box::new(item)));
                    cx.set_state(EditorState::Content);
                    cx.emit(EditorEvent::Updated);
                }
                Err(err) => Self::fail(err, cx),
            },
        );
    }
}

impl<E: ElementEditor> Reducer for ItemEditorViewModel<E> {
    type Action = EditorAction<E::Element>;
    type State = EditorState;
    type Event = EditorEvent;
    type Background = EditorBackground;
    type Fields = EditorFields<E::Element>;

    fn fields(&self) -> Self::Fields {
        EditorFields {
            item: self.item.clone(),
            elements: self.elements.clone(),
            matches: self.matches.clone(),
        }
    }

    fn respond(
        &mut self,
        action: Self::Action,
        cx: &mut Context<Self>,
    ) -> EditorState {
        match action {
            EditorAction::Load => self.load(cx),
            EditorAction::Search(term) => {
                let matches = self.search(&term);
                self.matches.set(matches);
            }
            EditorAction::Add(added) => {
                let mut elements = self.editor.current(&self.item.borrow());
                for element in added {
                    if !elements.contains(&element) {
                        elements.push(element);
                    }
                }
                self.update(elements, cx);
            }
            EditorAction::Remove(removed) => {
                let mut elements = self.editor.current(&self.item.borrow());
                elements.retain(|element| !removed.contains(element));
                self.update(elements, cx);
            }
            EditorAction::Reorder(ordered) => self.update(ordered, cx),
        }
        cx.state()
    }
}
