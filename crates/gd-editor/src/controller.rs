//! Editor controller: owns the map, the history and the active tool.
//!
//! The controller is the only listener of the active tool's lifecycle
//! events. It queues them while the tool runs and handles them right after
//! each input, so every completed gesture registers exactly one task.
//! Edits that do not come from a pointer gesture (restyling, deleting,
//! layer changes, paste) are applied here directly and registered the
//! same way.

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::events::LifecycleEvent;
use crate::history::HistoryService;
use crate::input::{KeyEvent, PointerEvent};
use crate::interactions::{InteractionContext, ToolBox, ToolInteraction, ToolKind};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tasks::{GeometryChange, PlacedLayer, StyleChange, Task};
use gd_core::{
    Feature, FeatureId, Geometry, Layer, LayerId, Map, StyleProperties, decode_features,
    encode_features,
};
use gd_render::{ResourceStore, StyleFactory, VisualStyle};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

type Inbox = Rc<RefCell<VecDeque<LifecycleEvent>>>;

fn listen(tool: &mut ToolBox, inbox: &Inbox) {
    let sink = Rc::clone(inbox);
    tool.emitter_mut()
        .subscribe(move |event| sink.borrow_mut().push_back(event.clone()));
}

pub struct EditorController {
    map: Map,
    config: EditorConfig,
    history: HistoryService,
    tool: ToolBox,
    inbox: Inbox,
    /// Geometry of features parked for modification, keyed by feature.
    before: HashMap<FeatureId, Geometry>,
    /// Style stamped onto newly created features.
    current_style: StyleProperties,
    styles: StyleFactory,
    clipboard: Option<Vec<u8>>,
    notifications: Vec<String>,
}

impl EditorController {
    pub fn new(map: Map, config: EditorConfig) -> Self {
        Self::with_resources(map, config, ResourceStore::new())
    }

    pub fn with_resources(map: Map, config: EditorConfig, resources: ResourceStore) -> Self {
        let inbox = Inbox::default();
        let mut tool = ToolBox::for_kind(ToolKind::Selection);
        listen(&mut tool, &inbox);
        Self {
            map,
            history: HistoryService::new(config.history_depth),
            config,
            tool,
            inbox,
            before: HashMap::new(),
            current_style: StyleProperties::default(),
            styles: StyleFactory::new(resources),
            clipboard: None,
            notifications: Vec::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    pub fn tool(&self) -> &ToolBox {
        &self.tool
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn current_style(&self) -> &StyleProperties {
        &self.current_style
    }

    /// Set the style new features are created with.
    pub fn set_current_style(&mut self, style: StyleProperties) {
        self.current_style = style;
    }

    pub fn set_resolution(&mut self, resolution: f64) {
        self.map.resolution = resolution;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo(&self.config.history_key)
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo(&self.config.history_key)
    }

    /// Non-fatal fault messages, oldest first.
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    /// Features the active tool is holding mid-gesture.
    pub fn overlay_features(&self) -> Vec<&Feature> {
        self.tool.overlay_features()
    }

    /// Render primitives for a feature, whether committed or mid-gesture.
    pub fn visual_style(&self, id: FeatureId) -> Option<VisualStyle> {
        let feature = self
            .map
            .feature(id)
            .or_else(|| self.tool.overlay_features().into_iter().find(|f| f.id == id))?;
        Some(self.styles.visual_style(&feature.style))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed a pointer event to the active tool. Returns `true` if the tool
    /// let it propagate (the host may then pan the map, for instance).
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let mut ctx = InteractionContext::new(&mut self.map, &self.config);
        let propagate = self.tool.handle_pointer(&mut ctx, event);
        self.drain_events();
        propagate
    }

    /// The active tool sees keys first; unconsumed keys go through the
    /// shortcut table. Returns `true` if nothing used the key.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let mut ctx = InteractionContext::new(&mut self.map, &self.config);
        let propagate = self.tool.handle_key(&mut ctx, event);
        self.drain_events();
        if !propagate {
            return false;
        }
        match ShortcutMap::resolve_event(event) {
            Some(action) => self.run_shortcut(action),
            None => true,
        }
    }

    fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        log::debug!("shortcut {action:?}");
        match action {
            ShortcutAction::SelectTool(kind) => self.select_tool(kind),
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                if let Err(error) = self.delete_selection() {
                    log::debug!("delete shortcut: {error}");
                }
            }
            ShortcutAction::Copy => match self.copy_selection() {
                Ok(count) => log::debug!("copied {count} feature(s)"),
                Err(error) => log::debug!("copy shortcut: {error}"),
            },
            ShortcutAction::Paste => match self.paste() {
                Ok(count) => log::debug!("pasted {count} feature(s)"),
                Err(error) => log::debug!("paste shortcut: {error}"),
            },
            // The tool already declined these.
            ShortcutAction::Cancel | ShortcutAction::Finish => return true,
        }
        false
    }

    // ─── Lifecycle events ────────────────────────────────────────────────

    fn drain_events(&mut self) {
        loop {
            let Some(event) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            self.on_event(event);
        }
        if !self.tool.is_active() {
            self.before.clear();
        }
    }

    fn on_event(&mut self, event: LifecycleEvent) {
        log::trace!("controller <- {}", event.name());
        match event {
            LifecycleEvent::FeatureBeingCreated { .. } => {}
            LifecycleEvent::FeatureCreated { layer, features } => self.on_created(layer, &features),
            LifecycleEvent::GeometryBeingUpdated { features, .. } => {
                for feature in features {
                    self.before.insert(feature.id, feature.geometry);
                }
            }
            LifecycleEvent::GeometryUpdated { features, .. } => self.on_updated(features),
            LifecycleEvent::SelectionChanged {
                selected,
                deselected,
            } => {
                log::debug!("selection +{} -{}", selected.len(), deselected.len());
            }
        }
    }

    /// Stamp new features with the current style, make them the selection
    /// and register one `AddFeatures`.
    fn on_created(&mut self, layer: LayerId, features: &[Feature]) {
        let Some(collection) = self.map.collection_mut(layer) else {
            self.report(EditorError::UnknownLayer(layer));
            return;
        };
        collection.deselect_all();
        let mut snapshots = Vec::with_capacity(features.len());
        for created in features {
            let Some(live) = collection.get_mut(created.id) else {
                continue;
            };
            live.style = self.current_style.merged(&live.style);
            live.selected = true;
            let mut snapshot = live.clone();
            snapshot.selected = false;
            snapshots.push(snapshot);
        }
        if !snapshots.is_empty() {
            self.history
                .register(&self.config.history_key, Task::add_features(layer, snapshots));
        }
    }

    fn on_updated(&mut self, features: Vec<Feature>) {
        let mut changes = Vec::with_capacity(features.len());
        for after in features {
            match self.before.remove(&after.id) {
                Some(before) if before != after.geometry => changes.push(GeometryChange {
                    feature: after.id,
                    before,
                    after: after.geometry,
                }),
                Some(_) => {}
                None => self.report(EditorError::MissingBeforeState(after.id)),
            }
        }
        if !changes.is_empty() {
            self.history
                .register(&self.config.history_key, Task::update_geometries(changes));
        }
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Switch tools. The old tool is disposed: any gesture in progress is
    /// abandoned without registering anything.
    pub fn select_tool(&mut self, kind: ToolKind) {
        let mut ctx = InteractionContext::new(&mut self.map, &self.config);
        self.tool.dispose(&mut ctx);
        self.inbox.borrow_mut().clear();
        self.before.clear();
        self.tool = ToolBox::for_kind(kind);
        listen(&mut self.tool, &self.inbox);
    }

    /// Abandon the current gesture, keeping the same tool.
    fn cancel_gesture(&mut self) {
        if self.tool.is_active() {
            log::debug!("cancelling {:?} gesture", self.tool.kind());
            self.select_tool(self.tool.kind());
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Option<String> {
        self.cancel_gesture();
        self.history.undo(&self.config.history_key, &mut self.map)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.cancel_gesture();
        self.history.redo(&self.config.history_key, &mut self.map)
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Merge `style` into every selected feature of the active layer.
    /// Returns how many features actually changed.
    pub fn apply_style_to_selection(&mut self, style: &StyleProperties) -> Result<usize, EditorError> {
        self.surface(|editor| editor.try_apply_style(style))
    }

    fn try_apply_style(&mut self, style: &StyleProperties) -> Result<usize, EditorError> {
        self.cancel_gesture();
        let collection = self
            .map
            .active_collection_mut()
            .ok_or(EditorError::NoActiveLayer)?;
        let mut selected = 0;
        let mut changes = Vec::new();
        for feature in collection.iter_mut().filter(|f| f.selected) {
            selected += 1;
            let before = feature.style.clone();
            feature.style.merge(style);
            if feature.style != before {
                changes.push(StyleChange {
                    feature: feature.id,
                    before,
                    after: feature.style.clone(),
                });
            }
        }
        if selected == 0 {
            return Err(EditorError::EmptySelection);
        }
        let changed = changes.len();
        if changed > 0 {
            self.history
                .register(&self.config.history_key, Task::update_style(changes));
        }
        Ok(changed)
    }

    /// Remove every selected feature of the active layer.
    pub fn delete_selection(&mut self) -> Result<usize, EditorError> {
        self.surface(Self::try_delete_selection)
    }

    fn try_delete_selection(&mut self) -> Result<usize, EditorError> {
        self.cancel_gesture();
        let layer = self.map.active_layer_id().ok_or(EditorError::NoActiveLayer)?;
        let collection = self
            .map
            .collection_mut(layer)
            .ok_or(EditorError::NotVectorLayer(layer))?;
        let removed: Vec<Feature> = collection
            .selected_ids()
            .into_iter()
            .filter_map(|id| collection.remove(id))
            .map(|mut f| {
                f.selected = false;
                f
            })
            .collect();
        if removed.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        let count = removed.len();
        self.history
            .register(&self.config.history_key, Task::remove_features(layer, removed));
        Ok(count)
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    /// Add an empty vector layer on top and make it active.
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        self.cancel_gesture();
        let layer = Layer::vector(name);
        let id = layer.id;
        let index = self.map.layers.len();
        self.map.add_layer(layer.clone());
        self.map.set_active_layer(id);
        self.history.register(
            &self.config.history_key,
            Task::add_layers(vec![PlacedLayer {
                index,
                layer: Layer { active: true, ..layer },
            }]),
        );
        id
    }

    /// Add a raster layer on top. Activation is unchanged.
    pub fn add_raster_layer(&mut self, name: &str, source: &str) -> LayerId {
        let layer = Layer::raster(name, source);
        let id = layer.id;
        let index = self.map.layers.len();
        self.map.add_layer(layer.clone());
        self.history
            .register(&self.config.history_key, Task::add_layers(vec![PlacedLayer { index, layer }]));
        id
    }

    /// Remove a layer. If it was active, the top-most remaining vector
    /// layer becomes active.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<(), EditorError> {
        self.surface(|editor| editor.try_remove_layer(id))
    }

    fn try_remove_layer(&mut self, id: LayerId) -> Result<(), EditorError> {
        self.cancel_gesture();
        let (index, layer) = self.map.remove_layer(id).ok_or(EditorError::UnknownLayer(id))?;
        if layer.active {
            self.map.activate_last_layer();
        }
        self.history
            .register(&self.config.history_key, Task::remove_layers(vec![PlacedLayer { index, layer }]));
        Ok(())
    }

    /// Switch the layer drawing tools write into. Not an undoable edit.
    pub fn set_active_layer(&mut self, id: LayerId) -> Result<(), EditorError> {
        self.surface(|editor| match editor.map.layer(id).map(Layer::is_vector) {
            None => Err(EditorError::UnknownLayer(id)),
            Some(false) => Err(EditorError::NotVectorLayer(id)),
            Some(true) => {
                editor.cancel_gesture();
                editor.map.set_active_layer(id);
                Ok(())
            }
        })
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selected features of the active layer.
    pub fn copy_selection(&mut self) -> Result<usize, EditorError> {
        self.surface(Self::try_copy)
    }

    fn try_copy(&mut self) -> Result<usize, EditorError> {
        let collection = self.map.active_collection().ok_or(EditorError::NoActiveLayer)?;
        let selected: Vec<Feature> = collection.iter().filter(|f| f.selected).cloned().collect();
        if selected.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        self.clipboard = Some(encode_features(&selected)?);
        Ok(selected.len())
    }

    /// Paste the clipboard into the active layer under fresh ids. The
    /// pasted features become the selection.
    pub fn paste(&mut self) -> Result<usize, EditorError> {
        self.surface(Self::try_paste)
    }

    fn try_paste(&mut self) -> Result<usize, EditorError> {
        self.cancel_gesture();
        let bytes = self.clipboard.as_deref().ok_or(EditorError::EmptyClipboard)?;
        let decoded = decode_features(bytes)?;
        let layer = self.map.active_layer_id().ok_or(EditorError::NoActiveLayer)?;
        let collection = self
            .map
            .collection_mut(layer)
            .ok_or(EditorError::NotVectorLayer(layer))?;

        let pasted: Vec<Feature> = decoded
            .into_iter()
            .map(|f| Feature::with_id(FeatureId::generate(), f.geometry).styled(f.style))
            .collect();
        collection.deselect_all();
        for feature in &pasted {
            collection.insert(Feature {
                selected: true,
                ..feature.clone()
            });
        }
        let count = pasted.len();
        self.history
            .register(&self.config.history_key, Task::add_features(layer, pasted));
        Ok(count)
    }

    // ─── Project ─────────────────────────────────────────────────────────

    /// Replace the whole map. The old timeline refers to features and
    /// layers that no longer exist, so it is dropped.
    pub fn load_map(&mut self, map: Map) {
        let kind = self.tool.kind();
        let mut ctx = InteractionContext::new(&mut self.map, &self.config);
        self.tool.dispose(&mut ctx);
        self.map = map;
        self.history.clean(&self.config.history_key);
        self.select_tool(kind);
        log::debug!("map loaded: {} layer(s)", self.map.layers.len());
    }

    // ─── Faults ──────────────────────────────────────────────────────────

    fn report(&mut self, error: EditorError) {
        log::error!("{error}");
        self.notifications.push(error.to_string());
    }

    /// Run a fallible edit; a failure is logged and queued as a notification
    /// before it is handed back.
    fn surface<T>(
        &mut self,
        edit: impl FnOnce(&mut Self) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        edit(self).inspect_err(|error| {
            log::error!("{error}");
            self.notifications.push(error.to_string());
        })
    }
}
