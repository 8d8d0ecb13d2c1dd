pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod history;
pub mod input;
pub mod interactions;
pub mod shortcuts;
pub mod tasks;

pub use config::EditorConfig;
pub use controller::EditorController;
pub use error::EditorError;
pub use events::{Emitter, LifecycleEvent, ListenerId};
pub use history::HistoryService;
pub use input::{KeyEvent, Modifiers, PointerButton, PointerEvent, PointerKind};
pub use interactions::{InteractionContext, ToolBox, ToolInteraction, ToolKind};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tasks::{GeometryChange, PlacedLayer, StyleChange, Task};
