pub mod drag;
pub mod editor;
pub mod generate;
pub mod history;
pub mod input;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use drag::{DragController, DragKind, DragSession, resize_from_corner};
pub use editor::{Editor, EventOutcome, TextReply};
pub use generate::{
    GenerationKind, GenerationOutput, GenerationParams, GenerationRequest, GenerationResponse,
    Generator,
};
pub use history::History;
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{AnnotationStore, StoreView, SubscriptionId, TextPatch};
pub use tools::{Modal, SizeProperty, ToolInput, ToolMode, ToolSettings};
