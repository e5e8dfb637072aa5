pub mod canvas;
pub mod host;
pub mod input;
pub mod interaction;
pub mod selection;

pub use canvas::CanvasEditor;
pub use host::{CanvasHost, HostCall, RecordingHost};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use interaction::{CanvasAction, Interaction, InteractionState};
pub use selection::Selection;
