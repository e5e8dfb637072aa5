pub mod config;
pub mod connections;
pub mod id;
pub mod layout;
pub mod model;
pub mod search;
pub mod transform;

pub use config::CanvasConfig;
pub use connections::ConnectionStore;
pub use id::{ConnectionId, NodeId};
pub use layout::{GridPlacement, LayoutStore, Viewport};
pub use model::*;
pub use search::search_nodes;
pub use transform::ViewTransform;
