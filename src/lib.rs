pub mod analyzers;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod input;
pub mod network;
pub mod output;
pub mod reader;
pub mod schema;
pub mod stats;
pub mod transform;

pub use error::{Error, Result};
pub use events::{EventTable, EventType, EventsFile};
pub use input::{Location, RunDirectory, RunLayout};
pub use schema::{EnhancedPathTraversal, PathTraversalEvent};
