//! Client side of a web translation editor: unit paging, navigation,
//! placeholder-safe machine translation and diff rendering.

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod mt;
pub mod server;
pub mod text;
pub mod utils;

pub use editor::EditorSession;
pub use editor::dispatch::{Command, Dispatcher, Outcome};
pub use error::{EditorError, EditorResult};
