//! Terminal UI. The model, update function and view are pure; the runtime
//! and terminal handling need the `cli` feature.

pub mod feed;
pub mod state;
pub mod view;

#[cfg(feature = "cli")]
pub mod keymap;
#[cfg(feature = "cli")]
pub mod runtime;
#[cfg(feature = "cli")]
pub mod terminal;

pub use feed::ChatFeed;
pub use state::{Command, Intent, Model, Msg, Screen};
#[cfg(feature = "cli")]
pub use runtime::App;
