//! Utility modules: browser launching.

pub mod browser;

pub use browser::{stream_url, BrowserLauncher, SystemBrowser};
