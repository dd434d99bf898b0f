//! Headless browser automation
//!
//! Thin layer over chromiumoxide: launch, navigate, query the DOM by visible
//! text or selector, click, screenshot, and collect page errors.

pub mod capture;
pub mod script;
pub mod session;
pub mod wait;

pub use session::{BrowserSession, PageSession};
