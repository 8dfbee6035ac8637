//! Menu renderer
//!
//! Pure presentation: inline keyboards and message text built from
//! catalog rows. No I/O here; the engine decides what to render and
//! the transport decides how to deliver it.

pub mod keyboard;
pub mod text;

pub use keyboard::{Button, Keyboard, KeyboardBuilder};
