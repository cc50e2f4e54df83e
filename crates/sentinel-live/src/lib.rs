//! Live dashboard view over a record store.
//!
//! [`ViewState`] is the pure state machine; [`ViewController`] drives it from
//! store change notifications and user commands on its own task.

pub mod controller;
pub mod state;

pub use controller::{Command, LiveError, ViewController};
pub use state::{Notice, NoticeLevel, Phase, ViewState};
