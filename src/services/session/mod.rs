//! SessionController: the host-facing state machine that ties the lister,
//! the ranker and the usage store together for one activation cycle.

mod controller;
mod render;
mod state;

pub use self::controller::{Activation, SessionController};
pub use self::render::{FnRenderTarget, RenderTarget};
pub use self::state::SessionState;
