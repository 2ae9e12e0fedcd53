pub mod session;
pub mod window;

pub use session::SessionEvent;
pub use window::{RenderItem, Selection, WindowRecord};
