pub mod ranker;
pub mod session;
pub mod usage_store;
pub mod window_lister;

pub use ranker::Ranker;
pub use session::{RenderTarget, SessionController};
pub use usage_store::UsageStore;
pub use window_lister::create_window_lister;
