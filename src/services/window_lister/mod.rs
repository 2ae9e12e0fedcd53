//! WindowLister service: responsibility and boundaries
//!
//! This module and its submodules only enumerate open windows and raise a chosen
//! one through an external tool. They hold no usage data and make no ranking
//! decisions. Ordering belongs to the Ranker, and when to refresh belongs to the
//! SessionController.

mod dry_run;
mod parser;
mod r#trait;
mod wmctrl;

pub use self::dry_run::DryRunLister;
pub use self::parser::{parse_window_list, MalformedLinePolicy};
pub use self::r#trait::{create_window_lister, FocusTarget, WindowLister};
pub use self::wmctrl::WmctrlLister;
