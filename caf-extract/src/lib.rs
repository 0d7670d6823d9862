//! Turn NCSC Cyber Assessment Framework HTML into a [`FrameworkDocument`].
//!
//! [`extract`] reads the single-page layout. The [`crawl`] module parses the
//! linked-page layout one page at a time and leaves fetching to the caller.
//!
//! Every selector lives in [`markers`]. Any deviation from them is reported
//! as an [`ExtractError`]; nothing is guessed and no partial document is
//! returned.
//!
//! [`FrameworkDocument`]: caf_framework::FrameworkDocument

pub mod crawl;
pub mod error;
pub mod ids;
pub mod markers;
mod page;
pub mod table;
pub mod text;

pub use error::{ExtractError, Level};
pub use page::extract;
