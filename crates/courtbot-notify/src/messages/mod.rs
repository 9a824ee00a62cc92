//! The courtbot message catalog.
//!
//! - [`catalog`] — [`MessageCatalog`], one method per SMS template, plus
//!   [`MessageKind`] / [`MessageInput`] for rendering by name.
//! - [`records`] — the case-match, hearing, and subscription records the
//!   templates interpolate.
//! - [`format`] — whitespace normalization, name casing, and the date and
//!   time formats used in message bodies.

pub mod catalog;
pub mod format;
pub mod records;

pub use catalog::{MessageCatalog, MessageInput, MessageKind};
pub use format::{cleanup_name, normalize_spaces};
pub use records::{CaseMatch, Hearing, Subscription};
