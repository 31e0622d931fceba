//! Individual sanitizer stages
//!
//! Each stage implements `Runnable<Draft, Draft>` and can be composed into a
//! chain with [`crate::papertex::transforms::Transform::then`].

pub mod blanks;
pub mod braces;
pub mod escaping;
pub mod list_options;
pub mod packages;
pub mod protection;

pub use blanks::CollapseBlankRuns;
pub use braces::CheckBraces;
pub use escaping::EscapeReserved;
pub use list_options::RewriteListOptions;
pub use packages::EnsurePackages;
pub use protection::{ProtectSpans, RestoreSpans};
