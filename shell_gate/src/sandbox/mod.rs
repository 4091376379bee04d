//! # Working Directory Containment
//!
//! Resolves the directory a command runs in and checks it against the allowed roots.
//!
//! Paths are made absolute and normalized lexically; they are never canonicalized, so a
//! symlink inside an allowed root that points elsewhere is not detected. By default the
//! check is a plain string prefix (`ContainmentMode::Prefix`), which also admits
//! siblings such as `/home/u/proj-evil` for root `/home/u/proj`. Setting
//! `strict_working_dir_containment` switches to whole-component comparison.

mod core;
mod error;
mod scopes;
mod types;

pub use self::core::Sandbox;
pub use error::SandboxError;
pub use scopes::{absolutize, expand_tilde, normalize_path_lexically};
pub use types::ContainmentMode;
