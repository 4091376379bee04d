use std::path::Path;

/// How a resolved working directory is compared against an allowed root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainmentMode {
    /// Plain string prefix. `/home/u/proj-evil` passes for root `/home/u/proj`.
    #[default]
    Prefix,
    /// Whole path components only.
    Segment,
}

impl ContainmentMode {
    pub fn contains(self, root: &Path, path: &Path) -> bool {
        match self {
            ContainmentMode::Prefix => path
                .to_string_lossy()
                .starts_with(root.to_string_lossy().as_ref()),
            ContainmentMode::Segment => path.starts_with(root),
        }
    }
}
