/// Reading initial sheet data from source files.
pub mod source;
pub mod workspace;

pub use source::LoadError;
pub use workspace::{Workspace, WorkspaceError};
