pub mod filesystem;

pub use filesystem::{copy_file, delete_old_rename_new, ensure_directory, CommitOutcome};
