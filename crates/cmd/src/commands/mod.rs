pub mod edit;
pub mod mutate;
pub mod session;
pub mod show;

pub use edit::{create_command, insert_command, str_replace_command, view_command};
pub use mutate::{clear_command, delete_command, rename_command};
pub use session::session_command;
pub use show::{paths_command, tree_command};
