mod commit;
mod context;
mod descriptor;
mod file_entry;
mod search_result;
mod snippet;

pub use commit::*;
pub use context::*;
pub use descriptor::*;
pub use file_entry::*;
pub use search_result::*;
pub use snippet::*;
