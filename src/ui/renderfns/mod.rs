pub mod header;
pub mod utils;

pub use header::draw_header;
pub use utils::{ensure_valid_selection, or_unknown, truncate};
