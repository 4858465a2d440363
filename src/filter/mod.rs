pub mod short_filter;
pub mod threshold;

pub use short_filter::{apply_short_filter, ShortFilter};
pub use threshold::{apply_threshold, direction_agreement, sign};
