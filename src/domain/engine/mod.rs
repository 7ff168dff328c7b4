pub mod export;
pub mod filter;
pub mod pager;
pub mod sniff;
pub mod sort;
pub mod stats;
pub mod value;

pub use export::{export_csv, export_file_name};
pub use filter::{distinct_values, filter_indices, filter_rows};
pub use pager::{clamp_page, paginate, preview, total_pages};
pub use sniff::sniff_column;
pub use sort::sort_rows;
pub use stats::{column_stats, summary_stats};
