pub mod export;
pub mod html;
pub mod page;

pub use export::{export_file_name, export_html};
pub use page::{preview_html, print_html};
