pub mod exporter;
pub mod filename;

pub use exporter::{ExportError, PageExporter};
pub use filename::{PageSide, comparison_dir_name, page_file_name, sanitize_filename};
