mod formatter;

pub use formatter::{format_json, format_size, format_tree, EntryReport, FormatOptions};
