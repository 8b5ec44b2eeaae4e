pub mod header;
pub mod progress_bar;
