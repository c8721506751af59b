pub mod front_matter;
pub mod markdown_task;

pub use front_matter::parse_front_matter;
pub use markdown_task::MarkdownTaskParser;
