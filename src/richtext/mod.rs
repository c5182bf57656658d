pub mod block_format;
pub mod commands;
pub mod markdown_converter;
pub mod selection;
pub mod span_engine;
pub mod structured_document;
pub mod structured_editor;
pub mod style;
pub mod toolbar;

pub use commands::Command;
pub use selection::Selection;
pub use structured_document::{Block, BlockType, DocumentPosition, StructuredDocument};
pub use structured_editor::StructuredEditor;
