//! Game-facing message text: templates, markup and message kinds.

pub mod formatter;
pub mod kinds;
pub mod markup;

pub use formatter::{Template, TemplateCompiler};
pub use kinds::{KindSpec, MessageKind};
pub use markup::{strip_markup, MarkupPolicy};
