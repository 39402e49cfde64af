//! # gc-letters – markdown letter blocks → paginated PDF
//!
//! This crate lays out letters made of markdown-like text blocks and
//! separators onto fixed-size pages and writes them as PDF. The stages are:
//!
//! 1. **Configure** – [`LetterConfig`] plus ordered [`ContentBlock`]s ([`config`])
//! 2. **Tokenize** – block content → headings, paragraphs, lists, tables ([`markdown`], [`inline`])
//! 3. **Style** – per-block overrides over document defaults ([`style`])
//! 4. **Flow** – wrap, break pages and draw onto a [`DocumentWriter`] ([`flow`], [`pagination`], [`text`])
//! 5. **Decorate** – page numbers, continuation and tracking numbers ([`decoration`])
//! 6. **Render** – recorded canvas → PDF bytes via printpdf ([`canvas`], [`render`])
//!
//! [`Letter::render`] runs the whole pipeline.
//!
//! ```no_run
//! use gc_letters::{ContentBlock, Letter, LetterConfig};
//!
//! let config = LetterConfig::new("approval", "signature.png");
//! let blocks = vec![ContentBlock::text("# Approval\n\nYour request has been **approved**.")];
//! if let Some(letter) = Letter::new(config, blocks).render()? {
//!     letter.save("out")?;
//! }
//! # Ok::<(), gc_letters::Error>(())
//! ```

pub mod canvas;
pub mod config;
pub mod decoration;
pub mod error;
pub mod flow;
pub mod fonts;
pub mod geometry;
pub mod images;
pub mod inline;
pub mod markdown;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod style;
mod table;
pub mod templates;
pub mod text;
pub mod units;
pub mod writer;

// Re-exports for convenience
pub use canvas::{CanvasDocument, PdfCanvas};
pub use config::{ContentBlock, LetterConfig, LetterDefinition, SeparatorBlock, ShowPolicy, TextBlock};
pub use error::{Error, Result};
pub use flow::{FlowRenderer, RenderCursor, Warning};
pub use geometry::PageType;
pub use pipeline::{Letter, RenderedLetter};
pub use style::{StyleOverrides, TextAlign};
pub use writer::DocumentWriter;
