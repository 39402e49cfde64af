//! Pipeline – ties validation, image acquisition, the content pass and the
//! decoration pass together behind [`Letter::render`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::canvas::{CanvasDocument, PdfCanvas};
use crate::config::{ContentBlock, LetterConfig, LetterDefinition};
use crate::decoration::decorate;
use crate::error::{Error, Result};
use crate::flow::{validate_blocks, FlowRenderer, Warning};
use crate::geometry::PageGeometry;
use crate::images::{acquire, ImageLoader, SourceLoader};
use crate::markdown::{BlockTokenizer, MarkdownTokenizer};
use crate::pagination::{WORDMARK_BOTTOM_OFFSET, WORDMARK_HEIGHT};
use crate::render::render_pdf;
use crate::style::document_style;
use crate::writer::DocumentWriter;

/// Height of the department signature on page 1, in mm.
pub const SIGNATURE_HEIGHT: f32 = 10.0;
/// Gap between the signature and the first line of content, in mm.
pub const SIGNATURE_GAP: f32 = 8.0;

/// A letter waiting to be rendered.
pub struct Letter {
    config: LetterConfig,
    blocks: Vec<ContentBlock>,
    loader: Box<dyn ImageLoader>,
    tokenizer: Box<dyn BlockTokenizer>,
    rendered: bool,
}

impl Letter {
    pub fn new(config: LetterConfig, blocks: Vec<ContentBlock>) -> Self {
        Self {
            config,
            blocks,
            loader: Box::new(SourceLoader::new()),
            tokenizer: Box::new(MarkdownTokenizer),
            rendered: false,
        }
    }

    pub fn from_definition(definition: LetterDefinition) -> Self {
        Self::new(definition.config, definition.blocks)
    }

    pub fn with_loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl BlockTokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn config(&self) -> &LetterConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Render the letter. Configuration and length errors are raised before
    /// any page exists. A letter renders once; later calls return `Ok(None)`.
    pub fn render(&mut self) -> Result<Option<RenderedLetter>> {
        if self.rendered {
            log::debug!("Letter '{}' already rendered; skipping", self.config.file_name);
            return Ok(None);
        }

        let config = &self.config;
        config.validate()?;
        let geometry = PageGeometry::resolve(config.page_type, &config.x_margin, &config.y_margin)?;
        let doc_style = document_style(&config.typography)?;
        validate_blocks(&config.typography, &self.blocks)?;
        self.rendered = true;

        let mut canvas = PdfCanvas::new(&config.title(), geometry.width, geometry.height);
        let mut warnings = Vec::new();

        // ── First-page marks ──────────────────────────────────────────────
        let start_y = match acquire(self.loader.as_ref(), &config.dept_signature) {
            Ok(signature) => {
                let width = signature.width_for_height(SIGNATURE_HEIGHT);
                canvas.add_image(&signature, geometry.margin_x, geometry.margin_y, width, SIGNATURE_HEIGHT);
                geometry.margin_y + SIGNATURE_HEIGHT + SIGNATURE_GAP
            }
            Err(e) => {
                log::warn!("Department signature not drawn: {e}");
                warnings.push(Warning::ImageUnavailable {
                    image: "department signature".to_string(),
                    reason: e.to_string(),
                });
                geometry.margin_y
            }
        };

        let mut wordmark_placed = false;
        if let Some(source) = config.wordmark_source() {
            match acquire(self.loader.as_ref(), source) {
                Ok(mark) => {
                    let y = geometry.height - WORDMARK_BOTTOM_OFFSET - WORDMARK_HEIGHT;
                    let width = mark.width_for_height(WORDMARK_HEIGHT);
                    canvas.add_image(&mark, geometry.margin_x, y, width, WORDMARK_HEIGHT);
                    wordmark_placed = true;
                }
                Err(e) => {
                    log::warn!("Canada wordmark not drawn: {e}");
                    warnings.push(Warning::ImageUnavailable {
                        image: "Canada wordmark".to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // ── Content pass ──────────────────────────────────────────────────
        let outcome = FlowRenderer::new(&mut canvas, &config.typography, geometry)
            .with_tokenizer(self.tokenizer.as_ref())
            .start_at(start_y)
            .with_wordmark(wordmark_placed)
            .with_estimate(config.page_break_estimate)
            .with_table_style(config.table_style)
            .run(&self.blocks)?;
        warnings.extend(outcome.warnings);

        // ── Decoration pass ───────────────────────────────────────────────
        decorate(&mut canvas, config, &geometry, &doc_style);

        log::debug!(
            "Rendered '{}': {} page(s), {} warning(s)",
            config.file_name,
            canvas.page_count(),
            warnings.len()
        );

        Ok(Some(RenderedLetter {
            file_name: pdf_file_name(&config.file_name),
            canvas: canvas.into_document(),
            warnings,
        }))
    }
}

/// A finished letter: the recorded pages plus what went wrong along the way.
#[derive(Debug, Clone)]
pub struct RenderedLetter {
    file_name: String,
    canvas: CanvasDocument,
    warnings: Vec<Warning>,
}

impl RenderedLetter {
    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn canvas(&self) -> &CanvasDocument {
        &self.canvas
    }

    /// Output file name, always ending in `.pdf`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn to_pdf_bytes(&self) -> Vec<u8> {
        render_pdf(&self.canvas)
    }

    /// Write the PDF into `dir`, creating it when missing.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let path = dir.join(&self.file_name);
        let export = |source| Error::Export {
            file: path.display().to_string(),
            source,
        };

        fs::create_dir_all(dir).map_err(export)?;
        fs::write(&path, self.to_pdf_bytes()).map_err(export)?;
        log::debug!("Saved {}", path.display());
        Ok(path)
    }

    /// A zero-argument export trigger that saves into `dir` when called.
    pub fn into_export(self, dir: impl Into<PathBuf>) -> impl Fn() -> Result<PathBuf> {
        let dir = dir.into();
        move || self.save(&dir)
    }
}

/// `name` with `.pdf` appended unless it already ends with it.
pub fn pdf_file_name(name: &str) -> String {
    let name = name.trim();
    if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}
