//! Document-level extraction with native-text-first source selection.

use tracing::{debug, info, warn};

use super::filter::{CodeSet, ExtractionMode, ResultFilter};
use super::page::PageExtractor;
use super::rules::discover_circle_codes;
use crate::error::{Result, SourceError};
use crate::models::{ExtractionResult, PageId, RebarConfig, TextSource};
use crate::ocr::{ImagePreprocessor, OcrBackend, OcrMode};
use crate::pdf::{NativeTextSource, PageRenderer};

/// Extracts records from a whole document.
///
/// The embedded text layer is tried first. Only when it yields no records
/// at all (or cannot be read) is every page rendered and run through OCR;
/// the two passes are never merged.
pub struct DocumentExtractor<O: OcrBackend> {
    ocr: O,
    pages: PageExtractor,
    preprocessor: Option<ImagePreprocessor>,
    render_dpi: u32,
    ocr_mode: OcrMode,
    prefer_native_text: bool,
}

impl<O: OcrBackend> DocumentExtractor<O> {
    /// Create an extractor with default settings.
    pub fn new(ocr: O) -> Self {
        Self {
            ocr,
            pages: PageExtractor::new(),
            preprocessor: None,
            render_dpi: 500,
            ocr_mode: OcrMode::UniformBlock,
            prefer_native_text: true,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(ocr: O, config: &RebarConfig) -> Self {
        let preprocessor = config
            .ocr
            .preprocess
            .then(|| ImagePreprocessor::from_config(&config.ocr));

        Self::new(ocr)
            .with_page_extractor(PageExtractor::from_config(&config.extraction))
            .with_preprocessor(preprocessor)
            .with_render_dpi(config.pdf.render_dpi)
            .with_ocr_mode(config.ocr.mode)
            .with_native_text(config.pdf.prefer_native_text)
    }

    /// Set the page extractor.
    pub fn with_page_extractor(mut self, pages: PageExtractor) -> Self {
        self.pages = pages;
        self
    }

    /// Set the image preprocessor applied before OCR.
    pub fn with_preprocessor(mut self, preprocessor: Option<ImagePreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Set the resolution pages are rendered at for OCR.
    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.render_dpi = dpi;
        self
    }

    /// Set the OCR layout mode.
    pub fn with_ocr_mode(mut self, mode: OcrMode) -> Self {
        self.ocr_mode = mode;
        self
    }

    /// Try the embedded text layer before OCR.
    pub fn with_native_text(mut self, prefer: bool) -> Self {
        self.prefer_native_text = prefer;
        self
    }

    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    /// Extract a document and return the view selected by `mode`.
    pub fn extract<D>(&self, doc: &D, mode: &ExtractionMode) -> Result<ExtractionResult>
    where
        D: NativeTextSource + PageRenderer,
    {
        let target = match mode {
            ExtractionMode::FilteredByCodes(codes) => Some(codes),
            _ => None,
        };
        let result = self.run(doc, target)?;
        Ok(ResultFilter::new(&result).apply(mode))
    }

    /// Extract every record of a document.
    ///
    /// Native text errors are logged and lead to the OCR pass; render and
    /// OCR errors are returned.
    pub fn run<D>(&self, doc: &D, target: Option<&CodeSet>) -> Result<ExtractionResult>
    where
        D: NativeTextSource + PageRenderer,
    {
        if self.prefer_native_text {
            info!("Extracting from native text layer");
            match self.extract_native(doc, target) {
                Ok(result) if !result.is_empty() => {
                    info!(
                        "Native text: {} records, {} with circle code",
                        result.len(),
                        result.with_code_count()
                    );
                    return Ok(result);
                }
                Ok(_) => info!("Native text yielded no records, falling back to OCR"),
                Err(e) => warn!("Native text extraction failed ({}), falling back to OCR", e),
            }
        }

        let result = self.extract_ocr(doc, target)?;
        info!(
            "OCR: {} records, {} with circle code",
            result.len(),
            result.with_code_count()
        );
        Ok(result)
    }

    fn extract_native<D>(
        &self,
        doc: &D,
        target: Option<&CodeSet>,
    ) -> std::result::Result<ExtractionResult, SourceError>
    where
        D: NativeTextSource,
    {
        let page_count = doc.page_count();
        if page_count == 0 {
            return Err(SourceError::NoPages);
        }

        let mut result = ExtractionResult::empty(TextSource::Native);
        let mut all_text = String::new();

        for number in 1..=page_count {
            let text = doc.page_text(number)?;
            let page = self.pages.extract_page(&text, target, PageId::new(number));
            result.append_page(page.records, &page.counts);
            all_text.push_str(&text);
            all_text.push('\n');
        }

        let discovered = discover_circle_codes(&self.pages.normalizer().normalize(&all_text));
        info!(
            "Discovered {} candidate circle codes in native text",
            discovered.len()
        );

        Ok(result)
    }

    fn extract_ocr<D>(&self, doc: &D, target: Option<&CodeSet>) -> Result<ExtractionResult>
    where
        D: PageRenderer,
    {
        self.ocr.check_available()?;

        info!("Rendering pages at {} dpi for OCR", self.render_dpi);
        let images = doc.render_pages(self.render_dpi)?;

        let mut result = ExtractionResult::empty(TextSource::Ocr);
        for (index, image) in images.iter().enumerate() {
            let number = index as u32 + 1;

            let text = match &self.preprocessor {
                Some(preprocessor) => {
                    self.ocr.recognize(&preprocessor.process(image), self.ocr_mode)?
                }
                None => self.ocr.recognize(image, self.ocr_mode)?,
            };
            debug!("Page {}: OCR produced {} chars", number, text.len());

            let page = self.pages.extract_page(&text, target, PageId::new(number));
            result.append_page(page.records, &page.counts);
        }

        Ok(result)
    }
}
