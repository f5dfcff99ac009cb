//! PDF text and image extraction using lopdf and pdf-extract.

use std::io::Write;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};

use super::{NativeTextSource, PageRenderer, PdfType, Rasterizer};
use crate::error::{RenderError, SourceError};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// PDF reader for native text and page images.
///
/// Pages are rasterized with `pdftoppm` when it is installed; otherwise, or
/// when it fails on a page, the page's largest embedded image is used.
#[derive(Debug)]
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    page_texts: Result<Vec<String>, String>,
    rasterizer: Option<Rasterizer>,
}

impl PdfExtractor {
    /// Create an empty extractor, picking up `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            page_texts: Ok(Vec::new()),
            rasterizer: Rasterizer::detect(),
        }
    }

    /// Create an extractor and load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SourceError> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Keep bytes lopdf cannot parse. There is no text layer, but the
    /// rasterizer may still be able to render the pages.
    pub fn raster_only(data: &[u8]) -> Self {
        let mut extractor = Self::new();
        extractor.raw_data = data.to_vec();
        extractor
    }

    /// Set the rasterizer; `None` renders from embedded images only.
    pub fn with_rasterizer(mut self, rasterizer: Option<Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Load a PDF from bytes, decrypting it if it uses an empty password.
    pub fn load(&mut self, data: &[u8]) -> Result<(), SourceError> {
        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(SourceError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract and pdftoppm read the raw bytes, so keep the decrypted form.
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| SourceError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(SourceError::NoPages);
        }

        // pdf-extract keeps line breaks between text runs; lopdf's extractor does not.
        self.page_texts = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data).map_err(|e| {
            warn!("Text layer could not be extracted: {}", e);
            e.to_string()
        });

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    /// Classify the document by its text and image content.
    pub fn analyze(&self) -> PdfType {
        let text = self.full_text().unwrap_or_default();
        let has_text = text.trim().len() > 50;

        let has_images = (1..=self.page_count())
            .any(|page| self.page_images(page).is_ok_and(|images| !images.is_empty()));

        let pdf_type = match (has_text, has_images) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        };

        debug!(
            "PDF analysis: has_text={}, has_images={} -> {:?}",
            has_text, has_images, pdf_type
        );
        pdf_type
    }

    /// Decodable images referenced by a page's XObject resources.
    pub fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>, RenderError> {
        let doc = self.document.as_ref().ok_or(RenderError::NotLoaded)?;
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or(RenderError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(Object::Dictionary(resources)) = inherited_attribute(doc, page_id, b"Resources") {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        trace!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    /// Page width in points from the (possibly inherited) MediaBox.
    fn page_width_points(&self, doc: &Document, page_id: ObjectId) -> Option<f32> {
        let media_box = match inherited_attribute(doc, page_id, b"MediaBox")? {
            Object::Array(values) => values,
            _ => return None,
        };

        let coords: Vec<f32> = media_box.iter().filter_map(number).collect();
        match coords.as_slice() {
            [x0, _, x1, _] if x1 > x0 => Some(x1 - x0),
            _ => None,
        }
    }

    /// Copy of the document bytes on disk for the rasterizer.
    fn write_source(&self) -> Result<NamedTempFile, RenderError> {
        let mut source = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        source.write_all(&self.raw_data)?;
        source.flush()?;
        Ok(source)
    }

    /// Render one page, rasterizing it when possible.
    fn render_page(
        &self,
        doc: &Document,
        page: u32,
        dpi: u32,
        source: Option<&Path>,
    ) -> Result<DynamicImage, RenderError> {
        if let (Some(rasterizer), Some(path)) = (&self.rasterizer, source) {
            match rasterizer.render_page(path, page, dpi) {
                Ok(image) => return Ok(image),
                Err(e) => warn!("Page {}: {}, using embedded images", page, e),
            }
        }
        self.embedded_page_image(doc, page, dpi)
    }

    /// The page's largest embedded image, resampled so the page width
    /// corresponds to `dpi`.
    fn embedded_page_image(
        &self,
        doc: &Document,
        page: u32,
        dpi: u32,
    ) -> Result<DynamicImage, RenderError> {
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or(RenderError::InvalidPage(page))?;

        let image = self
            .page_images(page)?
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or(RenderError::NoImage { page })?;

        let Some(width_pt) = self.page_width_points(doc, page_id) else {
            debug!("Page {} has no usable MediaBox, keeping native resolution", page);
            return Ok(image);
        };

        let target_width = (width_pt / POINTS_PER_INCH * dpi as f32).round() as u32;
        if target_width == 0 || target_width == image.width() {
            return Ok(image);
        }

        let scale = target_width as f32 / image.width() as f32;
        let target_height = ((image.height() as f32 * scale).round() as u32).max(1);

        debug!(
            "Page {}: resampling {}x{} -> {}x{} ({} dpi)",
            page,
            image.width(),
            image.height(),
            target_width,
            target_height,
            dpi
        );
        Ok(image.resize_exact(target_width, target_height, FilterType::Triangle))
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    trace!("Decoding JPEG image");
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter");
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8;

        image_from_raw(&data, width, height, color_space, bits)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeTextSource for PdfExtractor {
    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_text(&self, page: u32) -> Result<String, SourceError> {
        let doc = self.document.as_ref().ok_or(SourceError::NotLoaded)?;
        if !doc.get_pages().contains_key(&page) {
            return Err(SourceError::InvalidPage(page));
        }

        let texts = self
            .page_texts
            .as_ref()
            .map_err(|e| SourceError::TextExtraction(e.clone()))?;
        texts
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(|| SourceError::TextExtraction(format!("no text for page {}", page)))
    }
}

impl PageRenderer for PdfExtractor {
    fn render_pages(&self, dpi: u32) -> Result<Vec<DynamicImage>, RenderError> {
        if self.raw_data.is_empty() {
            return Err(RenderError::NotLoaded);
        }

        let source = match &self.rasterizer {
            Some(_) => Some(self.write_source()?),
            None => None,
        };
        let source_path = source.as_ref().map(|file| file.path());

        let Some(doc) = &self.document else {
            // Unparsed bytes: only the rasterizer can read them.
            return match (&self.rasterizer, source_path) {
                (Some(rasterizer), Some(path)) => {
                    let images = rasterizer.render_all(path, dpi)?;
                    debug!("Rasterized {} unparsed pages at {} dpi", images.len(), dpi);
                    Ok(images)
                }
                _ => Err(RenderError::NotLoaded),
            };
        };

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut images = Vec::with_capacity(pages.len());
        for page in pages {
            images.push(self.render_page(doc, page, dpi, source_path)?);
        }

        debug!("Rendered {} pages at {} dpi", images.len(), dpi);
        Ok(images)
    }
}

/// Look up a page attribute, following `Parent` links for inherited keys.
fn inherited_attribute(doc: &Document, node_id: ObjectId, key: &[u8]) -> Option<Object> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(value) = dict.get(key) {
        if let Ok((_, resolved)) = doc.dereference(value) {
            return Some(resolved.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => inherited_attribute(doc, *parent_id, key),
        _ => None,
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    trace!(
        "Creating image from raw data: {}x{}, colorspace={:?}, bits={}",
        width,
        height,
        String::from_utf8_lossy(color_space),
        bits_per_component
    );

    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize) * (height as usize);
    let channels = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => {
            trace!("Unsupported color space");
            return None;
        }
    };

    if data.len() < pixels * channels {
        trace!(
            "Could not decode image: data_len={}, expected={}",
            data.len(),
            pixels * channels
        );
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for chunk in data[..pixels * channels].chunks(channels) {
        match chunk {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            _ => return None,
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}
