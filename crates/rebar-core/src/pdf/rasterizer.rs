//! Page rasterization through poppler's `pdftoppm`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tempfile::TempDir;
use tracing::trace;

use crate::error::RenderError;

/// Renders PDF pages to images with `pdftoppm`.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    program: PathBuf,
}

impl Rasterizer {
    /// Use the given `pdftoppm` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `pdftoppm` on `PATH`.
    pub fn detect() -> Option<Self> {
        which::which("pdftoppm").ok().map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Render one page (1-indexed).
    pub fn render_page(&self, pdf: &Path, page: u32, dpi: u32) -> Result<DynamicImage, RenderError> {
        let workdir = TempDir::new()?;
        let prefix = workdir.path().join("page");
        let page_arg = page.to_string();

        self.run(
            Command::new(&self.program)
                .args(["-png", "-r", &dpi.to_string()])
                .args(["-f", &page_arg, "-l", &page_arg, "-singlefile"])
                .arg(pdf)
                .arg(&prefix),
        )?;

        trace!("Rasterized page {} at {} dpi", page, dpi);
        decode(&prefix.with_extension("png"))
    }

    /// Render every page, in page order.
    pub fn render_all(&self, pdf: &Path, dpi: u32) -> Result<Vec<DynamicImage>, RenderError> {
        let workdir = TempDir::new()?;

        self.run(
            Command::new(&self.program)
                .args(["-png", "-r", &dpi.to_string()])
                .arg(pdf)
                .arg(workdir.path().join("page")),
        )?;

        // Page numbers in the file names are zero-padded to equal width.
        let mut outputs: Vec<PathBuf> = fs::read_dir(workdir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        outputs.sort();

        if outputs.is_empty() {
            return Err(RenderError::Rasterize(
                "pdftoppm produced no pages".to_string(),
            ));
        }

        outputs.iter().map(|path| decode(path)).collect()
    }

    fn run(&self, command: &mut Command) -> Result<(), RenderError> {
        match command.output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(RenderError::Rasterize(format!(
                "{} failed: {}",
                self.program.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RenderError::Rasterize(format!(
                "{} not found (install poppler-utils)",
                self.program.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode(path: &Path) -> Result<DynamicImage, RenderError> {
    image::open(path).map_err(|e| RenderError::Decode(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let rasterizer = Rasterizer::new("/nonexistent/bin/pdftoppm");
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("plan.pdf");
        fs::write(&pdf, b"%PDF-1.5").unwrap();

        let err = rasterizer.render_page(&pdf, 1, 72).unwrap_err();
        assert!(matches!(err, RenderError::Rasterize(ref msg) if msg.contains("not found")));
    }
}
