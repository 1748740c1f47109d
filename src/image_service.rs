//! # Image and PDF Flowcharts
//!
//! Turns an uploaded raster image, or the first page of a PDF, into a graph by
//! asking a vision-capable model to read it.
//!
//! ## Pipeline
//!
//! 1. **Prepare**: PDFs have their first page rasterized at 2x scale. Raster
//!    images are decoded, flattened to RGB, and shrunk to fit 1024x1024.
//!    Both end up as JPEG bytes.
//! 2. **Ask**: the JPEG is embedded as a base64 `data:` URL next to a fixed
//!    instruction and sent to the vision model.
//! 3. **Normalize**: the reply goes through the normalizer with the seed
//!    `Image analysis: <filename>`.
//!
//! Any failure in those steps produces the fallback graph instead of an error,
//! so this path always yields something renderable.

use crate::error::{FlowError, Result};
use crate::graph::Flowchart;
use crate::llm::{ChatMessage, ChatModel, ChatRequest, ContentPart, ImageUrl};
use crate::normalizer::{Normalized, build_fallback, normalize_response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, RgbaImage};
use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Sampling temperature for image analysis.
pub const IMAGE_TEMPERATURE: f32 = 0.5;
/// Response length cap for image analysis.
pub const IMAGE_MAX_TOKENS: u32 = 2000;
/// Largest width or height sent to the model.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;
/// JPEG quality for re-encoded raster uploads.
pub const RASTER_JPEG_QUALITY: u8 = 85;
/// JPEG quality for rasterized PDF pages.
pub const PDF_JPEG_QUALITY: u8 = 95;
/// Scale applied when rasterizing a PDF page.
pub const PDF_RENDER_SCALE: f32 = 2.0;

/// System instruction describing the target schema.
pub const IMAGE_SYSTEM_INSTRUCTION: &str = r##"You are a flowchart analysis expert. Analyze the image and extract or create a flowchart structure.
Return ONLY valid JSON with this exact structure:
{
  "nodes": [{"id": "node_0", "type": "default", "data": {"label": "Start"}, "position": {"x": 250, "y": 0}, "style": {"background": "#4ade80", "color": "white", "border": "2px solid #22c55e", "padding": "10px", "borderRadius": "8px"}}],
  "edges": [{"id": "edge_0", "source": "node_0", "target": "node_1", "animated": true}],
  "metadata": {"source": "image", "node_count": 3}
}"##;

/// Text part sent alongside the image.
pub const IMAGE_USER_INSTRUCTION: &str = "Analyze this image and create a flowchart structure. If it contains a flowchart, extract it. If it's a diagram or text, convert it to a flowchart.";

/// Renders the first page of a PDF document to JPEG bytes.
pub trait PageRasterizer: Send + Sync {
  /// Rasterize page one of `pdf` at `scale`.
  fn first_page_jpeg(&self, pdf: &[u8], scale: f32) -> Result<Vec<u8>>;
}

/// [`PageRasterizer`] backed by the system pdfium library.
///
/// The library is bound on each call, so a host without pdfium still serves
/// raster uploads; PDF uploads there fall back.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRasterizer;

fn pdf_error(e: PdfiumError) -> FlowError {
  FlowError::Pdf(e.to_string())
}

impl PageRasterizer for PdfiumRasterizer {
  fn first_page_jpeg(&self, pdf: &[u8], scale: f32) -> Result<Vec<u8>> {
    let pdfium = Pdfium::new(Pdfium::bind_to_system_library().map_err(pdf_error)?);
    let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(pdf_error)?;
    let page = document.pages().first().map_err(pdf_error)?;
    let bitmap = page
      .render_with_config(&PdfRenderConfig::new().scale_page_by_factor(scale))
      .map_err(pdf_error)?;

    let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
    let pixels = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
      .ok_or_else(|| FlowError::Pdf(format!("bitmap does not match {}x{}", width, height)))?;
    debug!(width, height, "rasterized pdf page");

    let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
    encode_jpeg(&DynamicImage::ImageRgb8(rgb), PDF_JPEG_QUALITY)
  }
}

/// Whether `filename` names a PDF (case-insensitive extension check).
pub fn is_pdf(filename: &str) -> bool {
  filename.to_ascii_lowercase().ends_with(".pdf")
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
  let mut buffer = Vec::new();
  image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
  Ok(buffer)
}

/// Decode a raster image and re-encode it as a JPEG no larger than 1024x1024.
///
/// Anything JPEG cannot carry (alpha, palettes, 16-bit samples) is flattened to
/// 8-bit RGB. Images already within bounds are never enlarged.
pub fn encode_raster(bytes: &[u8]) -> Result<Vec<u8>> {
  let decoded = image::load_from_memory(bytes)?;
  let flattened = match decoded.color() {
    ColorType::L8 | ColorType::Rgb8 => decoded,
    _ => DynamicImage::ImageRgb8(decoded.to_rgb8()),
  };
  let bounded =
    if flattened.width() > MAX_IMAGE_DIMENSION || flattened.height() > MAX_IMAGE_DIMENSION {
      flattened.resize(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION, FilterType::Lanczos3)
    } else {
      flattened
    };
  debug!(
    width = bounded.width(),
    height = bounded.height(),
    "prepared raster upload"
  );
  encode_jpeg(&bounded, RASTER_JPEG_QUALITY)
}

/// JPEG bytes to send for an upload, choosing the PDF or raster path by filename.
pub fn prepare_image(
  bytes: &[u8],
  filename: &str,
  rasterizer: &dyn PageRasterizer,
) -> Result<Vec<u8>> {
  if is_pdf(filename) {
    rasterizer.first_page_jpeg(bytes, PDF_RENDER_SCALE)
  } else {
    encode_raster(bytes)
  }
}

/// `data:` URL carrying base64-encoded JPEG bytes.
pub fn jpeg_data_url(jpeg: &[u8]) -> String {
  format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

/// Seed used for the fallback graph of an upload.
pub fn fallback_seed(filename: &str) -> String {
  format!("Image analysis: {}", filename)
}

/// Generates graphs from uploaded images and PDFs.
#[derive(Clone)]
pub struct ImageGraphService {
  model: Arc<dyn ChatModel>,
  model_name: String,
  rasterizer: Arc<dyn PageRasterizer>,
  diagnostics: bool,
}

impl ImageGraphService {
  /// Create a service calling the vision model `model_name` through `model`,
  /// rasterizing PDFs with pdfium.
  pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
    Self {
      model,
      model_name: model_name.into(),
      rasterizer: Arc::new(PdfiumRasterizer),
      diagnostics: false,
    }
  }

  /// Use a different PDF rasterizer.
  pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
    self.rasterizer = rasterizer;
    self
  }

  /// Record failure reasons in `metadata.diagnostic`.
  pub fn with_diagnostics(mut self, enabled: bool) -> Self {
    self.diagnostics = enabled;
    self
  }

  /// The request sent for an already prepared JPEG.
  pub fn build_request(&self, jpeg: &[u8]) -> ChatRequest {
    ChatRequest::new(
      self.model_name.clone(),
      vec![
        ChatMessage::system(IMAGE_SYSTEM_INSTRUCTION),
        ChatMessage::user_parts(vec![
          ContentPart::Text {
            text: IMAGE_USER_INSTRUCTION.to_string(),
          },
          ContentPart::ImageUrl {
            image_url: ImageUrl {
              url: jpeg_data_url(jpeg),
            },
          },
        ]),
      ],
      IMAGE_TEMPERATURE,
      IMAGE_MAX_TOKENS,
    )
  }

  async fn analyze(&self, bytes: &[u8], filename: &str, seed: &str) -> Result<Normalized> {
    let jpeg = prepare_image(bytes, filename, self.rasterizer.as_ref())?;
    let request = self.build_request(&jpeg);
    let raw = self.model.complete(&request).await?;
    Ok(normalize_response(&raw, seed))
  }

  /// Build a graph for an upload. Never fails; see the module docs.
  #[instrument(
    level = "debug",
    skip(self, bytes),
    fields(model = %self.model_name, bytes = bytes.len())
  )]
  pub async fn generate(&self, bytes: &[u8], filename: &str) -> Flowchart {
    let seed = fallback_seed(filename);
    match self.analyze(bytes, filename, &seed).await {
      Ok(normalized) => {
        info!(fallback = normalized.is_fallback(), "image flowchart generated");
        normalized.into_flowchart_with_diagnostics(self.diagnostics)
      }
      Err(e) => {
        warn!(error = %e, filename, "image analysis failed, using fallback");
        let graph = build_fallback(&seed);
        if self.diagnostics {
          graph.with_diagnostic(e.to_string()).into()
        } else {
          graph.into()
        }
      }
    }
  }
}
