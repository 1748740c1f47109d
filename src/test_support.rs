//! Test doubles for the model client and the PDF rasterizer.

use crate::error::{FlowError, Result};
use crate::image_service::PageRasterizer;
use crate::llm::{ChatModel, ChatRequest};
use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// What the scripted model answers with.
pub enum Reply {
  Text(String),
  MissingCredential,
  Provider(u16),
}

/// A [`ChatModel`] that returns a fixed reply and records every request.
pub struct ScriptedModel {
  reply: Reply,
  pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
  pub fn replying(text: impl Into<String>) -> Self {
    Self::new(Reply::Text(text.into()))
  }

  pub fn new(reply: Reply) -> Self {
    Self {
      reply,
      requests: Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> usize {
    self.requests.lock().unwrap().len()
  }

  pub fn last_request(&self) -> ChatRequest {
    self.requests.lock().unwrap().last().cloned().unwrap()
  }
}

#[async_trait]
impl ChatModel for ScriptedModel {
  async fn complete(&self, request: &ChatRequest) -> Result<String> {
    self.requests.lock().unwrap().push(request.clone());
    match &self.reply {
      Reply::Text(text) => Ok(text.clone()),
      Reply::MissingCredential => Err(FlowError::MissingCredential),
      Reply::Provider(status) => Err(FlowError::Provider {
        status: *status,
        body: "rate limited".to_string(),
      }),
    }
  }
}

/// A [`PageRasterizer`] that returns fixed bytes or fails.
pub struct FixedRasterizer {
  pub output: Option<Vec<u8>>,
  pub seen_scale: Mutex<Option<f32>>,
}

impl FixedRasterizer {
  pub fn returning(bytes: Vec<u8>) -> Self {
    Self {
      output: Some(bytes),
      seen_scale: Mutex::new(None),
    }
  }

  pub fn failing() -> Self {
    Self {
      output: None,
      seen_scale: Mutex::new(None),
    }
  }
}

impl PageRasterizer for FixedRasterizer {
  fn first_page_jpeg(&self, _pdf: &[u8], scale: f32) -> Result<Vec<u8>> {
    *self.seen_scale.lock().unwrap() = Some(scale);
    self
      .output
      .clone()
      .ok_or_else(|| FlowError::Pdf("no pdfium in tests".to_string()))
  }
}

/// PNG bytes of a `width` x `height` RGBA image.
pub fn png_rgba(width: u32, height: u32) -> Vec<u8> {
  let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 128]));
  let mut buffer = std::io::Cursor::new(Vec::new());
  image::DynamicImage::ImageRgba8(image)
    .write_to(&mut buffer, image::ImageFormat::Png)
    .unwrap();
  buffer.into_inner()
}

/// A model reply wrapping a valid graph in prose.
pub const WRAPPED_GRAPH_REPLY: &str = r#"Sure! Here is your flowchart:
```json
{"nodes":[{"id":"node_0","type":"default","data":{"label":"Login"},"position":{"x":250,"y":0}},{"id":"node_1","type":"default","data":{"label":"Dashboard"},"position":{"x":250,"y":100}}],"edges":[{"id":"edge_0","source":"node_0","target":"node_1","animated":true}],"metadata":{"source":"prompt","node_count":2}}
```
Let me know if you need changes."#;

/// A model graph carrying keys the crate does not model: edge labels and types,
/// handles, node sizes, extra metadata.
pub const DECORATED_MODEL_GRAPH: &str = r##"{"nodes":[{"id":"node_0","type":"default","data":{"label":"In stock?"},"position":{"x":250,"y":0},"width":180,"style":{"background":"#fbbf24","color":"white","border":"2px solid #f59e0b"}},{"id":"node_1","type":"output","data":{"label":"Ship"},"position":{"x":100,"y":150},"sourcePosition":"right"}],"edges":[{"id":"edge_0","source":"node_0","target":"node_1","animated":true,"label":"Yes","type":"smoothstep","sourceHandle":"a"}],"metadata":{"source":"prompt","node_count":2,"title":"Stock check"}}"##;

/// In-memory log sink for asserting on `tracing` output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
  /// Route debug-level events from this thread here until the guard drops.
  pub fn install(&self) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::DEBUG)
      .with_ansi(false)
      .with_writer(self.clone())
      .finish();
    tracing::subscriber::set_default(subscriber)
  }

  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
  }
}

impl io::Write for CapturedLogs {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
  type Writer = CapturedLogs;

  fn make_writer(&'a self) -> Self::Writer {
    self.clone()
  }
}
