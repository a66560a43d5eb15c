//! Image sprites decoded asynchronously and cached by source.
//!
//! Lookup is cache-aside: a miss records the source as pending and asks the
//! decoder to start; the first lookup after a decode finishes sees the
//! result. A failed decode is remembered and never retried.

use std::cell::RefCell;
use std::rc::Rc;

use super::cache::LruCache;

/// A decoded image ready to draw.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub width: f32,
    pub height: f32,
    #[cfg(target_arch = "wasm32")]
    pub image: web_sys::HtmlImageElement,
}

#[cfg(not(target_arch = "wasm32"))]
impl Sprite {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone)]
pub enum SpriteState {
    Pending,
    Ready(Sprite),
    Failed,
}

type Completion = (String, Result<Sprite, String>);

/// Queue a decoder pushes finished decodes into.
#[derive(Clone, Default)]
pub struct CompletionSink(Rc<RefCell<Vec<Completion>>>);

impl CompletionSink {
    pub fn complete(&self, source: String, result: Result<Sprite, String>) {
        self.0.borrow_mut().push((source, result));
    }

    fn take(&self) -> Vec<Completion> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Starts decoding `source` and eventually reports into `sink`.
pub trait SpriteDecoder {
    fn start(&self, source: &str, sink: CompletionSink);
}

pub struct SpriteCache {
    entries: LruCache<String, SpriteState>,
    sink: CompletionSink,
    decoder: Option<Box<dyn SpriteDecoder>>,
}

impl SpriteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            sink: CompletionSink::default(),
            decoder: None,
        }
    }

    pub fn set_decoder(&mut self, decoder: Box<dyn SpriteDecoder>) {
        self.decoder = Some(decoder);
    }

    /// The sprite for `source` if it has finished decoding. Starts a decode
    /// on first sight.
    pub fn lookup(&mut self, source: &str) -> Option<&Sprite> {
        self.drain_completions();
        if !self.entries.contains_key(source) {
            match &self.decoder {
                Some(decoder) => {
                    self.entries.insert(source.to_string(), SpriteState::Pending);
                    decoder.start(source, self.sink.clone());
                }
                None => {
                    tracing::debug!(source, "no sprite decoder installed");
                    self.entries.insert(source.to_string(), SpriteState::Failed);
                }
            }
        }
        match self.entries.get(source) {
            Some(SpriteState::Ready(sprite)) => Some(sprite),
            _ => None,
        }
    }

    pub fn state(&self, source: &str) -> Option<&SpriteState> {
        self.entries.peek(source)
    }

    fn drain_completions(&mut self) {
        for (source, result) in self.sink.take() {
            // Evicted while in flight.
            if !matches!(self.entries.peek(source.as_str()), Some(SpriteState::Pending)) {
                continue;
            }
            let state = match result {
                Ok(sprite) => SpriteState::Ready(sprite),
                Err(error) => {
                    tracing::warn!(source = %source, %error, "sprite decode failed");
                    SpriteState::Failed
                }
            };
            self.entries.insert(source, state);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.entries.set_capacity(capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Decodes through an `HtmlImageElement`; inline SVG markup is wrapped in a
/// data URL.
#[cfg(target_arch = "wasm32")]
pub struct ImageElementDecoder;

#[cfg(target_arch = "wasm32")]
impl SpriteDecoder for ImageElementDecoder {
    fn start(&self, source: &str, sink: CompletionSink) {
        let key = source.to_string();
        let src = image_src(source);
        wasm_bindgen_futures::spawn_local(async move {
            let result = decode_image(&src).await;
            sink.complete(key, result);
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn image_src(source: &str) -> String {
    if source.trim_start().starts_with("<svg") {
        let encoded: String = js_sys::encode_uri_component(source).into();
        format!("data:image/svg+xml;charset=utf-8,{encoded}")
    } else {
        source.to_string()
    }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_precision_loss)]
async fn decode_image(src: &str) -> Result<Sprite, String> {
    let image = web_sys::HtmlImageElement::new().map_err(|e| format!("{e:?}"))?;
    image.set_src(src);
    wasm_bindgen_futures::JsFuture::from(image.decode())
        .await
        .map_err(|e| format!("{e:?}"))?;
    Ok(Sprite {
        width: image.natural_width() as f32,
        height: image.natural_height() as f32,
        image,
    })
}
