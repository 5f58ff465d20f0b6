//! TTS 后端适配器

mod fake_backend;
mod volc_client;

pub use fake_backend::{FakeBackend, FakeBackendConfig};
pub use volc_client::{VolcTtsClient, VolcTtsConfig};
