// Adapters layer: concrete HTTP implementations of the domain ports.

pub mod gemini;
pub mod http;

pub use gemini::{GeminiClient, GeminiSettings};
pub use http::{IpifyResolver, WebhookNotifier};
