#[cfg(test)]
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            pub(crate) fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

#[cfg(test)]
pub(crate) use impl_with_gemini_base_url;

pub mod chat;
pub mod client;
pub mod types;
pub mod video;

pub use chat::GeminiChatClient;
pub use video::GeminiVideoClient;
