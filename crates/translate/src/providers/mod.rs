pub mod azure_pair;
pub mod identity;
pub mod openai_fallback;

pub use azure_pair::AzurePairProvider;
pub use identity::IdentityProvider;
pub use openai_fallback::OpenAiFallbackProvider;
