pub mod elevenlabs;
pub mod silent;

pub use elevenlabs::ElevenLabsProvider;
pub use silent::SilentSynthesizer;
