pub mod dataset;
pub mod sessions;
pub mod speech;
pub mod tts;
