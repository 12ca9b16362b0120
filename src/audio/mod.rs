pub mod file;
pub mod source;

pub use file::FileSource;
pub use source::{AudioFrame, AudioSource, AudioStream, EnergySnapshot};
