pub mod clip;
pub mod constants;
pub mod driver;
pub mod mixer;
pub mod playback;
