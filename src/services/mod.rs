pub mod captcha;
pub mod challenge;
pub mod checkpoint;
pub mod consent;
pub mod export;
pub mod extractor;
pub mod locator;
pub mod widget;

pub use captcha::CaptchaResolver;
pub use checkpoint::CheckpointStore;
pub use widget::LivePaaWidget;
