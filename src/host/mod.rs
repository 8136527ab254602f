pub(crate) mod headless;
#[cfg(feature = "window")]
pub(crate) mod window;
