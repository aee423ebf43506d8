/// View layer
///
/// Pure functions from state to iced widgets:
/// - the fit form with upload block and tag chips (form.rs, tags.rs)
/// - the profile list (profile.rs)
/// - the result view and its entrance animation (result.rs, reveal.rs)
/// - the toast stack (toasts.rs)

pub mod form;
pub mod media;
pub mod profile;
pub mod result;
pub mod reveal;
pub mod tags;
pub mod toasts;
