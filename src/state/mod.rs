/// State management module
///
/// This module handles all application state, including:
/// - The upload lifecycle of the selected image (upload.rs)
/// - Tags, description and the submit gate (composer.rs, tags.rs)
/// - Shared data structures (data.rs)
/// - The local fit catalog (library.rs)

pub mod composer;
pub mod data;
pub mod library;
pub mod tags;
pub mod upload;
