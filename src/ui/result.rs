/// Result view: the recommended size for a fit photo
///
/// `layout` is the pure part: which blocks a given `SizeResult` produces.
/// `view` turns that layout into widgets, scaling the size label by the
/// current `SizeReveal` value.
use iced::widget::{column, container, image, text};
use iced::{Alignment, Element, Length};

use super::media;
use crate::state::data::SizeResult;
use crate::ui::reveal::SizeReveal;
use crate::Message;

pub const TITLE: &str = "Your Fit Result";
pub const CAPTION: &str = "This is your recommended size based on your measurements and photo.";
/// Fixed preview edge in logical pixels
pub const PREVIEW_SIZE: f32 = 300.0;
/// Size label font size once fully revealed
const SIZE_FONT: f32 = 60.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLayout<'a> {
    pub title: &'static str,
    pub image: Option<&'a str>,
    pub size: Option<&'a str>,
    pub caption: &'static str,
}

/// Blocks to render for a result; absent fields suppress their block
pub fn layout(result: &SizeResult) -> ResultLayout<'_> {
    ResultLayout {
        title: TITLE,
        image: result.image(),
        size: result.size(),
        caption: CAPTION,
    }
}

pub fn view<'a>(result: &'a SizeResult, reveal: &SizeReveal) -> Element<'a, Message> {
    let blocks = layout(result);
    let mut content = column![text(blocks.title).size(28)]
        .spacing(24)
        .align_x(Alignment::Center);

    if let Some(src) = blocks.image {
        let preview: Element<'a, Message> = match media::local_path(src) {
            Some(path) => image(image::Handle::from_path(path))
                .width(Length::Fixed(PREVIEW_SIZE))
                .height(Length::Fixed(PREVIEW_SIZE))
                .into(),
            None => container(text(format!("Preview unavailable: {}", src)).size(14))
                .width(Length::Fixed(PREVIEW_SIZE))
                .height(Length::Fixed(PREVIEW_SIZE))
                .center_x(Length::Fixed(PREVIEW_SIZE))
                .center_y(Length::Fixed(PREVIEW_SIZE))
                .into(),
        };
        content = content.push(preview);
    }

    if let Some(size) = blocks.size {
        let font = (SIZE_FONT * reveal.scale()).max(1.0);
        // Reserve the settled height so the caption doesn't jump while scaling
        content = content.push(
            container(text(size).size(font))
                .height(Length::Fixed(SIZE_FONT * 1.4))
                .center_y(Length::Fixed(SIZE_FONT * 1.4)),
        );
    }

    content.push(text(blocks.caption).size(18)).into()
}
