/// "Create a New Fit" form
use iced::widget::{button, column, container, image, row, text, text_editor, Column};
use iced::{Alignment, Color, Element, Length};

use super::{media, tags};
use crate::state::composer::{FitComposer, ImagePolicy};
use crate::state::upload::{UploadPhase, UploadSession};
use crate::Message;

/// Uploaded preview edge in logical pixels
const PREVIEW_SIZE: f32 = 200.0;

pub fn view<'a>(
    session: &'a UploadSession,
    composer: &'a FitComposer,
    description: &'a text_editor::Content,
    tag_input: &'a str,
) -> Element<'a, Message> {
    let header = column![
        text("Create a New Fit").size(28),
        text("Show off your outfits to the world!").size(16),
    ]
    .spacing(4);

    let mut upload = column![text("Upload Image").size(16), upload_block(session)].spacing(8);
    if let Some(hint) = image_hint(composer.policy(), session.uploaded_url().is_some()) {
        upload = upload.push(text(hint).size(14).color(Color::from_rgb(0.9, 0.75, 0.35)));
    }

    let description = column![
        text("Description").size(16),
        text_editor(description)
            .placeholder("Describe your fit...")
            .on_action(Message::DescriptionEdited)
            .height(Length::Fixed(100.0)),
    ]
    .spacing(8);

    let tag_block = column![
        text("Tags").size(16),
        tags::view(composer.tags(), tag_input)
    ]
    .spacing(8);

    let submit = if composer.is_submitting() {
        button(text("Creating...")).width(Length::Fill)
    } else {
        button(text("Create Fit"))
            .width(Length::Fill)
            .on_press(Message::Submit)
    };

    column![header, upload, description, tag_block, submit.padding(10)]
        .spacing(20)
        .max_width(640)
        .into()
}

/// Reminder shown under the upload block while a required image is missing
fn image_hint(policy: ImagePolicy, has_image: bool) -> Option<&'static str> {
    match policy {
        ImagePolicy::RequireImage if !has_image => Some("Upload an image before creating your fit"),
        _ => None,
    }
}

fn upload_block(session: &UploadSession) -> Element<'_, Message> {
    match session.phase() {
        UploadPhase::Uploaded { url, .. } => {
            let preview: Element<'_, Message> = match media::local_path(url) {
                Some(path) => image(image::Handle::from_path(path))
                    .width(Length::Fixed(PREVIEW_SIZE))
                    .height(Length::Fixed(PREVIEW_SIZE))
                    .into(),
                None => text(url.as_str()).size(14).into(),
            };
            row![
                preview,
                button(text("✕"))
                    .style(button::danger)
                    .on_press(Message::ClearUpload),
            ]
            .spacing(8)
            .align_y(Alignment::Start)
            .into()
        }
        phase => {
            let mut block: Column<'_, Message> = column![button(text("Select file"))
                .style(button::secondary)
                .width(Length::Fill)
                .on_press(Message::PickFile)]
            .spacing(8);

            if let Some(file) = session.file() {
                let uploading = matches!(phase, UploadPhase::Uploading { .. });
                let label = if uploading { "Uploading..." } else { "Upload" };
                let mut upload = button(text(label));
                if !uploading {
                    upload = upload.on_press(Message::BeginUpload);
                }
                block = block.push(text(file.name.as_str()).size(14)).push(upload);
            }

            if let Some(reason) = session.failure_reason() {
                block = block.push(
                    text(format!("Upload failed: {}", reason))
                        .size(14)
                        .color(Color::from_rgb(0.95, 0.45, 0.4)),
                );
            }

            container(block).width(Length::Fill).into()
        }
    }
}
