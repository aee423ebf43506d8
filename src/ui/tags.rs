/// Tag editor: free-text input plus removable chips
use iced::widget::{button, column, row, text, text_input};
use iced::{Alignment, Element};
use iced_aw::Wrap;

use crate::state::tags::TagSet;
use crate::Message;

pub fn view<'a>(tags: &'a TagSet, input: &'a str) -> Element<'a, Message> {
    let field = text_input("Add a tag and press Enter", input)
        .on_input(Message::TagInputChanged)
        .on_submit(Message::TagSubmitted)
        .padding(8);

    let chips: Vec<Element<'a, Message>> = tags
        .iter()
        .map(|tag| -> Element<'a, Message> {
            button(
                row![text(tag).size(14), text("✕").size(12)]
                    .spacing(6)
                    .align_y(Alignment::Center),
            )
            .style(button::secondary)
            .padding([4, 10])
            .on_press(Message::TagRemoved(tag.to_string()))
            .into()
        })
        .collect();

    column![
        field,
        Wrap::with_elements(chips).spacing(6.0).line_spacing(6.0),
    ]
    .spacing(8)
    .into()
}
