/// Profile screen: the user's recent fits
use chrono::DateTime;
use iced::widget::{button, column, container, scrollable, text, Column};
use iced::{Element, Length};

use crate::state::data::FitRecord;
use crate::Message;

pub fn view(fits: &[FitRecord]) -> Element<'_, Message> {
    let mut list: Column<'_, Message> = column![].spacing(12);

    if fits.is_empty() {
        list = list.push(text("No fits yet.").size(16));
    }

    for fit in fits {
        let when = DateTime::from_timestamp(fit.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let tags = fit
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        let image = if fit.image.is_empty() {
            "no image".to_string()
        } else {
            fit.image.clone()
        };

        list = list.push(
            container(
                column![
                    text(fit.description.as_str()).size(16),
                    text(tags).size(14),
                    text(format!("{} · {}", when, image)).size(12),
                ]
                .spacing(4),
            )
            .padding(12)
            .width(Length::Fill)
            .style(container::rounded_box),
        );
    }

    column![
        text("Your Fits").size(28),
        scrollable(list).height(Length::Fill),
        button(text("Create another")).on_press(Message::Navigate(crate::collab::route::Route::Create)),
    ]
    .spacing(20)
    .max_width(640)
    .into()
}
