/// Toast stack rendered above the current screen
use iced::widget::{column, container, text};
use iced::{Color, Element, Length};

use crate::collab::toast::{Toast, ToastKind};
use crate::Message;

pub fn view<'a>(toasts: Vec<Toast>) -> Element<'a, Message> {
    let items = toasts.into_iter().map(|toast| -> Element<'a, Message> {
        let (icon, color) = match toast.kind {
            ToastKind::Pending => ("⏳", Color::from_rgb(0.85, 0.85, 0.85)),
            ToastKind::Success => ("✅", Color::from_rgb(0.45, 0.85, 0.5)),
            ToastKind::Failure => ("⚠️", Color::from_rgb(0.95, 0.45, 0.4)),
        };
        container(text(format!("{} {}", icon, toast.message)).size(14).color(color))
            .padding([6, 12])
            .style(container::rounded_box)
            .into()
    });

    container(column(items).spacing(6))
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}
