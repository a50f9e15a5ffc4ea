use iced::widget::{column, progress_bar, row, text};
use iced::{Element, Length};

use moodmirror_core::emotion::domain::emotion::Emotion;

use crate::app::{scaled, Message};

/// One labelled progress bar per emotion, 0 to 100.
pub fn emotion_bars<'a>(values: [(Emotion, u8); 7], fs: f32) -> Element<'a, Message> {
    let rows = values.into_iter().map(|(emotion, pct)| {
        row![
            text(emotion.label())
                .size(scaled(13.0, fs))
                .width(scaled(72.0, fs)),
            progress_bar(0.0..=100.0, pct as f32),
            text(format!("{pct:>3}%"))
                .size(scaled(13.0, fs))
                .width(scaled(44.0, fs)),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center)
        .into()
    });

    column(rows).spacing(6).width(Length::Fill).into()
}
