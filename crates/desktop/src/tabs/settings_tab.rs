use iced::widget::{checkbox, column, row, slider, text, Space};
use iced::{Element, Theme};

use crate::app::{scaled, Message};
use crate::settings::Settings;
use crate::theme::muted_color;

pub fn view<'a>(settings: &Settings, camera_running: bool, theme: &Theme) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let muted = muted_color(theme);

    let labelled = |label: &'a str, control: Element<'a, Message>, value: String| {
        row![
            text(label).size(scaled(13.0, fs)).width(scaled(140.0, fs)),
            control,
            text(value).size(scaled(13.0, fs)).width(scaled(60.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center)
    };

    let mut col = column![
        text("Camera").size(scaled(16.0, fs)),
        Space::new().height(8),
        labelled(
            "Device index",
            slider(0..=9, settings.camera_index, Message::CameraIndexChanged).into(),
            settings.camera_index.to_string(),
        ),
        Space::new().height(8),
        labelled(
            "Tick period",
            slider(20..=200, settings.tick_ms, Message::TickPeriodChanged)
                .step(10u32)
                .into(),
            format!("{} ms", settings.tick_ms),
        ),
        Space::new().height(20),
        text("Detection").size(scaled(16.0, fs)),
        Space::new().height(8),
        labelled(
            "Face confidence",
            slider(10..=95, settings.confidence, Message::ConfidenceChanged)
                .step(5u32)
                .into(),
            format!("{}%", settings.confidence),
        ),
        Space::new().height(8),
        labelled(
            "Failure threshold",
            slider(5..=100, settings.failure_threshold, Message::FailureThresholdChanged)
                .step(5u32)
                .into(),
            format!("{} ticks", settings.failure_threshold),
        ),
    ]
    .spacing(0);

    if camera_running {
        col = col.push(Space::new().height(8)).push(
            text("Camera and detection changes apply the next time the camera starts.")
                .size(scaled(12.0, fs))
                .color(muted),
        );
    }

    col.push(Space::new().height(20))
        .push(text("Appearance").size(scaled(16.0, fs)))
        .push(Space::new().height(8))
        .push(
            checkbox(settings.high_contrast)
                .label("High contrast")
                .on_toggle(Message::HighContrastChanged)
                .text_size(scaled(13.0, fs)),
        )
        .push(Space::new().height(8))
        .push(labelled(
            "Font size",
            slider(0.8..=1.5, settings.font_scale, Message::FontScaleChanged)
                .step(0.05)
                .into(),
            format!("{:.0}%", settings.font_scale * 100.0),
        ))
        .into()
}
