use iced::border::Border;
use iced::widget::{button, column, container, image, row, text, Space};
use iced::{Element, Length, Theme};

use crate::app::{scaled, Message};
use crate::camera_view::{CameraState, CameraView};
use crate::theme::{danger_color, muted_color, surface_color};
use crate::widgets::emotion_bars::emotion_bars;

pub fn view<'a>(fs: f32, camera: &'a CameraView, theme: &Theme) -> Element<'a, Message> {
    let headline_color = if camera.is_error() {
        danger_color(theme)
    } else {
        theme.palette().text
    };

    column![
        video_surface(fs, camera, theme),
        Space::new().height(12),
        text(camera.headline())
            .size(scaled(18.0, fs))
            .color(headline_color),
        Space::new().height(10),
        emotion_bars(camera.bars(), fs),
        Space::new().height(14),
        controls(fs, camera),
    ]
    .spacing(0)
    .into()
}

fn video_surface<'a>(fs: f32, camera: &'a CameraView, theme: &Theme) -> Element<'a, Message> {
    let surface = surface_color(theme);
    let content: Element<'a, Message> = match &camera.image {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => {
            let hint = match camera.state {
                CameraState::Starting => "Opening camera...",
                _ => "Camera is off",
            };
            text(hint)
                .size(scaled(14.0, fs))
                .color(muted_color(theme))
                .into()
        }
    };

    container(content)
        .width(Length::Fill)
        .height(scaled(300.0, fs))
        .center_x(Length::Fill)
        .center_y(scaled(300.0, fs))
        .style(move |_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(surface)),
            border: Border {
                radius: 6.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

fn controls<'a>(fs: f32, camera: &'a CameraView) -> Element<'a, Message> {
    let toggle = button(text(camera.toggle_label()).size(scaled(14.0, fs)))
        .on_press_maybe((camera.state != CameraState::Starting).then_some(Message::ToggleCamera))
        .style(button::primary)
        .padding([8, 20]);

    let snapshot = button(text("Save Snapshot").size(scaled(14.0, fs)))
        .on_press_maybe(camera.last.is_some().then_some(Message::SaveSnapshot))
        .style(button::secondary)
        .padding([8, 20]);

    let mut controls = row![toggle, snapshot]
        .spacing(12)
        .align_y(iced::Alignment::Center);
    if let Some(name) = &camera.camera_name {
        controls = controls.push(text(name.as_str()).size(scaled(12.0, fs)));
    }
    controls.into()
}
