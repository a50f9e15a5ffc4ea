use iced::widget::{column, text, Space};
use iced::Element;

use crate::app::{scaled, Message};

pub fn view(fs: f32) -> Element<'static, Message> {
    let version = env!("CARGO_PKG_VERSION");

    column![
        text("MoodMirror").size(scaled(22.0, fs)),
        Space::new().height(4),
        text(format!("Version {version}")).size(scaled(13.0, fs)),
        Space::new().height(12),
        text(
            "Reads your webcam, finds the most prominent face in each frame \
             and estimates which of seven emotions it shows: angry, disgust, \
             fear, happy, sad, surprise or neutral."
        )
        .size(scaled(13.0, fs)),
        Space::new().height(20),
        text("Everything stays on your device").size(scaled(16.0, fs)),
        Space::new().height(8),
        text(
            "Frames are analyzed locally and never uploaded. The only network \
             activity is a one-time download of the face and emotion models \
             the first time the camera starts."
        )
        .size(scaled(13.0, fs)),
    ]
    .spacing(0)
    .into()
}
