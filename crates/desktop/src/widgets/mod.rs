pub mod emotion_bars;
