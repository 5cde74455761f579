//! Configuration management for the arena service

pub mod app;

pub use app::{
    AppConfig, MatchmakingSettings, MediaSettings, RatingSettings, ServiceSettings,
};
