//! Infrastructure layer: configuration, external service clients, and the
//! alert pipeline built on them.

pub mod air_quality;
pub mod alerts;
pub mod config;
pub mod mailer;
pub mod subscribers;

pub use air_quality::{AirQualityError, AirQualitySource, OpenWeatherClient};
pub use alerts::{
    AlertDispatcher, AlertScheduler, AlertSchedulerHandle, DispatchSummary, Notification,
};
pub use config::{AirQualityConfig, AlertConfig, ConfigError, ScheduleConfig, SmtpConfig};
pub use mailer::{InMemoryMailer, MailError, Mailer, SmtpMailer};
pub use subscribers::{
    CsvSubscriberList, StaticSubscribers, Subscriber, SubscriberBatch, SubscriberError, SubscriberSource,
};
