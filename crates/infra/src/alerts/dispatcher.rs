use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{Instrument, error, info, info_span, warn};

use smartair_core::{AirQualityIndex, RunId};

use crate::air_quality::{AirQualitySource, OpenWeatherClient};
use crate::alerts::Notification;
use crate::config::AlertConfig;
use crate::mailer::{MailError, Mailer, SmtpMailer};
use crate::subscribers::{CsvSubscriberList, SubscriberSource};

/// Outcome of one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub run_id: RunId,
    /// Subscriber rows processed.
    pub processed: usize,
    /// Notifications accepted by the mail relay.
    pub sent: usize,
    /// Rows that used the fallback AQI.
    pub fallbacks: usize,
    /// Malformed list rows that were skipped.
    pub skipped: usize,
}

/// Sends the air-quality alert to every subscriber, one at a time.
///
/// A run never fails as a whole: lookup failures fall back to
/// [`AirQualityIndex::FALLBACK`], send failures and malformed list rows are
/// logged and skipped, and an unreadable subscriber list yields an empty run.
#[derive(Clone)]
pub struct AlertDispatcher {
    subscribers: Arc<dyn SubscriberSource>,
    air_quality: Arc<dyn AirQualitySource>,
    mailer: Arc<dyn Mailer>,
}

impl AlertDispatcher {
    pub fn new(
        subscribers: Arc<dyn SubscriberSource>,
        air_quality: Arc<dyn AirQualitySource>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            subscribers,
            air_quality,
            mailer,
        }
    }

    /// Wire the production collaborators: CSV list, OpenWeather, SMTP.
    pub fn from_config(config: &AlertConfig) -> Result<Self, MailError> {
        Ok(Self::new(
            Arc::new(CsvSubscriberList::new(config.subscribers_csv.clone())),
            Arc::new(OpenWeatherClient::new(&config.air_quality)),
            Arc::new(SmtpMailer::new(&config.smtp)?),
        ))
    }

    pub async fn dispatch(&self) -> DispatchSummary {
        let run_id = RunId::new();
        self.run(run_id)
            .instrument(info_span!("alert_dispatch", run_id = %run_id))
            .await
    }

    async fn run(&self, run_id: RunId) -> DispatchSummary {
        let mut summary = DispatchSummary {
            run_id,
            processed: 0,
            sent: 0,
            fallbacks: 0,
            skipped: 0,
        };

        info!("starting alert dispatch");

        // CSV reads block; keep them off the runtime workers.
        let source = Arc::clone(&self.subscribers);
        let batch = match tokio::task::spawn_blocking(move || source.load()).await {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                error!(error = %e, "failed to load subscribers; nothing sent");
                return summary;
            }
            Err(e) => {
                error!(error = %e, "subscriber load task failed; nothing sent");
                return summary;
            }
        };
        summary.skipped = batch.skipped;
        if batch.skipped > 0 {
            warn!(skipped = batch.skipped, "malformed subscriber rows skipped");
        }

        for subscriber in &batch.subscribers {
            summary.processed += 1;
            info!(city = %subscriber.city, email = %subscriber.email, "processing subscriber");

            let aqi = match self.air_quality.current_aqi(&subscriber.city).await {
                Ok(aqi) => aqi,
                Err(e) => {
                    warn!(
                        city = %subscriber.city,
                        error = %e,
                        fallback = AirQualityIndex::FALLBACK.value(),
                        "AQI lookup failed; using fallback"
                    );
                    summary.fallbacks += 1;
                    AirQualityIndex::FALLBACK
                }
            };

            let notification = Notification::render(subscriber, aqi, Local::now());

            match self.mailer.send(&notification).await {
                Ok(()) => {
                    summary.sent += 1;
                    info!(email = %subscriber.email, aqi = aqi.value(), "alert sent");
                }
                Err(e) => {
                    warn!(email = %subscriber.email, error = %e, "failed to send alert");
                }
            }
        }

        info!(
            processed = summary.processed,
            sent = summary.sent,
            fallbacks = summary.fallbacks,
            skipped = summary.skipped,
            "alert dispatch completed"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use smartair_core::AqiCategory;

    use crate::air_quality::AirQualityError;
    use crate::mailer::InMemoryMailer;
    use crate::subscribers::{
        CsvSubscriberList, StaticSubscribers, Subscriber, SubscriberBatch, SubscriberError,
    };

    /// Fixed readings per city; unknown cities fail the lookup.
    struct FixedReadings(HashMap<&'static str, i64>);

    #[async_trait]
    impl AirQualitySource for FixedReadings {
        async fn current_aqi(&self, city: &str) -> Result<AirQualityIndex, AirQualityError> {
            self.0
                .get(city)
                .map(|v| AirQualityIndex::new(*v))
                .ok_or_else(|| AirQualityError::CityNotFound(city.to_string()))
        }
    }

    struct BrokenList;

    impl SubscriberSource for BrokenList {
        fn load(&self) -> Result<SubscriberBatch, SubscriberError> {
            Err(SubscriberError::Interrupted(csv::Error::from(std::io::Error::other("disk gone"))))
        }
    }

    fn readings() -> Arc<FixedReadings> {
        Arc::new(FixedReadings(HashMap::from([("delhi", 4), ("mumbai", 1)])))
    }

    #[tokio::test]
    async fn sends_one_alert_per_row_in_order() {
        let mailer = Arc::new(InMemoryMailer::new());
        let dispatcher = AlertDispatcher::new(
            Arc::new(StaticSubscribers(vec![
                Subscriber::new("delhi", "a@example.com"),
                Subscriber::new("mumbai", "b@example.com"),
            ])),
            readings(),
            mailer.clone(),
        );

        let summary = dispatcher.dispatch().await;
        assert_eq!((summary.processed, summary.sent, summary.fallbacks), (2, 2, 0));

        let sent = mailer.sent();
        assert_eq!(sent[0].to, "a@example.com");
        assert_eq!((sent[0].today, sent[0].tomorrow), (AqiCategory::VeryPoor, AqiCategory::Severe));
        assert_eq!(sent[1].to, "b@example.com");
        assert_eq!((sent[1].today, sent[1].tomorrow), (AqiCategory::Good, AqiCategory::Moderate));
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_poor() {
        let mailer = Arc::new(InMemoryMailer::new());
        let dispatcher = AlertDispatcher::new(
            Arc::new(StaticSubscribers(vec![
                Subscriber::new("delhi", "a@example.com"),
                Subscriber::new("atlantis", "b@example.com"),
                Subscriber::new("mumbai", "c@example.com"),
            ])),
            readings(),
            mailer.clone(),
        );

        let summary = dispatcher.dispatch().await;
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.fallbacks, 1);

        let failed = &mailer.sent()[1];
        assert_eq!(failed.city, "atlantis");
        assert_eq!(failed.today, AqiCategory::Poor);
        assert_eq!(failed.tomorrow, AqiCategory::VeryPoor);
    }

    #[tokio::test]
    async fn send_failure_does_not_stop_the_run() {
        let mailer = Arc::new(InMemoryMailer::new().rejecting("bounce@example.com"));
        let dispatcher = AlertDispatcher::new(
            Arc::new(StaticSubscribers(vec![
                Subscriber::new("delhi", "bounce@example.com"),
                Subscriber::new("delhi", "ok@example.com"),
            ])),
            readings(),
            mailer.clone(),
        );

        let summary = dispatcher.dispatch().await;
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(mailer.sent()[0].to, "ok@example.com");
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_not_fatal() {
        let path = std::env::temp_dir().join(format!("smartair-mixed-{}.csv", std::process::id()));
        std::fs::write(&path, "city,email\ndelhi,a@example.com\nmumbai\nmumbai,c@example.com\n").unwrap();

        let mailer = Arc::new(InMemoryMailer::new());
        let dispatcher =
            AlertDispatcher::new(Arc::new(CsvSubscriberList::new(&path)), readings(), mailer.clone());

        let summary = dispatcher.dispatch().await;
        let _ = std::fs::remove_file(&path);

        assert_eq!((summary.processed, summary.sent, summary.skipped), (2, 2, 1));
        let to: Vec<_> = mailer.sent().iter().map(|n| n.to.clone()).collect();
        assert_eq!(to, vec!["a@example.com", "c@example.com"]);
    }

    #[tokio::test]
    async fn missing_list_file_yields_empty_run() {
        let mailer = Arc::new(InMemoryMailer::new());
        let dispatcher = AlertDispatcher::new(
            Arc::new(CsvSubscriberList::new("/definitely/not/here.csv")),
            readings(),
            mailer.clone(),
        );

        let summary = dispatcher.dispatch().await;
        assert_eq!((summary.processed, summary.sent, summary.skipped), (0, 0, 0));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn unreadable_list_yields_empty_run() {
        let mailer = Arc::new(InMemoryMailer::new());
        let dispatcher = AlertDispatcher::new(Arc::new(BrokenList), readings(), mailer.clone());

        let summary = dispatcher.dispatch().await;
        assert_eq!((summary.processed, summary.sent), (0, 0));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn each_run_gets_a_fresh_id() {
        let dispatcher = AlertDispatcher::new(
            Arc::new(StaticSubscribers::default()),
            readings(),
            Arc::new(InMemoryMailer::new()),
        );

        let a = dispatcher.dispatch().await;
        let b = dispatcher.dispatch().await;
        assert_ne!(a.run_id, b.run_id);
    }
}
