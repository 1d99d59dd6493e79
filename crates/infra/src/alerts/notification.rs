use chrono::{DateTime, Local};
use serde::Serialize;

use smartair_core::{AirQualityIndex, AqiCategory};

use crate::subscribers::Subscriber;

const PRECAUTIONS: [&str; 5] = [
    "Wear an N95 mask outdoors",
    "Avoid long outdoor exposure",
    "Use air purifiers indoors",
    "Keep windows closed during peak pollution hours",
    "Stay hydrated and monitor breathing",
];

/// A rendered alert email for one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub city: String,
    pub subject: String,
    pub html_body: String,
    pub today: AqiCategory,
    pub tomorrow: AqiCategory,
}

impl Notification {
    /// Render the alert for `subscriber` given today's index.
    ///
    /// Tomorrow's outlook is derived with [`AirQualityIndex::tomorrow`].
    pub fn render(subscriber: &Subscriber, today: AirQualityIndex, sent_at: DateTime<Local>) -> Self {
        let tomorrow = today.tomorrow().category();
        let today = today.category();
        let city = subscriber.city.to_uppercase();

        let precautions: String = PRECAUTIONS
            .iter()
            .map(|p| format!("      <li>{p}</li>\n"))
            .collect();

        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"></head>
<body>
  <div class="container">
    <div class="header">
      <div>SmartAir Monitoring System</div>
      <div>{time}</div>
    </div>
    <div class="content">
      <div class="title">Air Quality Alert for {city}</div>
      <div class="aqi-box">
        <b>Today's AQI:</b> {today_label} ({today_range})<br>
        <b>Tomorrow's Forecast:</b> {tomorrow_label} ({tomorrow_range})
      </div>
      <div class="precautions-title">Recommended Precautions:</div>
      <ul>
{precautions}      </ul>
    </div>
    <div class="footer">
      Stay safe &amp; monitor air quality regularly.<br>
      <b>SmartAir Monitoring System</b>
    </div>
  </div>
</body>
</html>
"#,
            time = sent_at.format("%I:%M %p"),
            today_label = today.label(),
            today_range = today.range(),
            tomorrow_label = tomorrow.label(),
            tomorrow_range = tomorrow.range(),
        );

        Self {
            to: subscriber.email.clone(),
            city: subscriber.city.clone(),
            subject: format!("AQI Alert for {city}"),
            html_body,
            today,
            tomorrow,
        }
    }
}
