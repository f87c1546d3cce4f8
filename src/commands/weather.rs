use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use calman_core::weather::{DailyForecast, HourlySample};

use crate::commands::{build_engine, parse_datetime, require_login, require_window};
use crate::render::render_week;
use crate::utils::tui::create_spinner;

const FORECAST_URL: &str = "https://api.weatherapi.com/v1/forecast.json";
const FORECAST_DAYS: u8 = 7;

#[derive(Deserialize)]
struct ForecastResponse {
    forecast: Forecast,
}

#[derive(Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDay>,
}

#[derive(Deserialize)]
struct ForecastDay {
    date: NaiveDate,
    astro: Astro,
    hour: Vec<Hour>,
}

#[derive(Deserialize)]
struct Astro {
    sunrise: String,
    sunset: String,
}

#[derive(Deserialize)]
struct Hour {
    temp_c: f64,
    condition: Condition,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}

pub async fn run(location: String, date: Option<String>) -> Result<()> {
    let date = match date {
        Some(s) => parse_datetime(&s)?,
        None => Utc::now(),
    };

    let key = std::env::var("WEATHERAPI_KEY")
        .context("Set WEATHERAPI_KEY to your weatherapi.com API key")?;

    let spinner = create_spinner(format!("Fetching forecast for {}...", location));
    let days = fetch_forecast(&key, &location).await;
    spinner.finish_and_clear();
    let days = days?;

    let mut engine = build_engine()?;
    require_login(&mut engine).await?;
    require_window(&mut engine, Some(date)).await?;

    engine.set_weather_overlay(Some(&days)).await;

    println!("{}", render_week(engine.events(), date, true));
    Ok(())
}

async fn fetch_forecast(key: &str, location: &str) -> Result<Vec<DailyForecast>> {
    let http = reqwest::Client::new();
    let response = http
        .get(FORECAST_URL)
        .query(&[
            ("key", key),
            ("q", location),
            ("days", &FORECAST_DAYS.to_string()),
        ])
        .send()
        .await
        .context("Failed to reach the forecast service")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Forecast request failed: {} {}", status, body);
    }

    let parsed: ForecastResponse = response
        .json()
        .await
        .context("Failed to parse forecast response")?;

    parsed
        .forecast
        .forecastday
        .into_iter()
        .map(daily_forecast)
        .collect()
}

fn daily_forecast(day: ForecastDay) -> Result<DailyForecast> {
    Ok(DailyForecast {
        date: day.date,
        sunrise: parse_astro_time(&day.astro.sunrise)?,
        sunset: parse_astro_time(&day.astro.sunset)?,
        hourly: day
            .hour
            .into_iter()
            .map(|h| HourlySample {
                temperature: h.temp_c,
                condition: h.condition.text,
            })
            .collect(),
    })
}

/// The forecast service reports astro times as "06:12 AM".
fn parse_astro_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%I:%M %p")
        .with_context(|| format!("Invalid sunrise/sunset time '{}'", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_astro_time() {
        assert_eq!(
            parse_astro_time("06:12 AM").unwrap(),
            NaiveTime::from_hms_opt(6, 12, 0).unwrap()
        );
        assert_eq!(
            parse_astro_time("08:45 PM").unwrap(),
            NaiveTime::from_hms_opt(20, 45, 0).unwrap()
        );
        assert!(parse_astro_time("25:00").is_err());
    }

    #[test]
    fn test_forecast_response_shape() {
        let json = r#"{
            "forecast": {
                "forecastday": [{
                    "date": "2024-06-12",
                    "astro": {"sunrise": "04:45 AM", "sunset": "09:27 PM"},
                    "hour": [
                        {"temp_c": 14.2, "condition": {"text": "Partly cloudy"}},
                        {"temp_c": 13.8, "condition": {"text": "Patchy rain nearby"}}
                    ]
                }]
            }
        }"#;
        let parsed: ForecastResponse = serde_json::from_str(json).unwrap();
        let day = daily_forecast(parsed.forecast.forecastday.into_iter().next().unwrap()).unwrap();
        assert_eq!(day.hourly.len(), 2);
        assert_eq!(day.sunrise, NaiveTime::from_hms_opt(4, 45, 0).unwrap());
    }
}
