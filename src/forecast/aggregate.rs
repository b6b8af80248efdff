use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use indexmap::IndexMap;

use super::models::{DailySummary, ForecastItem};

/// Days kept from the forecast feed
pub const MAX_DAYS: usize = 7;

const NOON_HOUR: i32 = 12;

/// Round half away from zero
pub fn round_to_int(value: f64) -> i32 {
    value.round() as i32
}

fn local_time(dt: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(dt, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// Collapse three-hour samples into one summary per local calendar day.
///
/// Days come out in the order they first appear, capped at [`MAX_DAYS`].
/// The headline condition comes from the sample nearest local noon (first one
/// wins a tie); temperatures are the extremes over every sample of the day.
pub fn aggregate_daily(samples: &[ForecastItem], offset: FixedOffset) -> Vec<DailySummary> {
    let mut days: IndexMap<NaiveDate, Vec<&ForecastItem>> = IndexMap::new();
    for sample in samples {
        let date = local_time(sample.dt, offset).date_naive();
        days.entry(date).or_default().push(sample);
    }

    days.values()
        .take(MAX_DAYS)
        .filter_map(|items| summarize_day(items, offset))
        .collect()
}

fn summarize_day(items: &[&ForecastItem], offset: FixedOffset) -> Option<DailySummary> {
    // min_by_key keeps the first of equal keys
    let midday = *items
        .iter()
        .min_by_key(|item| (local_time(item.dt, offset).hour() as i32 - NOON_HOUR).abs())?;

    let count = items.len() as f64;
    let max_temp = items
        .iter()
        .map(|i| i.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_temp = items
        .iter()
        .map(|i| i.main.temp_min)
        .fold(f64::INFINITY, f64::min);
    let avg_humidity = items.iter().map(|i| i.main.humidity as f64).sum::<f64>() / count;
    let avg_wind = items.iter().map(|i| i.wind.speed).sum::<f64>() / count;
    let max_pop = items
        .iter()
        .filter_map(|i| i.pop)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))));

    let precipitation_probability = max_pop
        .map(|p| round_to_int(p * 100.0).clamp(0, 100) as u8)
        .unwrap_or(0);

    let mut max_temp = round_to_int(max_temp);
    let mut min_temp = round_to_int(min_temp);
    // Vendor data with temp_min above another sample's temp_max would break min <= max
    if min_temp > max_temp {
        std::mem::swap(&mut min_temp, &mut max_temp);
    }

    let headline = local_time(midday.dt, offset);
    let condition = midday.weather.first();

    Some(DailySummary {
        date: headline.format("%b %d").to_string(),
        day_of_week: headline.format("%A").to_string(),
        description: condition
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        condition: condition
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        icon: condition
            .map(|w| w.icon.clone())
            .unwrap_or_else(|| "01d".to_string()),
        max_temp,
        min_temp,
        humidity: round_to_int(avg_humidity).max(0) as u32,
        wind_speed: avg_wind,
        precipitation_probability,
        sarcastic_message: String::new(),
    })
}
