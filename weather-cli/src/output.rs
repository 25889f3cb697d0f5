use chrono::Local;
use weather_core::{PersistedRecord, QueryFailure, WeatherReport, WeatherResult};

pub fn results_json(results: &[WeatherResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({ "weather_data": results }))
}

pub fn format_result(result: &WeatherResult) -> String {
    match result {
        WeatherResult::Success(report) => format_report(report),
        WeatherResult::Failure(failure) => format_failure(failure),
    }
}

fn place(city: &str, state: Option<&str>, country: Option<&str>) -> String {
    [Some(city), state, country].into_iter().flatten().collect::<Vec<_>>().join(", ")
}

fn format_report(report: &WeatherReport) -> String {
    format!(
        "{} ({}): {} | {:.1} °C / {:.1} °F | humidity {}% | wind {:.1} m/s | comfort {:.2}",
        place(&report.city_name, report.state_name.as_deref(), report.country_code.as_deref()),
        report.original_input,
        report.weather_description,
        report.temperature_celsius,
        report.temperature_fahrenheit,
        report.humidity_pct,
        report.wind_speed,
        report.comfort_index,
    )
}

fn format_failure(failure: &QueryFailure) -> String {
    match &failure.city_name {
        Some(city) => format!(
            "{} ({}): error: {}",
            place(city, failure.state_name.as_deref(), failure.country_code.as_deref()),
            failure.original_input,
            failure.error,
        ),
        None => format!("{}: error: {}", failure.original_input, failure.error),
    }
}

pub fn format_record(record: &PersistedRecord) -> String {
    format!(
        "{} | {} | {} | {:.1} °C / {:.1} °F | humidity {}% | wind {:.1} m/s | comfort {:.2}",
        record.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        record.city_name,
        record.weather_description,
        record.temperature_celsius,
        record.temperature_fahrenheit,
        record.humidity_pct,
        record.wind_speed,
        record.comfort_index,
    )
}
