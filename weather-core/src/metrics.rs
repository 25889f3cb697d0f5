//! Derived metrics: temperature conversion and the comfort index.

const KELVIN_OFFSET: f64 = 273.15;

const COMFORT_TEMP_MAX_C: f64 = 40.0;
const COMFORT_HUMIDITY_MAX: f64 = 100.0;
const COMFORT_WIND_MAX: f64 = 10.0;
const TEMP_WEIGHT: f64 = 0.5;
const HUMIDITY_WEIGHT: f64 = 0.3;
const WIND_WEIGHT: f64 = 0.2;

/// Convert Kelvin to `(celsius, fahrenheit)`.
pub fn kelvin_to_celsius_fahrenheit(kelvin: Option<f64>) -> (Option<f64>, Option<f64>) {
    match kelvin {
        Some(k) => {
            let celsius = k - KELVIN_OFFSET;
            let fahrenheit = celsius * 9.0 / 5.0 + 32.0;
            (Some(celsius), Some(fahrenheit))
        }
        None => (None, None),
    }
}

/// Heuristic comfort score in `[0, 1]`; higher reads as more comfortable.
///
/// Temperature is clamped to 0..=40 °C, humidity to 0..=100 % and wind to
/// 0..=10 (provider units). Humidity and wind are inverted, then the terms
/// are weighted 0.5 / 0.3 / 0.2.
/// This is not a meteorological index.
pub fn comfort_index(
    temp_celsius: Option<f64>,
    humidity_pct: Option<f64>,
    wind_speed: Option<f64>,
) -> Option<f64> {
    let (temp, humidity, wind) = (temp_celsius?, humidity_pct?, wind_speed?);

    let normalized_temp = temp.clamp(0.0, COMFORT_TEMP_MAX_C) / COMFORT_TEMP_MAX_C;
    let normalized_humidity =
        1.0 - humidity.clamp(0.0, COMFORT_HUMIDITY_MAX) / COMFORT_HUMIDITY_MAX;
    let normalized_wind = 1.0 - wind.clamp(0.0, COMFORT_WIND_MAX) / COMFORT_WIND_MAX;

    Some(
        TEMP_WEIGHT * normalized_temp
            + HUMIDITY_WEIGHT * normalized_humidity
            + WIND_WEIGHT * normalized_wind,
    )
}
