//! Temperature and distance conversion for display.

pub use skycast_core::TemperatureUnit;

const KELVIN_OFFSET: f64 = 273.15;

/// Round half-up toward positive infinity (so -2.5 becomes -2).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Convert a Kelvin reading to whole degrees in `unit`.
pub fn convert_temperature(kelvin: f64, unit: TemperatureUnit) -> i64 {
    let celsius = kelvin - KELVIN_OFFSET;
    match unit {
        TemperatureUnit::Celsius => round_half_up(celsius),
        TemperatureUnit::Fahrenheit => round_half_up(celsius * 9.0 / 5.0 + 32.0),
    }
}

/// Convert a metric API reading (Celsius) to whole degrees in `unit`.
pub fn display_temperature(celsius: f64, unit: TemperatureUnit) -> i64 {
    convert_temperature(celsius + KELVIN_OFFSET, unit)
}

/// Metres to kilometres with one decimal, e.g. `10000` -> `"10.0"`.
pub fn visibility_km(metres: u32) -> String {
    format!("{:.1}", f64::from(metres) / 1000.0)
}

/// Round to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freezing_point() {
        assert_eq!(convert_temperature(273.15, TemperatureUnit::Celsius), 0);
        assert_eq!(convert_temperature(273.15, TemperatureUnit::Fahrenheit), 32);
    }

    #[test]
    fn test_boiling_point() {
        assert_eq!(convert_temperature(373.15, TemperatureUnit::Celsius), 100);
        assert_eq!(convert_temperature(373.15, TemperatureUnit::Fahrenheit), 212);
    }

    #[test]
    fn test_minus_forty_matches_in_both_units() {
        assert_eq!(display_temperature(-40.0, TemperatureUnit::Celsius), -40);
        assert_eq!(display_temperature(-40.0, TemperatureUnit::Fahrenheit), -40);
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(display_temperature(21.6, TemperatureUnit::Celsius), 22);
        assert_eq!(display_temperature(21.4, TemperatureUnit::Celsius), 21);
    }

    #[test]
    fn test_display_fahrenheit() {
        // 21.6 C = 70.88 F
        assert_eq!(display_temperature(21.6, TemperatureUnit::Fahrenheit), 71);
    }

    #[test]
    fn test_visibility_km() {
        assert_eq!(visibility_km(10000), "10.0");
        assert_eq!(visibility_km(8400), "8.4");
        assert_eq!(visibility_km(0), "0.0");
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(7.26), 7.3);
        assert_eq!(round_one_decimal(2.0), 2.0);
    }
}
