//! Human-friendly rendering of entity states.

use here_weather_core::{
    Config, Coordinator, Sensor, UnitSystem, WeatherEntity, WeatherProductType,
    units::{
        DEGREE, LENGTH_CENTIMETERS, LENGTH_KILOMETERS, PRESSURE_MBAR, SPEED_KILOMETERS_PER_HOUR,
        display_unit,
    },
};

const UNAVAILABLE: &str = "unavailable";

fn with_unit(value: Option<String>, unit: Option<&str>) -> String {
    match (value, unit) {
        (Some(value), Some(unit)) => format!("{value} {unit}"),
        (Some(value), None) => value,
        (None, _) => UNAVAILABLE.to_string(),
    }
}

fn number(value: Option<f64>, unit: Option<&str>) -> String {
    with_unit(value.map(|v| format!("{v}")), unit)
}

pub fn print_entries(config: &Config) {
    if config.entries.is_empty() {
        println!("No locations configured. Run `here-weather configure`.");
        return;
    }

    for (id, entry) in &config.entries {
        let marker = if config.default_entry.as_deref() == Some(id.as_str()) { "*" } else { " " };
        println!(
            "{marker} {id}  {}  language={}  every {}s",
            entry.data.name,
            entry.options.language.code(),
            entry.options.scan_interval
        );
    }
}

pub fn print_sensors(sensors: &[Sensor], coordinator: &Coordinator) {
    let width = sensors.iter().map(|s| s.name.len()).max().unwrap_or(0);

    for sensor in sensors {
        println!(
            "{:<width$}  {}",
            sensor.name,
            with_unit(sensor.native_value(coordinator), sensor.unit_of_measurement)
        );
    }
}

pub fn print_sensor_line(product: WeatherProductType, sensors: &[Sensor], coordinator: &Coordinator) {
    let states: Vec<String> = sensors
        .iter()
        .filter_map(|sensor| {
            sensor
                .native_value(coordinator)
                .map(|value| format!("{}={value}", sensor.attribute.name))
        })
        .collect();

    if states.is_empty() {
        println!("[{product}] {UNAVAILABLE}");
    } else {
        println!("[{product}] {}", states.join(" "));
    }
}

pub fn print_weather_line(weather: &WeatherEntity, coordinator: &Coordinator, units: UnitSystem) {
    let metric = units.is_metric();
    println!(
        "[{}] {}  {}  wind {}",
        weather.product,
        weather.condition(coordinator).unwrap_or(UNAVAILABLE),
        number(weather.temperature(coordinator), display_unit(metric, Some(weather.temperature_unit))),
        number(weather.wind_speed(coordinator), display_unit(metric, Some(SPEED_KILOMETERS_PER_HOUR))),
    );
}

pub fn print_weather(weather: &WeatherEntity, coordinator: &Coordinator, units: UnitSystem) {
    let metric = units.is_metric();
    let temperature_unit = display_unit(metric, Some(weather.temperature_unit));
    let pressure_unit = display_unit(metric, Some(PRESSURE_MBAR));
    let speed_unit = display_unit(metric, Some(SPEED_KILOMETERS_PER_HOUR));
    let length_unit = display_unit(metric, Some(LENGTH_CENTIMETERS));

    println!("{}", weather.name);
    println!("  condition    {}", weather.condition(coordinator).unwrap_or(UNAVAILABLE));
    println!("  temperature  {}", number(weather.temperature(coordinator), temperature_unit));
    println!("  pressure     {}", number(weather.pressure(coordinator), pressure_unit));
    println!("  wind speed   {}", number(weather.wind_speed(coordinator), speed_unit));
    println!(
        "  wind bearing {}",
        with_unit(weather.wind_bearing(coordinator).map(|b| b.to_string()), Some(DEGREE))
    );
    if let Some(visibility) = weather.visibility(coordinator) {
        println!("  visibility   {}", number(Some(visibility), display_unit(metric, Some(LENGTH_KILOMETERS))));
    }

    let forecast = weather.forecast(coordinator);
    if forecast.is_empty() {
        return;
    }

    println!();
    println!(
        "  {:<20} {:<16} {:>10} {:>10} {:>6} {:>10} {:>12}",
        "time", "condition", "temp", "low", "precip", "amount", "wind"
    );
    for period in forecast {
        println!(
            "  {:<20} {:<16} {:>10} {:>10} {:>6} {:>10} {:>12}",
            period
                .datetime
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            period.condition.unwrap_or("-"),
            number(period.temperature, temperature_unit),
            number(period.templow, temperature_unit),
            period
                .precipitation_probability
                .map(|p| format!("{p}%"))
                .unwrap_or_else(|| "-".into()),
            number(period.precipitation, length_unit),
            number(period.wind_speed, speed_unit),
        );
    }
}
