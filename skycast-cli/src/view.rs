use skycast_core::WeatherReading;

/// Temperature and wind labels for a units system.
fn unit_labels(units: &str) -> (&'static str, &'static str) {
    match units {
        "metric" => ("°C", "m/s"),
        "imperial" => ("°F", "mph"),
        _ => ("K", "m/s"),
    }
}

/// Human-friendly block for one reading.
pub fn render(reading: &WeatherReading, units: &str) -> String {
    let (temp_unit, speed_unit) = unit_labels(units);

    let location = if reading.country.is_empty() {
        reading.city.clone()
    } else {
        format!("{}, {}", reading.city, reading.country)
    };

    let mut out = format!(
        "{location}\n\
         Temperature: {:.1}{temp_unit}\n\
         Humidity:    {}%\n\
         Pressure:    {} hPa\n\
         Wind:        {:.1} {speed_unit}\n\
         Sunrise:     {}\n\
         Sunset:      {}",
        reading.temperature,
        reading.humidity,
        reading.pressure,
        reading.wind_speed,
        reading.sunrise_time,
        reading.sunset_time,
    );

    if let Some(icon) = &reading.icon_url {
        out.push_str(&format!("\nIcon:        {icon}"));
    }

    out
}
