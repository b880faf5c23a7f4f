use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const SENSOR_COLLECTION: &str = "SensorData";

/// Stored field names in the `SensorData` collection. These match the
/// column headers of the imported weather station data.
pub mod sensor_fields {
    pub const DEVICE_NAME: &str = "Device Name";
    pub const PRECIPITATION: &str = "Precipitation mm/h";
    pub const TIME: &str = "Time";
    pub const TEMPERATURE: &str = "Temperature (°C)";
    pub const ATMOSPHERIC_PRESSURE: &str = "Atmospheric Pressure (kPa)";
    pub const SOLAR_RADIATION: &str = "Solar Radiation (W/m2)";
}

/// One weather station reading (stored in MongoDB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(rename = "Device Name")]
    pub device_name: String,

    #[serde(rename = "Precipitation mm/h")]
    pub precipitation: f64,

    #[serde(rename = "Time", with = "chrono_datetime_as_bson_datetime")]
    pub time: DateTime<Utc>,

    #[serde(rename = "Latitude")]
    pub latitude: f64,

    #[serde(rename = "Longitude")]
    pub longitude: f64,

    #[serde(rename = "Temperature (°C)")]
    pub temperature: f64,

    #[serde(rename = "Atmospheric Pressure (kPa)")]
    pub atmospheric_pressure: f64,

    #[serde(rename = "Max Wind Speed (m/s)")]
    pub max_wind_speed: f64,

    #[serde(rename = "Solar Radiation (W/m2)")]
    pub solar_radiation: f64,

    #[serde(rename = "Vapor Pressure (kPa)")]
    pub vapor_pressure: f64,

    #[serde(rename = "Humidity (%)")]
    pub humidity: f64,

    #[serde(rename = "Wind Direction (°)")]
    pub wind_direction: f64,
}

/// Reading as exchanged over HTTP. Missing measurements default to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadingDto {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub obj_id: Option<String>,
    pub device_name: String,
    #[serde(default)]
    pub precipitation: f64,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub atmospheric_pressure: f64,
    #[serde(default)]
    pub max_wind_speed: f64,
    #[serde(default)]
    pub solar_radiation: f64,
    #[serde(default)]
    pub vapor_pressure: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_direction: f64,
}

impl From<SensorReadingDto> for SensorReading {
    fn from(dto: SensorReadingDto) -> Self {
        SensorReading {
            id: None,
            device_name: dto.device_name,
            precipitation: dto.precipitation,
            time: dto.time,
            latitude: dto.latitude,
            longitude: dto.longitude,
            temperature: dto.temperature,
            atmospheric_pressure: dto.atmospheric_pressure,
            max_wind_speed: dto.max_wind_speed,
            solar_radiation: dto.solar_radiation,
            vapor_pressure: dto.vapor_pressure,
            humidity: dto.humidity,
            wind_direction: dto.wind_direction,
        }
    }
}

impl From<SensorReading> for SensorReadingDto {
    fn from(r: SensorReading) -> Self {
        SensorReadingDto {
            obj_id: r.id.map(|id| id.to_hex()),
            device_name: r.device_name,
            precipitation: r.precipitation,
            time: r.time,
            latitude: r.latitude,
            longitude: r.longitude,
            temperature: r.temperature,
            atmospheric_pressure: r.atmospheric_pressure,
            max_wind_speed: r.max_wind_speed,
            solar_radiation: r.solar_radiation,
            vapor_pressure: r.vapor_pressure,
            humidity: r.humidity,
            wind_direction: r.wind_direction,
        }
    }
}

// Projections: read with the stored field names, written with API names.

/// Temperature / pressure / radiation / precipitation at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorGeneral {
    #[serde(rename(serialize = "deviceName", deserialize = "Device Name"))]
    pub device_name: String,
    #[serde(rename(serialize = "precipitation", deserialize = "Precipitation mm/h"))]
    pub precipitation: f64,
    #[serde(
        rename(serialize = "time", deserialize = "Time"),
        deserialize_with = "chrono_datetime_as_bson_datetime::deserialize"
    )]
    pub time: DateTime<Utc>,
    #[serde(rename(serialize = "temperature", deserialize = "Temperature (°C)"))]
    pub temperature: f64,
    #[serde(rename(
        serialize = "atmosphericPressure",
        deserialize = "Atmospheric Pressure (kPa)"
    ))]
    pub atmospheric_pressure: f64,
    #[serde(rename(serialize = "solarRadiation", deserialize = "Solar Radiation (W/m2)"))]
    pub solar_radiation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPrecip {
    #[serde(rename(serialize = "deviceName", deserialize = "Device Name"))]
    pub device_name: String,
    #[serde(rename(serialize = "precipitation", deserialize = "Precipitation mm/h"))]
    pub precipitation: f64,
    #[serde(
        rename(serialize = "time", deserialize = "Time"),
        deserialize_with = "chrono_datetime_as_bson_datetime::deserialize"
    )]
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTemp {
    #[serde(rename(serialize = "deviceName", deserialize = "Device Name"))]
    pub device_name: String,
    #[serde(
        rename(serialize = "time", deserialize = "Time"),
        deserialize_with = "chrono_datetime_as_bson_datetime::deserialize"
    )]
    pub time: DateTime<Utc>,
    #[serde(rename(serialize = "temperature", deserialize = "Temperature (°C)"))]
    pub temperature: f64,
}

impl From<&SensorReading> for SensorGeneral {
    fn from(r: &SensorReading) -> Self {
        SensorGeneral {
            device_name: r.device_name.clone(),
            precipitation: r.precipitation,
            time: r.time,
            temperature: r.temperature,
            atmospheric_pressure: r.atmospheric_pressure,
            solar_radiation: r.solar_radiation,
        }
    }
}

impl From<&SensorReading> for SensorPrecip {
    fn from(r: &SensorReading) -> Self {
        SensorPrecip {
            device_name: r.device_name.clone(),
            precipitation: r.precipitation,
            time: r.time,
        }
    }
}

impl From<&SensorReading> for SensorTemp {
    fn from(r: &SensorReading) -> Self {
        SensorTemp {
            device_name: r.device_name.clone(),
            time: r.time,
            temperature: r.temperature,
        }
    }
}
