use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    middleware::AuthenticatedUser,
    models::{DateRange, DocumentId, SensorReading, SensorReadingDto},
    services::SensorStore,
    utils::{time::deserialize_flexible, AppError},
};

#[derive(Debug, Deserialize)]
pub struct SingleReadingQuery {
    #[serde(rename = "deviceName", alias = "sensor")]
    pub device_name: String,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    #[serde(rename = "deviceName", alias = "sensor")]
    pub device_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    #[serde(deserialize_with = "deserialize_flexible")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrecipitationQuery {
    pub id: String,
    pub new_value: f64,
}

fn require_device_name(raw: &str) -> Result<&str, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid("deviceName must be provided"));
    }
    Ok(name)
}

/// POST /api/SensorData/PostSensorData - Stores one reading
pub async fn post_sensor_data(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn SensorStore>,
    body: web::Json<SensorReadingDto>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /SensorData/PostSensorData - device {} by {}", body.device_name, user.email);

    let stored = store
        .insert_reading(SensorReading::from(body.into_inner()))
        .await?;

    log::info!("✅ Reading stored: {:?}", stored.id);
    Ok(HttpResponse::Created().json(SensorReadingDto::from(stored)))
}

/// POST /api/SensorData/PostManySensorData - Backlog upload, at least one reading
pub async fn post_many_sensor_data(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn SensorStore>,
    body: web::Json<Vec<SensorReadingDto>>,
) -> Result<HttpResponse, AppError> {
    let readings = body.into_inner();
    log::info!("📝 POST /SensorData/PostManySensorData - {} readings by {}", readings.len(), user.email);

    if readings.is_empty() {
        return Err(AppError::invalid("No items provided in list"));
    }

    let stored = store
        .insert_readings(readings.into_iter().map(SensorReading::from).collect())
        .await?;

    log::info!("✅ {} readings stored", stored.len());
    let response: Vec<SensorReadingDto> = stored.into_iter().map(SensorReadingDto::from).collect();
    Ok(HttpResponse::Created().json(response))
}

/// GET /api/SensorData/GetSingleReading - Reading for a device within a minute of `date`
pub async fn get_single_reading(
    store: web::Data<dyn SensorStore>,
    query: web::Query<SingleReadingQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 GET /SensorData/GetSingleReading - {} at {}", query.device_name, query.date);

    let device_name = require_device_name(&query.device_name)?;

    match store.find_reading(device_name, query.date).await? {
        Some(reading) => Ok(HttpResponse::Ok().json(reading)),
        None => Err(AppError::not_found("No record found")),
    }
}

/// GET /api/SensorData/GetHighestPrecipInLast5Months
pub async fn get_highest_precip_in_last_5_months(
    store: web::Data<dyn SensorStore>,
    query: web::Query<DeviceQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 GET /SensorData/GetHighestPrecipInLast5Months - {}", query.device_name);

    let device_name = require_device_name(&query.device_name)?;

    match store.max_precipitation_last_5_months(device_name).await? {
        Some(reading) => Ok(HttpResponse::Ok().json(reading)),
        None => Err(AppError::not_found("No record found")),
    }
}

/// GET /api/SensorData/GetHighestTempForEachSensor
pub async fn get_highest_temp_for_each_sensor(
    store: web::Data<dyn SensorStore>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 GET /SensorData/GetHighestTempForEachSensor - {} to {}", query.start, query.end);

    let range = DateRange::new(query.start, query.end)?;
    let readings = store.max_temperature_per_sensor(range).await?;

    if readings.is_empty() {
        return Err(AppError::not_found("No record found"));
    }
    Ok(HttpResponse::Ok().json(readings))
}

/// PUT /api/SensorData/UpdatePrecipitation - Teachers correcting a reading
pub async fn update_precipitation(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn SensorStore>,
    query: web::Query<UpdatePrecipitationQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔧 PUT /SensorData/UpdatePrecipitation - {} -> {} by {}", query.id, query.new_value, user.email);

    let id: DocumentId = query.id.parse()?;
    let affected = store.update_precipitation(id, query.new_value).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Updated Data with Id: {} New Value: {}", id, query.new_value),
        "affected": affected
    })))
}
