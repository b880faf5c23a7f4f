// ==================== SENSOR STORE ====================
// Weather station readings in the `SensorData` collection: inserts, point
// lookups, precipitation correction and the two "max" queries.

use crate::{
    database::MongoDB,
    models::{
        sensor_fields::{ATMOSPHERIC_PRESSURE, DEVICE_NAME, PRECIPITATION, SOLAR_RADIATION, TEMPERATURE, TIME},
        DateRange, DocumentId, SensorGeneral, SensorPrecip, SensorReading, SensorTemp,
        SENSOR_COLLECTION,
    },
    utils::{time, AppError},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use futures::stream::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

/// Half-width of the window used to match a reading to a requested instant
pub const READING_MATCH_WINDOW_MINUTES: i64 = 1;
pub const PRECIPITATION_LOOKBACK_MONTHS: u32 = 5;

#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Returns the stored reading with its new id.
    async fn insert_reading(&self, reading: SensorReading) -> Result<SensorReading, AppError>;

    async fn insert_readings(&self, readings: Vec<SensorReading>) -> Result<Vec<SensorReading>, AppError>;

    /// First reading whose device name matches (case-insensitive, substring)
    /// and whose time is within one minute of `at`.
    async fn find_reading(&self, device_name: &str, at: DateTime<Utc>) -> Result<Option<SensorGeneral>, AppError>;

    /// Highest precipitation for the device since `since` (inclusive).
    async fn max_precipitation_since(
        &self,
        device_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<SensorPrecip>, AppError>;

    /// One entry per device with its highest temperature strictly inside the range.
    /// Ties go to the earliest reading. Sorted by device name.
    async fn max_temperature_per_sensor(&self, range: DateRange) -> Result<Vec<SensorTemp>, AppError>;

    /// Returns the number of modified readings (0 when the id is unknown).
    async fn update_precipitation(&self, id: DocumentId, value: f64) -> Result<u64, AppError>;

    async fn max_precipitation_last_5_months(&self, device_name: &str) -> Result<Option<SensorPrecip>, AppError> {
        self.max_precipitation_since(device_name, precipitation_window_start(Utc::now()))
            .await
    }
}

pub fn precipitation_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(PRECIPITATION_LOOKBACK_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Regex source matching the device name literally anywhere in the stored name.
pub fn device_name_pattern(device_name: &str) -> String {
    regex::escape(device_name)
}

fn device_name_match(device_name: &str) -> Document {
    doc! { "$regex": device_name_pattern(device_name), "$options": "i" }
}

pub fn reading_filter(device_name: &str, at: DateTime<Utc>) -> Document {
    let window = Duration::minutes(READING_MATCH_WINDOW_MINUTES);
    doc! {
        DEVICE_NAME: device_name_match(device_name),
        TIME: { "$gte": time::to_bson(at - window), "$lte": time::to_bson(at + window) },
    }
}

pub fn general_projection() -> Document {
    doc! {
        "_id": 0,
        DEVICE_NAME: 1,
        TEMPERATURE: 1,
        ATMOSPHERIC_PRESSURE: 1,
        SOLAR_RADIATION: 1,
        PRECIPITATION: 1,
        TIME: 1,
    }
}

pub fn precipitation_filter(device_name: &str, since: DateTime<Utc>) -> Document {
    doc! {
        DEVICE_NAME: device_name_match(device_name),
        TIME: { "$gte": time::to_bson(since) },
    }
}

pub fn precipitation_projection() -> Document {
    doc! { "_id": 0, DEVICE_NAME: 1, PRECIPITATION: 1, TIME: 1 }
}

pub fn max_temperature_pipeline(range: &DateRange) -> Vec<Document> {
    vec![
        doc! { "$match": {
            TIME: { "$gt": time::to_bson(range.start()), "$lt": time::to_bson(range.end()) }
        } },
        doc! { "$sort": { TEMPERATURE: -1, TIME: 1 } },
        doc! { "$group": {
            "_id": format!("${}", DEVICE_NAME),
            "reading": { "$first": "$$ROOT" },
        } },
        doc! { "$replaceRoot": { "newRoot": "$reading" } },
        doc! { "$project": { "_id": 0, DEVICE_NAME: 1, TEMPERATURE: 1, TIME: 1 } },
        doc! { "$sort": { DEVICE_NAME: 1 } },
    ]
}

pub struct MongoSensorStore {
    db: MongoDB,
}

impl MongoSensorStore {
    pub fn new(db: &MongoDB) -> Self {
        Self { db: db.clone() }
    }

    fn readings(&self) -> Collection<SensorReading> {
        self.db.collection::<SensorReading>(SENSOR_COLLECTION)
    }
}

#[async_trait]
impl SensorStore for MongoSensorStore {
    async fn insert_reading(&self, mut reading: SensorReading) -> Result<SensorReading, AppError> {
        let result = self.readings().insert_one(&reading).await?;
        reading.id = result.inserted_id.as_object_id();
        Ok(reading)
    }

    async fn insert_readings(&self, mut readings: Vec<SensorReading>) -> Result<Vec<SensorReading>, AppError> {
        let result = self.readings().insert_many(&readings).await?;
        for (index, id) in result.inserted_ids {
            if let Some(reading) = readings.get_mut(index) {
                reading.id = id.as_object_id();
            }
        }
        Ok(readings)
    }

    async fn find_reading(&self, device_name: &str, at: DateTime<Utc>) -> Result<Option<SensorGeneral>, AppError> {
        let reading = self
            .db
            .collection::<SensorGeneral>(SENSOR_COLLECTION)
            .find_one(reading_filter(device_name, at))
            .projection(general_projection())
            .await?;
        Ok(reading)
    }

    async fn max_precipitation_since(
        &self,
        device_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<SensorPrecip>, AppError> {
        let reading = self
            .db
            .collection::<SensorPrecip>(SENSOR_COLLECTION)
            .find_one(precipitation_filter(device_name, since))
            .sort(doc! { PRECIPITATION: -1, TIME: 1 })
            .projection(precipitation_projection())
            .await?;
        Ok(reading)
    }

    async fn max_temperature_per_sensor(&self, range: DateRange) -> Result<Vec<SensorTemp>, AppError> {
        let mut cursor = self
            .db
            .collection::<Document>(SENSOR_COLLECTION)
            .aggregate(max_temperature_pipeline(&range))
            .await?;

        let mut results = Vec::new();
        while let Some(document) = cursor.next().await {
            results.push(mongodb::bson::from_document::<SensorTemp>(document?)?);
        }
        Ok(results)
    }

    async fn update_precipitation(&self, id: DocumentId, value: f64) -> Result<u64, AppError> {
        let result = self
            .readings()
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": { PRECIPITATION: value } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
