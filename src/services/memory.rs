//! In-memory stores with the same observable behaviour as the MongoDB ones.
//! Used to drive the handlers and the auth filter in tests.

use super::sensor_service::{device_name_pattern, SensorStore, READING_MATCH_WINDOW_MINUTES};
use super::user_service::UserStore;
use crate::models::{
    ApiUser, CreateUserOutcome, DateRange, DocumentId, NewUser, Role, SensorGeneral, SensorPrecip,
    SensorReading, SensorTemp,
};
use crate::utils::{time, AppError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// start <= t <= end, like `$gte`/`$lte`
fn within_inclusive(range: &DateRange, t: DateTime<Utc>) -> bool {
    range.start() <= t && t <= range.end()
}

/// start < t < end, like `$gt`/`$lt`
fn within_exclusive(range: &DateRange, t: DateTime<Utc>) -> bool {
    range.start() < t && t < range.end()
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<ApiUser>>,
}

impl InMemoryUserStore {
    /// Adds a user with a fixed key and role, last seen on 2020-01-01.
    pub fn seed(&self, api_key: &str, role: &str) -> ApiUser {
        let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let user = ApiUser {
            id: Some(ObjectId::new()),
            user_name: format!("user-{}", api_key),
            email: format!("{}@example.com", api_key),
            role: role.to_string(),
            api_key: api_key.to_string(),
            created: past,
            last_access: past,
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn insert(&self, user: ApiUser) {
        self.users.lock().unwrap().push(user);
    }

    pub fn all(&self) -> Vec<ApiUser> {
        self.users.lock().unwrap().clone()
    }

    pub fn get(&self, api_key: &str) -> Option<ApiUser> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.api_key == api_key)
            .cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<CreateUserOutcome, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Ok(CreateUserOutcome::EmailTaken);
        }
        let mut user = ApiUser::issue(new_user, time::now());
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(CreateUserOutcome::Created(user))
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<ApiUser>, AppError> {
        Ok(self.get(api_key))
    }

    async fn update_last_access(&self, api_key: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.api_key == api_key) {
            user.last_access = at;
        }
        Ok(())
    }

    async fn delete_user_by_id(&self, id: DocumentId) -> Result<u64, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != Some(id.object_id()));
        Ok((before - users.len()) as u64)
    }

    async fn delete_students_by_date(&self, range: DateRange) -> Result<u64, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| !(u.role == Role::Student.as_str() && within_inclusive(&range, u.last_access)));
        Ok((before - users.len()) as u64)
    }

    async fn update_user_role_by_date(
        &self,
        role_in: Role,
        role_out: Role,
        range: DateRange,
    ) -> Result<u64, AppError> {
        let mut users = self.users.lock().unwrap();
        let mut modified = 0;
        for user in users
            .iter_mut()
            .filter(|u| u.role == role_in.as_str() && within_inclusive(&range, u.created))
        {
            user.role = role_out.to_string();
            modified += 1;
        }
        Ok(modified)
    }
}

#[derive(Default)]
pub struct InMemorySensorStore {
    readings: Mutex<Vec<SensorReading>>,
}

impl InMemorySensorStore {
    pub fn all(&self) -> Vec<SensorReading> {
        self.readings.lock().unwrap().clone()
    }

    fn matching(&self, device_name: &str) -> Vec<SensorReading> {
        let re = regex::RegexBuilder::new(&device_name_pattern(device_name))
            .case_insensitive(true)
            .build();
        let Ok(re) = re else { return Vec::new() };
        self.readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| re.is_match(&r.device_name))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SensorStore for InMemorySensorStore {
    async fn insert_reading(&self, mut reading: SensorReading) -> Result<SensorReading, AppError> {
        reading.id = Some(ObjectId::new());
        self.readings.lock().unwrap().push(reading.clone());
        Ok(reading)
    }

    async fn insert_readings(&self, readings: Vec<SensorReading>) -> Result<Vec<SensorReading>, AppError> {
        let mut stored = Vec::with_capacity(readings.len());
        for reading in readings {
            stored.push(self.insert_reading(reading).await?);
        }
        Ok(stored)
    }

    async fn find_reading(&self, device_name: &str, at: DateTime<Utc>) -> Result<Option<SensorGeneral>, AppError> {
        let window = Duration::minutes(READING_MATCH_WINDOW_MINUTES);
        Ok(self
            .matching(device_name)
            .iter()
            .find(|r| r.time >= at - window && r.time <= at + window)
            .map(SensorGeneral::from))
    }

    async fn max_precipitation_since(
        &self,
        device_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<SensorPrecip>, AppError> {
        let mut candidates: Vec<SensorReading> = self
            .matching(device_name)
            .into_iter()
            .filter(|r| r.time >= since)
            .collect();
        candidates.sort_by(|a, b| {
            b.precipitation
                .total_cmp(&a.precipitation)
                .then(a.time.cmp(&b.time))
        });
        Ok(candidates.first().map(SensorPrecip::from))
    }

    async fn max_temperature_per_sensor(&self, range: DateRange) -> Result<Vec<SensorTemp>, AppError> {
        let mut in_range: Vec<SensorReading> = self
            .all()
            .into_iter()
            .filter(|r| within_exclusive(&range, r.time))
            .collect();
        in_range.sort_by(|a, b| b.temperature.total_cmp(&a.temperature).then(a.time.cmp(&b.time)));

        let mut per_device: BTreeMap<String, SensorTemp> = BTreeMap::new();
        for reading in &in_range {
            per_device
                .entry(reading.device_name.clone())
                .or_insert_with(|| SensorTemp::from(reading));
        }
        Ok(per_device.into_values().collect())
    }

    async fn update_precipitation(&self, id: DocumentId, value: f64) -> Result<u64, AppError> {
        let mut readings = self.readings.lock().unwrap();
        match readings.iter_mut().find(|r| r.id == Some(id.object_id())) {
            Some(reading) if reading.precipitation != value => {
                reading.precipitation = value;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(device: &str, day: u32, hour: u32, temperature: f64, precipitation: f64) -> SensorReading {
        SensorReading {
            id: None,
            device_name: device.to_string(),
            precipitation,
            time: Utc.with_ymd_and_hms(2021, 5, day, hour, 0, 0).unwrap(),
            latitude: -26.95,
            longitude: 152.9,
            temperature,
            atmospheric_pressure: 128.4,
            max_wind_speed: 4.94,
            solar_radiation: 113.2,
            vapor_pressure: 1.73,
            humidity: 73.8,
            wind_direction: 155.6,
        }
    }

    fn range(from_day: u32, to_day: u32) -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2021, 5, from_day, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 5, to_day, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_max_temperature_one_entry_per_device() {
        let store = InMemorySensorStore::default();
        store
            .insert_readings(vec![
                reading("Woodford_Sensor", 2, 1, 20.0, 0.0),
                reading("Woodford_Sensor", 2, 5, 25.5, 0.0),
                reading("Yandina_Sensor", 3, 1, 18.0, 0.0),
                reading("Noosa_Sensor", 20, 1, 40.0, 0.0),
            ])
            .await
            .unwrap();

        let result = store.max_temperature_per_sensor(range(1, 10)).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].device_name, "Woodford_Sensor");
        assert_eq!(result[0].temperature, 25.5);
        assert_eq!(result[1].device_name, "Yandina_Sensor");
    }

    #[tokio::test]
    async fn test_max_temperature_tie_goes_to_earliest() {
        let store = InMemorySensorStore::default();
        store
            .insert_readings(vec![
                reading("Woodford_Sensor", 4, 9, 30.0, 0.0),
                reading("Woodford_Sensor", 4, 3, 30.0, 0.0),
            ])
            .await
            .unwrap();

        let result = store.max_temperature_per_sensor(range(1, 10)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].time, Utc.with_ymd_and_hms(2021, 5, 4, 3, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_max_temperature_bounds_are_exclusive() {
        let store = InMemorySensorStore::default();
        store.insert_reading(reading("Woodford_Sensor", 1, 0, 30.0, 0.0)).await.unwrap();

        assert!(store.max_temperature_per_sensor(range(1, 10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_reading_matches_substring_case_insensitive() {
        let store = InMemorySensorStore::default();
        store.insert_reading(reading("Woodford_Sensor", 7, 2, 21.0, 0.1)).await.unwrap();

        let at = Utc.with_ymd_and_hms(2021, 5, 7, 2, 0, 45).unwrap();
        let found = store.find_reading("woodford", at).await.unwrap().unwrap();
        assert_eq!(found.device_name, "Woodford_Sensor");

        let too_late = Utc.with_ymd_and_hms(2021, 5, 7, 2, 1, 1).unwrap();
        assert!(store.find_reading("woodford", too_late).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_precipitation_unknown_id_is_noop() {
        let store = InMemorySensorStore::default();
        let stored = store.insert_reading(reading("Woodford_Sensor", 7, 2, 21.0, 0.1)).await.unwrap();

        assert_eq!(store.update_precipitation(DocumentId::from(ObjectId::new()), 9.0).await.unwrap(), 0);
        let id = DocumentId::from(stored.id.unwrap());
        assert_eq!(store.update_precipitation(id, 9.0).await.unwrap(), 1);
        assert_eq!(store.all()[0].precipitation, 9.0);
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let store = InMemoryUserStore::default();
        let new_user = NewUser {
            user_name: "a".into(),
            email: "a@x.com".into(),
            role: Role::Student,
        };

        assert!(matches!(
            store.create_user(new_user.clone()).await.unwrap(),
            CreateUserOutcome::Created(_)
        ));
        assert!(matches!(
            store.create_user(new_user).await.unwrap(),
            CreateUserOutcome::EmailTaken
        ));
        assert_eq!(store.all().len(), 1);
    }
}
