pub mod sensor_data;
pub mod users;

use actix_web::web;

use crate::{
    middleware::ApiKeyAuth,
    models::{ADMINS, READERS, SENSOR_WRITERS},
    utils::AppError,
};

/// Route table. Every resource carries its own API key filter and role set.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::invalid(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::invalid(err.to_string()).into()),
    )
    // ==================== SENSOR DATA ====================
    .service(
        web::scope("/api/SensorData")
            .service(
                web::resource("/PostSensorData")
                    .wrap(ApiKeyAuth::new(SENSOR_WRITERS))
                    .route(web::post().to(sensor_data::post_sensor_data)),
            )
            .service(
                web::resource("/PostManySensorData")
                    .wrap(ApiKeyAuth::new(SENSOR_WRITERS))
                    .route(web::post().to(sensor_data::post_many_sensor_data)),
            )
            .service(
                web::resource("/GetSingleReading")
                    .wrap(ApiKeyAuth::new(READERS))
                    .route(web::get().to(sensor_data::get_single_reading)),
            )
            .service(
                web::resource("/GetHighestPrecipInLast5Months")
                    .wrap(ApiKeyAuth::new(READERS))
                    .route(web::get().to(sensor_data::get_highest_precip_in_last_5_months)),
            )
            .service(
                web::resource("/GetHighestTempForEachSensor")
                    .wrap(ApiKeyAuth::new(READERS))
                    .route(web::get().to(sensor_data::get_highest_temp_for_each_sensor)),
            )
            .service(
                web::resource("/UpdatePrecipitation")
                    .wrap(ApiKeyAuth::new(ADMINS))
                    .route(web::put().to(sensor_data::update_precipitation)),
            ),
    )
    // ==================== USERS ====================
    .service(
        web::scope("/api/Users")
            .service(
                web::resource("/AddUser")
                    .wrap(ApiKeyAuth::new(ADMINS))
                    .route(web::post().to(users::add_user)),
            )
            .service(
                web::resource("/DeleteUserById")
                    .wrap(ApiKeyAuth::new(ADMINS))
                    .route(web::delete().to(users::delete_user_by_id)),
            )
            .service(
                web::resource("/DeleteStudentsByDate")
                    .wrap(ApiKeyAuth::new(ADMINS))
                    .route(web::delete().to(users::delete_students_by_date)),
            )
            .service(
                web::resource("/ChangeUsersRoleByDate")
                    .wrap(ApiKeyAuth::new(ADMINS))
                    .route(web::patch().to(users::change_users_role_by_date)),
            ),
    );
}
