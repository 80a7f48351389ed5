use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RecordBodyDoc { pub value: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::records::create_record,
        crate::routes::records::update_record,
        crate::routes::records::retrieve_record,
        crate::routes::records::delete_record,
        crate::routes::utility::md5,
        crate::routes::utility::factorial,
        crate::routes::utility::fibonacci,
        crate::routes::utility::is_prime,
        crate::routes::utility::slack_alert,
    ),
    components(
        schemas(
            HealthResponse,
            RecordBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "records"),
        (name = "utility")
    )
)]
pub struct ApiDoc;
