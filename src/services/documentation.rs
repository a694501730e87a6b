use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Flipball Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::submit_event,
        crate::routes::game::list_events,
        crate::routes::game::get_snapshot,
        crate::routes::game::get_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::event::SubmitEventRequest,
            crate::dto::event::SubmitEventResponse,
            crate::dto::event::EventSummary,
            crate::dto::snapshot::SnapshotView,
            crate::dto::snapshot::BaseRunnersView,
            crate::dto::snapshot::GameRecordView,
            crate::state::game::GameStatus,
            crate::state::game::ScoringMethod,
            crate::state::game::CupHit,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Live scoring of a game"),
    )
)]
pub struct ApiDoc;
