/// Completed-game notifications.
pub mod completion;
/// OpenAPI documentation generation.
pub mod documentation;
/// Event submission: validation, transition and persistence.
pub mod event_service;
/// Read access to snapshots, event logs and game records.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Snapshot reconstruction after undo and edit.
pub mod replay;
/// Scoring rules enforced before the state machine.
pub mod validation;
