use utoipa::OpenApi;

use crate::handlers::{drafts, health};
use domain::models::{
    CardId, Draft, DraftSettings, DraftSettingsPatch, DraftStatus, PhaseState, PrivateHandView, PublicDraftState, PublicSeatView,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Draft Coordinator API",
        version = "0.1.0",
        description = "Multiplayer sealed/draft coordinator: lobby management, leader and pack draft rounds, bot seats, and real-time state sync over REST long-poll and WebSocket",
        contact(
            name = "Draft Coordinator Team",
            email = "team@draft-coordinator.example.com"
        )
    ),
    paths(
        // Health
        health::health_check,

        // Draft lifecycle
        drafts::create_draft,
        drafts::get_draft_state,
        drafts::poll_draft_state,
        drafts::join_draft,
        drafts::leave_draft,
        drafts::add_bot,
        drafts::randomize_seats,
        drafts::update_settings,
        drafts::start_draft,
        drafts::select_card,
        drafts::pause_draft,
        drafts::resume_draft,
        drafts::cancel_draft,
    ),
    components(
        schemas(
            // Domain models
            CardId,
            Draft,
            DraftSettings,
            DraftSettingsPatch,
            DraftStatus,
            PhaseState,
            PrivateHandView,
            PublicDraftState,
            PublicSeatView,

            // Request/response DTOs
            drafts::CreateDraftRequest,
            drafts::CreateDraftResponse,
            drafts::SelectRequest,
            drafts::DraftStateResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "draft", description = "Draft lobby, lifecycle, and pick operations"),
    )
)]
pub struct ApiDoc;
