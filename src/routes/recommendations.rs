use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;
use crate::auth::AuthUser;
use crate::core::{is_upcoming, matches_categories, RecommendError};
use crate::models::{
    HealthResponse, Interaction, InteractionType, RecommendRequest, RecommendResponse,
    RecordInteractionRequest, RecordInteractionResponse, UpdateInterestsRequest,
};
use crate::routes::{json_error, AppState};
use crate::services::CacheKey;

/// Configure recommendation and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend))
        .route("/interests", web::get().to(get_interests))
        .route("/interests", web::put().to(update_interests))
        .route("/interactions", web::post().to(record_interaction))
        .route("/interactions/stats", web::get().to(interaction_stats));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_entries: state.cache.as_ref().map(|c| c.l1_entries()),
        timestamp: Utc::now(),
    })
}

/// Rank upcoming events for the caller
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "limit": 20,
///   "category": "Technology"
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return json_error(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let user_id = &user.0;
    let limit = state.limits.effective_limit(req.limit);
    let cache_key = CacheKey::recommendations(user_id, req.category.as_deref(), limit);

    // Taken before the profile is read so a concurrent edit voids the cache write
    let mut stamp = 0;
    if let Some(cache) = &state.cache {
        match cache.get::<RecommendResponse>(&cache_key).await {
            Ok(Some(cached)) => {
                tracing::debug!("Serving cached recommendations for {}", user_id);
                return HttpResponse::Ok().json(cached);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache lookup failed for {}: {}", cache_key, e),
        }
        stamp = cache.stamp(user_id).await;
    }

    tracing::info!("Ranking events for user: {}, limit: {}", user_id, limit);

    // A missing profile degrades to an unranked list instead of failing
    let profile = match state.postgres.get_or_create_profile(user_id).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!("Failed to load interest profile for {}, serving unranked events: {}", user_id, e);
            None
        }
    };

    let categories = match (&req.category, &profile) {
        (Some(category), _) => vec![category.clone()],
        (None, Some(profile)) => profile.category_names(),
        (None, None) => vec![],
    };

    let now = Utc::now();
    let (mut documents, unreadable) = match state.campus.upcoming_events(&categories, now).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::error!("Failed to fetch upcoming events for {}: {}", user_id, e);
            return json_error(StatusCode::BAD_GATEWAY, "Failed to fetch events", e);
        }
    };

    // The campus API may ignore filters it does not understand
    documents.retain(|doc| is_upcoming(doc, now) && matches_categories(doc, &categories));

    tracing::debug!("Found {} candidate events for {}", documents.len(), user_id);

    let (mut result, personalized) =
        match state.recommender.rank_documents(profile.as_ref(), &documents, now, Some(limit)) {
            Ok(result) => (result, true),
            Err(RecommendError::InvalidProfile) => (state.recommender.unranked(&documents, Some(limit)), false),
        };

    // Documents the campus API returned but that could not be read are malformed candidates too
    result.total_candidates += unreadable;
    result.skipped += unreadable;

    let response = RecommendResponse {
        events: result.events,
        personalized,
        total_candidates: result.total_candidates,
        skipped: result.skipped,
    };

    if personalized {
        if let Some(cache) = &state.cache {
            if let Err(e) = cache.set_if_current(&cache_key, user_id, stamp, &response).await {
                tracing::warn!("Failed to cache recommendations: {}", e);
            }
        }
    }

    tracing::info!(
        "Returning {} events for user {} (from {} candidates, {} skipped)",
        response.events.len(),
        user_id,
        response.total_candidates,
        response.skipped
    );

    HttpResponse::Ok().json(response)
}

/// Fetch the caller's interest profile, creating it on first access
///
/// GET /api/v1/interests
async fn get_interests(state: web::Data<AppState>, user: AuthUser) -> impl Responder {
    match state.postgres.get_or_create_profile(&user.0).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            tracing::error!("Failed to load interest profile for {}: {}", user.0, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load interests", e)
        }
    }
}

/// Replace the caller's declared interests
///
/// PUT /api/v1/interests
///
/// Request body:
/// ```json
/// {
///   "categories": [{"category": "Technology", "skillLevel": 2}],
///   "preferredTimes": [10, 16],
///   "preferredLocations": ["Auditorium"]
/// }
/// ```
async fn update_interests(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<UpdateInterestsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return json_error(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let mut profile = match state.postgres.get_or_create_profile(&user.0).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to load interest profile for {}: {}", user.0, e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load interests", e);
        }
    };

    let req = req.into_inner();
    if let Err(e) = profile.set_preferences(req.categories, req.preferred_times, req.preferred_locations) {
        return json_error(StatusCode::BAD_REQUEST, "Validation failed", e);
    }

    if let Err(e) = state.postgres.update_preferences(&profile).await {
        tracing::error!("Failed to update interests for {}: {}", user.0, e);
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update interests", e);
    }

    invalidate_cached(&state, &user.0).await;

    tracing::info!("Updated interests for user {}", user.0);
    HttpResponse::Ok().json(profile)
}

/// Append one interaction to the caller's log
///
/// POST /api/v1/interactions
///
/// Request body:
/// ```json
/// {
///   "eventId": "string",
///   "interactionType": "view|like|dislike|feedback"
/// }
/// ```
async fn record_interaction(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<RecordInteractionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return json_error(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let interaction_type = match req.interaction_type.parse::<InteractionType>() {
        Ok(kind) => kind,
        Err(_) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "Invalid interaction type",
                "Interaction type must be one of: view, like, dislike, feedback",
            );
        }
    };

    let interaction = Interaction {
        event_id: req.event_id.clone(),
        interaction_type,
        timestamp: Utc::now(),
    };

    match state.postgres.append_interaction(&user.0, &interaction).await {
        Ok(id) => {
            invalidate_cached(&state, &user.0).await;

            HttpResponse::Ok().json(RecordInteractionResponse {
                success: true,
                interaction_id: id.to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to record interaction for {}: {}", user.0, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record interaction", e)
        }
    }
}

/// Interaction totals for the caller
///
/// GET /api/v1/interactions/stats
async fn interaction_stats(state: web::Data<AppState>, user: AuthUser) -> impl Responder {
    match state.postgres.interaction_counts(&user.0).await {
        Ok(counts) => HttpResponse::Ok().json(counts),
        Err(e) => {
            tracing::error!("Failed to count interactions for {}: {}", user.0, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to count interactions", e)
        }
    }
}

async fn invalidate_cached(state: &AppState, user_id: &str) {
    if let Some(cache) = &state.cache {
        if let Err(e) = cache.invalidate_user(user_id).await {
            tracing::warn!("Failed to invalidate cache for {}: {}", user_id, e);
        }
    }
}
