//! Inbound webhook handler for SNS HTTP(S) subscriptions.

use axum::{body::Bytes, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::models::SnsMessage;
use crate::startup::AppState;

/// Relay an SNS notification to the configured Signal group.
///
/// Validation cascade, each branch short-circuiting the rest:
/// topic check (403), subscription confirmation (201), required fields (400),
/// then sync + send against the gateway (502 on upstream failure, 200 on
/// success).
#[tracing::instrument(skip(state, body))]
pub async fn sns_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), AppError> {
    // A body that is not a JSON object carries no TopicArn, so it falls
    // through to the same 403 as any other unauthenticated payload.
    let message: SnsMessage = serde_json::from_slice(&body).unwrap_or_default();
    tracing::debug!(?message, "Received SNS payload");

    // Plain string comparison against the configured ARN is the only
    // authenticity check; SNS message signatures are not verified.
    if !message.is_for_topic(&state.config.sns.topic_arn) {
        return Err(AppError::Forbidden(anyhow::anyhow!("Invalid request")));
    }

    if let Some(subscribe_url) = &message.subscribe_url {
        // Confirmation is a deliberate manual step; following the URL here
        // would let anyone who knows the topic ARN subscribe this endpoint.
        tracing::info!("Visit '{}' to confirm subscription", subscribe_url);
        return Ok((StatusCode::CREATED, "Subscription URL in server logs"));
    }

    let (subject, text) = match (&message.subject, &message.message) {
        (Some(subject), Some(text)) => (subject, text),
        _ => return Err(AppError::BadRequest(anyhow::anyhow!("Key fields missing"))),
    };

    let notification = SnsMessage::notification_text(subject, text);

    state.gateway.sync_receive().await?;
    state.gateway.send_group_message(&notification).await?;

    tracing::info!(subject = %subject, "Notification relayed to Signal group");
    Ok((StatusCode::OK, "Notification received and sent to Signal group"))
}
