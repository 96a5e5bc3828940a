//! Support ticket route handlers.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shopfront_core::TicketId;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::models::ticket::clean_description;
use crate::models::{NewTicket, Ticket};
use crate::state::AppState;

/// Ticket submission form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub order_number: Option<String>,
}

/// Description edit form.
#[derive(Debug, Deserialize)]
pub struct DescriptionForm {
    #[serde(default)]
    pub description: String,
}

/// Ticket listing filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    pub q: Option<String>,
    pub order_number: Option<String>,
}

/// File a support ticket.
///
/// POST /api/support/tickets
#[instrument(skip(state, form), fields(order_number = form.order_number.as_deref()))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<TicketForm>,
) -> Result<(StatusCode, Json<Ticket>)> {
    let ticket = NewTicket::new(
        &form.subject,
        &form.description,
        form.order_number.as_deref(),
    )?;
    let ticket = state.tickets().create(ticket).await?;
    tracing::info!(summary = %ticket.summary(), "Support request submitted");
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// List tickets, optionally searched and filtered by order.
///
/// GET /api/support/tickets?q=&orderNumber=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<Vec<Ticket>>> {
    let q = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let order = query
        .order_number
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty());

    let repo = state.tickets();
    let tickets = match (q, order) {
        (Some(q), Some(order)) => repo
            .search(q)
            .await?
            .into_iter()
            .filter(|t| t.order_number.as_deref() == Some(order))
            .collect(),
        (Some(q), None) => repo.search(q).await?,
        (None, Some(order)) => repo.list_by_order(order).await?,
        (None, None) => repo.list_all().await?,
    };

    Ok(Json(tickets))
}

/// One ticket.
///
/// GET /api/support/tickets/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>> {
    state
        .tickets()
        .get_by_id(&TicketId::new(id.as_str()))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Ticket not found: {id}")))
}

/// Replace a ticket's description.
///
/// POST /api/support/tickets/{id}/description
#[instrument(skip(state, form))]
pub async fn update_description(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DescriptionForm>,
) -> Result<Json<Ticket>> {
    let description = clean_description(&form.description)?;
    let ticket = state
        .tickets()
        .update_description(&TicketId::new(id.as_str()), &description)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("Ticket not found: {id}")),
            other => other.into(),
        })?;
    Ok(Json(ticket))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::testing::{CartBehavior, FakeStorefront, get, post_form, state_with};
    use crate::state::AppState;

    async fn seeded() -> AppState {
        let state = state_with(FakeStorefront::new(CartBehavior::Ok));
        for pairs in [
            &[
                ("subject", "Late delivery"),
                ("description", "Still in transit"),
                ("orderNumber", "1042"),
            ][..],
            &[("subject", "Damaged box"), ("description", "Lid was crushed"), ("orderNumber", "1042")][..],
            &[("subject", "Sizing"), ("description", "Does it run small?")][..],
        ] {
            let (status, _) = post_form(state.clone(), "/api/support/tickets", pairs).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        state
    }

    #[tokio::test]
    async fn test_create_returns_ticket() {
        let state = state_with(FakeStorefront::new(CartBehavior::Ok));
        let (status, body) = post_form(
            state,
            "/api/support/tickets",
            &[
                ("subject", "Late delivery"),
                ("description", "Still in transit"),
                ("orderNumber", ""),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "TICKET-1");
        assert!(body["orderNumber"].is_null());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let state = state_with(FakeStorefront::new(CartBehavior::Ok));
        let (status, body) = post_form(
            state.clone(),
            "/api/support/tickets",
            &[("subject", "Hi"), ("description", "   ")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Description is required");

        let (_, body) = get(state, "/api/support/tickets").await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let state = seeded().await;

        let (_, body) = get(state.clone(), "/api/support/tickets").await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = get(state.clone(), "/api/support/tickets?q=CRUSHED").await;
        assert_eq!(body[0]["id"], "TICKET-2");

        let (_, body) = get(state.clone(), "/api/support/tickets?orderNumber=1042").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = get(state, "/api/support/tickets?q=late&orderNumber=1042").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_show() {
        let state = seeded().await;

        let (status, body) = get(state.clone(), "/api/support/tickets/TICKET-3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "Sizing");

        let (status, body) = get(state, "/api/support/tickets/TICKET-42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Ticket not found: TICKET-42");
    }

    #[tokio::test]
    async fn test_update_description() {
        let state = seeded().await;

        let (status, body) = post_form(
            state.clone(),
            "/api/support/tickets/TICKET-2/description",
            &[("description", "  Lid and corner crushed ")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Lid and corner crushed");
        assert_eq!(body["subject"], "Damaged box");

        let (_, body) = get(state.clone(), "/api/support/tickets/TICKET-2").await;
        assert_eq!(body["description"], "Lid and corner crushed");

        let (status, body) = post_form(
            state.clone(),
            "/api/support/tickets/TICKET-2/description",
            &[("description", " ")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Description is required");

        let (status, body) = post_form(
            state,
            "/api/support/tickets/TICKET-42/description",
            &[("description", "Hello")],
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Ticket not found: TICKET-42");
    }
}
