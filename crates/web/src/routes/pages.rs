//! Protected pages backed by the upstream API

use crate::enrich::{self, Indicators};
use crate::error::{WebError, WebResult};
use crate::forms::PartForm;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::views;
use axum::{
    Extension, Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use usina_core::UserProfile;
use usina_http::{ClientError, Resource};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/menu", get(menu))
        .route("/cadastro", get(parts_form).post(register_part))
        .route("/atividades", get(activities))
        .route("/producao", get(production))
        .route("/indicadores", get(indicators))
}

async fn current_user(context: &SessionContext) -> WebResult<UserProfile> {
    context.handle().user().await.ok_or(WebError::SessionExpired)
}

/// An expired session ends the request; anything else degrades the page
fn recoverable(err: ClientError) -> WebResult<WebError> {
    match WebError::from(err) {
        WebError::SessionExpired => Err(WebError::SessionExpired),
        other => Ok(other),
    }
}

pub async fn root() -> Redirect {
    Redirect::to("/login")
}

pub async fn menu(Extension(context): Extension<SessionContext>) -> WebResult<Html<String>> {
    let user = current_user(&context).await?;
    Ok(views::menu_page(&user))
}

#[derive(Debug, Default, Deserialize)]
pub struct PartsQuery {
    pub success: Option<String>,
}

pub async fn parts_form(
    Extension(context): Extension<SessionContext>,
    Query(query): Query<PartsQuery>,
) -> WebResult<Html<String>> {
    let user = current_user(&context).await?;
    let success = query.success.as_deref() == Some("true");
    Ok(views::parts_page(&user, success, None))
}

#[instrument(name = "register_part", skip_all)]
pub async fn register_part(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
    Form(form): Form<PartForm>,
) -> WebResult<Response> {
    let user = current_user(&context).await?;

    let part = match form.validate(user.id) {
        Ok(part) => part,
        Err(e) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                views::parts_page(&user, false, Some(&e.to_string())),
            )
                .into_response());
        }
    };

    let body = serde_json::to_value(&part)?;
    match state
        .api
        .with_session(context.handle())
        .create(Resource::Parts, body)
        .await
    {
        Ok(_) => {
            info!(codigo_peca = %part.codigo_peca, "part registered");
            Ok(Redirect::to("/cadastro?success=true").into_response())
        }
        Err(e) => {
            let error = recoverable(e)?;
            warn!(error = %error, "part registration failed");
            Ok((
                error.status_code(),
                views::parts_page(&user, false, Some(&error.user_message())),
            )
                .into_response())
        }
    }
}

#[instrument(name = "activities", skip_all)]
pub async fn activities(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
) -> WebResult<Html<String>> {
    let user = current_user(&context).await?;
    let client = state.api.with_session(context.handle());

    let (activities, users) = tokio::join!(
        client.list(Resource::Activities),
        client.list(Resource::Users)
    );

    let names = match users {
        Ok(users) => enrich::display_names(&users),
        Err(e) => {
            let error = recoverable(e)?;
            warn!(error = %error, "could not load users, activities shown unassigned");
            Default::default()
        }
    };

    match activities {
        Ok(activities) => {
            let activities = enrich::enrich_activities(activities, &names);
            Ok(views::activities_page(&user, &activities, None))
        }
        Err(e) => {
            let error = recoverable(e)?;
            warn!(error = %error, "could not load activities");
            Ok(views::activities_page(
                &user,
                &[],
                Some("Erro ao carregar atividades. Tente novamente."),
            ))
        }
    }
}

#[instrument(name = "production", skip_all)]
pub async fn production(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
) -> WebResult<Html<String>> {
    let user = current_user(&context).await?;
    let client = state.api.with_session(context.handle());

    let orders = match client.list(Resource::ProductionOrders).await {
        Ok(orders) => orders,
        Err(e) => {
            let error = recoverable(e)?;
            warn!(error = %error, "could not load production orders");
            return Ok(views::production_page(
                &user,
                &[],
                Some("Erro ao buscar dados da API"),
            ));
        }
    };

    // Creator names are a nice-to-have
    let orders = match client.list(Resource::Users).await {
        Ok(users) => enrich::enrich_orders(orders, &enrich::creator_names(&users)),
        Err(e) => {
            let error = recoverable(e)?;
            warn!(error = %error, "could not load users, creator names omitted");
            orders
        }
    };

    Ok(views::production_page(&user, &orders, None))
}

#[instrument(name = "indicators", skip_all)]
pub async fn indicators(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
) -> WebResult<Html<String>> {
    let user = current_user(&context).await?;

    match state
        .api
        .with_session(context.handle())
        .list(Resource::ProductionOrders)
        .await
    {
        Ok(orders) => Ok(views::indicators_page(
            &user,
            &Indicators::from_orders(&orders),
            None,
        )),
        Err(e) => {
            let error = recoverable(e)?;
            warn!(error = %error, "could not load indicators");
            Ok(views::indicators_page(
                &user,
                &Indicators::default(),
                Some("Erro ao carregar indicadores"),
            ))
        }
    }
}
