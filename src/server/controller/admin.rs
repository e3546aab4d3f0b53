use crate::server::controller::error::CustomError;
use crate::server::controller::{bearer_token, require_admin};
use crate::server::database::store::Store;
use crate::server::model::admin::{LoginRequest, LoginResponse, MenuChangeResponse};
use crate::server::model::bill::{BillId, GetBillResponse};
use crate::server::model::menu::MenuItemForm;
use crate::server::model::order::{GetOrdersResponse, OrderHistoryView};
use crate::server::model::CommonRequestParams;
use crate::server::service::{auth, catalog};
use crate::server::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use anyhow::Context;
use log::{error, info};

pub(crate) async fn post_login<S: Store>(
    body: web::Json<LoginRequest>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<LoginResponse>, CustomError> {
    let LoginRequest { username, password } = body.into_inner();
    let token = auth::login(data.store(), &data.sessions(), &username, &password).await?;
    Ok(web::Json(LoginResponse { token, username }))
}

pub(crate) async fn post_logout<S: Store>(req: HttpRequest, data: web::Data<AppState<S>>) -> Result<HttpResponse, CustomError> {
    let username = require_admin(&req, &data)?;
    if let Some(token) = bearer_token(&req) {
        data.sessions().revoke(token);
    }
    info!("admin {} logged out", username);
    Ok(HttpResponse::Ok().finish())
}

async fn reloaded<S: Store>(data: &AppState<S>, message: &str) -> Result<web::Json<MenuChangeResponse>, CustomError> {
    Ok(web::Json(MenuChangeResponse {
        message: message.to_string(),
        items: catalog::list_menu(data.store()).await?,
    }))
}

pub(crate) async fn post_menu_item<S: Store>(
    req: HttpRequest,
    body: web::Json<MenuItemForm>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<MenuChangeResponse>, CustomError> {
    require_admin(&req, &data)?;
    catalog::add_menu_item(data.store(), &body).await?;
    reloaded(&data, "Menu item added.").await
}

pub(crate) async fn put_menu_item<S: Store>(
    req: HttpRequest,
    id: web::Path<String>,
    body: web::Json<MenuItemForm>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<MenuChangeResponse>, CustomError> {
    require_admin(&req, &data)?;
    catalog::update_menu_item(data.store(), &id, &body).await?;
    reloaded(&data, "Menu item updated.").await
}

pub(crate) async fn delete_menu_item<S: Store>(
    req: HttpRequest,
    id: web::Path<String>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<MenuChangeResponse>, CustomError> {
    require_admin(&req, &data)?;
    catalog::delete_menu_item(data.store(), &id).await?;
    reloaded(&data, "Menu item deleted.").await
}

/// order history, newest bill first
pub(crate) async fn get_orders<S: Store>(
    req: HttpRequest,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<GetOrdersResponse>, CustomError> {
    require_admin(&req, &data)?;
    let params = web::Query::<CommonRequestParams>::from_query(req.query_string())
        .context("failed to parse query string")
        .map_err(|e| CustomError::BadRequest(e.to_string()))?
        .into_inner();
    let (offset, limit) = params.offset_limit();
    let entries = data.store().order_history(offset, limit).await.map_err(|e| {
        error!("get_orders failed, {}", e);
        CustomError::from(e)
    })?;
    Ok(web::Json(GetOrdersResponse {
        orders: entries.iter().map(OrderHistoryView::from).collect(),
    }))
}

/// one bill with its order lines
pub(crate) async fn get_bill<S: Store>(
    req: HttpRequest,
    id: web::Path<String>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<GetBillResponse>, CustomError> {
    require_admin(&req, &data)?;
    let bill_id: BillId = id
        .trim()
        .parse()
        .map_err(|_| CustomError::BadRequest(format!("invalid bill id: {}", id.as_str())))?;
    let bill = data
        .store()
        .find_bill(bill_id)
        .await
        .map_err(|e| {
            error!("get_bill failed, {}", e);
            CustomError::from(e)
        })?
        .ok_or_else(|| CustomError::ResourceNotFound(format!("No bill found with ID: {bill_id}")))?;
    Ok(web::Json(GetBillResponse::from(&bill)))
}
