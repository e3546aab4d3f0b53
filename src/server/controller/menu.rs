use crate::server::controller::error::CustomError;
use crate::server::database::store::Store;
use crate::server::model::menu::GetMenuResponse;
use crate::server::service::catalog;
use crate::server::state::AppState;
use actix_web::web;

/// get the whole menu
pub(crate) async fn get_menu<S: Store>(data: web::Data<AppState<S>>) -> Result<web::Json<GetMenuResponse>, CustomError> {
    let items = catalog::list_menu(data.store()).await?;
    Ok(web::Json(GetMenuResponse { items }))
}
