use crate::server::controller::check_terminal;
use crate::server::controller::error::CustomError;
use crate::server::database::store::Store;
use crate::server::model::bill::PostFinalizeResponse;
use crate::server::model::cart::{Cart, GetCartResponse, PatchCartItemRequest, PostCartItemRequest};
use crate::server::model::menu::parse_menu_item_id;
use crate::server::model::InputError;
use crate::server::service::checkout;
use crate::server::state::AppState;
use actix_web::web;

/// current order of a terminal
pub(crate) async fn get_cart<S: Store>(
    terminal: web::Path<String>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<GetCartResponse>, CustomError> {
    match data.carts().existing(check_terminal(&terminal)?) {
        Some(cart) => Ok(web::Json(GetCartResponse::from(&*cart.lock().await))),
        None => Ok(web::Json(GetCartResponse::from(&Cart::new()))),
    }
}

/// add a menu item, merging with a line already in the cart; the only route that opens a cart
pub(crate) async fn post_cart_item<S: Store>(
    terminal: web::Path<String>,
    body: web::Json<PostCartItemRequest>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<GetCartResponse>, CustomError> {
    let terminal = check_terminal(&terminal)?;
    let cart = data.carts().cart(terminal);
    let added = {
        let mut cart = cart.lock().await;
        checkout::add_to_cart(data.store(), &mut cart, body.menu_item_id, body.quantity)
            .await
            .map(|()| GetCartResponse::from(&*cart))
    };
    drop(cart);
    if added.is_err() {
        data.carts().prune(terminal);
    }
    Ok(web::Json(added?))
}

pub(crate) async fn patch_cart_item<S: Store>(
    path: web::Path<(String, String)>,
    body: web::Json<PatchCartItemRequest>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<GetCartResponse>, CustomError> {
    let (terminal, menu_item_id) = path.into_inner();
    let menu_item_id = parse_menu_item_id(&menu_item_id)?;
    let cart = data
        .carts()
        .existing(check_terminal(&terminal)?)
        .ok_or(InputError::NotInCart(menu_item_id))?;
    let mut cart = cart.lock().await;
    cart.set_quantity(menu_item_id, body.quantity)?;
    Ok(web::Json(GetCartResponse::from(&*cart)))
}

pub(crate) async fn delete_cart_item<S: Store>(
    path: web::Path<(String, String)>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<GetCartResponse>, CustomError> {
    let (terminal, menu_item_id) = path.into_inner();
    let menu_item_id = parse_menu_item_id(&menu_item_id)?;
    let terminal = check_terminal(&terminal)?;
    let cart = data
        .carts()
        .existing(terminal)
        .ok_or(InputError::NotInCart(menu_item_id))?;
    let view = {
        let mut cart = cart.lock().await;
        cart.remove(menu_item_id)?;
        GetCartResponse::from(&*cart)
    };
    drop(cart);
    data.carts().prune(terminal);
    Ok(web::Json(view))
}

/// turn the cart into a bill
pub(crate) async fn post_finalize<S: Store>(
    terminal: web::Path<String>,
    data: web::Data<AppState<S>>,
) -> Result<web::Json<PostFinalizeResponse>, CustomError> {
    let terminal = check_terminal(&terminal)?;
    let cart = data.carts().existing(terminal).ok_or(InputError::EmptyCart)?;
    let receipt = checkout::finalize(data.store(), &mut *cart.lock().await).await?;
    drop(cart);
    data.carts().prune(terminal);
    Ok(web::Json(PostFinalizeResponse::from(&receipt)))
}
