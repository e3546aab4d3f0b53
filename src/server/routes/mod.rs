use crate::server::controller::{admin, cart, menu};
use crate::server::database::store::Store;
use actix_web::web;

/// mount every endpoint for a state backed by `S`
pub(crate) fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/v1/menu").route(web::get().to(menu::get_menu::<S>)))
        .service(web::resource("/v1/cart/{terminal}").route(web::get().to(cart::get_cart::<S>)))
        .service(web::resource("/v1/cart/{terminal}/items").route(web::post().to(cart::post_cart_item::<S>)))
        .service(
            web::resource("/v1/cart/{terminal}/items/{menu_item_id}")
                .route(web::patch().to(cart::patch_cart_item::<S>))
                .route(web::delete().to(cart::delete_cart_item::<S>)),
        )
        .service(web::resource("/v1/cart/{terminal}/finalize").route(web::post().to(cart::post_finalize::<S>)))
        .service(web::resource("/v1/admin/login").route(web::post().to(admin::post_login::<S>)))
        .service(web::resource("/v1/admin/logout").route(web::post().to(admin::post_logout::<S>)))
        .service(web::resource("/v1/admin/menu").route(web::post().to(admin::post_menu_item::<S>)))
        .service(
            web::resource("/v1/admin/menu/{id}")
                .route(web::put().to(admin::put_menu_item::<S>))
                .route(web::delete().to(admin::delete_menu_item::<S>)),
        )
        .service(web::resource("/v1/admin/orders").route(web::get().to(admin::get_orders::<S>)))
        .service(web::resource("/v1/admin/bills/{id}").route(web::get().to(admin::get_bill::<S>)));
}
