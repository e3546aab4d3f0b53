use crate::server::controller::error::CustomError;
use crate::server::database::store::Store;
use crate::server::model::bill::BillReceipt;
use crate::server::model::cart::{check_quantity, Cart};
use crate::server::model::menu::MenuItemId;
use crate::server::model::InputError;
use crate::server::util::money::format_money;
use log::{info, warn};

/// Put `quantity` of a menu item into the cart, priced as the menu reads now.
pub(crate) async fn add_to_cart<S: Store>(
    store: &S,
    cart: &mut Cart,
    menu_item_id: MenuItemId,
    quantity: u32,
) -> Result<(), CustomError> {
    check_quantity(quantity)?;
    let item = store
        .find_menu_item(menu_item_id)
        .await
        .map_err(|e| {
            warn!("add_to_cart failed, {}", e);
            CustomError::from(e)
        })?
        .ok_or_else(|| CustomError::ResourceNotFound(format!("No menu item found with ID: {menu_item_id}")))?;
    cart.add(&item, quantity)?;
    Ok(())
}

/// Persist the cart as one bill and clear it.
///
/// Either the bill and all of its order lines are committed or nothing is,
/// and the cart is only cleared in the first case.
pub(crate) async fn finalize<S: Store>(store: &S, cart: &mut Cart) -> Result<BillReceipt, CustomError> {
    if cart.is_empty() {
        return Err(InputError::EmptyCart.into());
    }
    let lines = cart.order_lines();
    let receipt = store.create_bill(cart.total(), &lines).await.map_err(|e| {
        warn!("finalize failed, {}", e);
        CustomError::from(e)
    })?;
    info!(
        "Bill #{} finalized successfully, total={}",
        receipt.bill_id,
        format_money(receipt.total_amount)
    );
    cart.clear();
    Ok(receipt)
}
