use crate::server::controller::error::CustomError;
use crate::server::database::error::DbError;
use crate::server::database::store::Store;
use crate::server::model::menu::{parse_menu_item_id, MenuItem, MenuItemDraft, MenuItemForm};
use log::{info, warn};

fn not_found(id: i32) -> impl FnOnce(DbError) -> CustomError {
    move |e| match e {
        DbError::NoRowsAffected => CustomError::ResourceNotFound(format!("No menu item found with ID: {id}")),
        e => CustomError::from(e),
    }
}

pub(crate) async fn list_menu<S: Store>(store: &S) -> Result<Vec<MenuItem>, CustomError> {
    store.list_menu().await.map_err(|e| {
        warn!("list_menu failed, {}", e);
        CustomError::from(e)
    })
}

/// Validate the form, then insert it under the next free id.
pub(crate) async fn add_menu_item<S: Store>(store: &S, form: &MenuItemForm) -> Result<MenuItem, CustomError> {
    let draft = MenuItemDraft::try_from(form)?;
    let item = store.add_menu_item(&draft).await.map_err(|e| {
        warn!("add_menu_item failed, {}", e);
        CustomError::from(e)
    })?;
    info!("menu item {} added, id={}", item.name, item.id);
    Ok(item)
}

pub(crate) async fn update_menu_item<S: Store>(store: &S, id: &str, form: &MenuItemForm) -> Result<MenuItem, CustomError> {
    let id = parse_menu_item_id(id)?;
    let draft = MenuItemDraft::try_from(form)?;
    let item = store
        .update_menu_item(id, &draft)
        .await
        .map_err(not_found(id))?;
    info!("menu item id={} updated", id);
    Ok(item)
}

pub(crate) async fn delete_menu_item<S: Store>(store: &S, id: &str) -> Result<(), CustomError> {
    let id = parse_menu_item_id(id)?;
    store.delete_menu_item(id).await.map_err(not_found(id))?;
    info!("menu item id={} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::database::memory::MemoryStore;
    use crate::server::model::InputError;
    use rust_decimal::Decimal;

    fn form(name: &str, price: &str) -> MenuItemForm {
        MenuItemForm {
            name: name.to_string(),
            price: price.to_string(),
        }
    }

    #[tokio::test]
    async fn add_uses_next_id() {
        let store = MemoryStore::with_menu(&[("Tea", Decimal::new(150, 2)), ("Coffee", Decimal::new(200, 2))]);
        let item = add_menu_item(&store, &form("Cake", "3.75")).await.unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.price, Decimal::new(375, 2));
        assert_eq!(list_menu(&store).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn menu_and_cart_show_the_same_price() {
        let store = MemoryStore::new();
        let item = add_menu_item(&store, &form("Tea", "5.5")).await.unwrap();
        let served = serde_json::to_value(&list_menu(&store).await.unwrap()[0]).unwrap();
        assert_eq!(served["price"], "5.50");

        let mut cart = crate::server::model::cart::Cart::new();
        cart.add(&item, 1).unwrap();
        let view = crate::server::model::cart::GetCartResponse::from(&cart);
        assert_eq!(served["price"], view.items[0].price.as_str());
    }

    #[tokio::test]
    async fn add_to_empty_menu_starts_at_one() {
        let store = MemoryStore::new();
        assert_eq!(add_menu_item(&store, &form("Tea", "1")).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_store() {
        let store = MemoryStore::new();
        for (name, price) in [("", "5.00"), ("Tea", "0"), ("Tea", "-1"), ("Tea", "abc")] {
            assert!(matches!(
                add_menu_item(&store, &form(name, price)).await,
                Err(CustomError::BadRequest(_))
            ));
        }
        assert!(update_menu_item(&store, "x1", &form("Tea", "1.00")).await.is_err());
        assert_eq!(
            delete_menu_item(&store, "").await.unwrap_err(),
            CustomError::BadRequest(InputError::InvalidId.to_string())
        );
        assert_eq!(store.state().calls, 0);
    }

    #[tokio::test]
    async fn update_only_touches_target() {
        let store = MemoryStore::with_menu(&[("Tea", Decimal::new(150, 2)), ("Coffee", Decimal::new(200, 2))]);
        update_menu_item(&store, "2", &form("Latte", "2.80")).await.unwrap();
        let menu = list_menu(&store).await.unwrap();
        assert_eq!(menu[0].name, "Tea");
        assert_eq!(menu[0].price, Decimal::new(150, 2));
        assert_eq!(menu[1].name, "Latte");
        assert_eq!(menu[1].price, Decimal::new(280, 2));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryStore::with_menu(&[("Tea", Decimal::new(150, 2))]);
        assert_eq!(
            update_menu_item(&store, "7", &form("Latte", "2.80")).await.unwrap_err(),
            CustomError::ResourceNotFound("No menu item found with ID: 7".to_string())
        );
        assert_eq!(
            delete_menu_item(&store, "7").await.unwrap_err(),
            CustomError::ResourceNotFound("No menu item found with ID: 7".to_string())
        );
        delete_menu_item(&store, "1").await.unwrap();
        assert!(list_menu(&store).await.unwrap().is_empty());
    }
}
