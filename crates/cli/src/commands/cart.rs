//! `bazaar cart show|add|remove`

use bazaar_core::{Cart, ProductId};

use super::{CliError, Page, flush_notification};

/// Print the cart lines and total.
pub async fn show(page: &mut Page) -> Result<(), CliError> {
    let result = page.load().await;
    flush_notification(page);
    result?;

    print_cart(page.cart());
    Ok(())
}

/// Add one of a product, or remove one when `decrement`.
pub async fn change(page: &mut Page, product_id: &str, decrement: bool) -> Result<(), CliError> {
    let product_id = ProductId::new(product_id);

    let mut result = page.load().await;
    if result.is_ok() {
        result = page.add_to_cart(&product_id, decrement).await;
    }
    flush_notification(page);
    result?;

    print_cart(page.cart());
    Ok(())
}

pub fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in cart.items() {
        println!(
            "{:<32} x{:<4} {:>14}",
            item.product.name,
            item.quantity,
            item.line_total().to_inr()
        );
    }
    println!("{:<38} {:>14}", "Total", cart.total().to_inr());
}
