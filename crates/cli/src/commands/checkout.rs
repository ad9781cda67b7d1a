//! `bazaar checkout`
//!
//! Creates the shipment and UPI payment, prints the QR code URL and waits
//! for the shopper to pay and answer Done or Cancel.

use dialoguer::Select;

use super::cart::print_cart;
use super::{CliError, Page, flush_notification};

const DONE: usize = 0;

/// Run the checkout for the current cart.
pub async fn run(page: &mut Page, address: &str, billing_address: &str) -> Result<(), CliError> {
    let result = page.load().await;
    flush_notification(page);
    result?;

    page.set_shipment_address(address);
    page.set_billing_address(billing_address);
    if page.cart().is_empty() {
        return Err(CliError::CheckoutUnavailable("the cart is empty"));
    }
    if !page.can_checkout() {
        return Err(CliError::CheckoutUnavailable(
            "shipment and billing addresses are required",
        ));
    }

    print_cart(page.cart());

    let result = page.checkout().await;
    flush_notification(page);
    let pending = result?;

    println!();
    println!("Scan to pay with UPI: {}", pending.qr_code_url);
    println!("Payment ID: {}", pending.payment_id);

    loop {
        let choice = Select::new()
            .with_prompt("Payment complete?")
            .items(&["Done", "Cancel"])
            .default(DONE)
            .interact()?;

        if choice != DONE {
            page.cancel_payment();
            println!("Payment cancelled.");
            return Ok(());
        }

        let result = page.confirm_payment().await;
        flush_notification(page);
        match result {
            Ok(receipt) => {
                println!("Shipment: {}", receipt.shipment_id);
                return Ok(());
            }
            // Payment is still pending; let the shopper retry or cancel.
            Err(e) if page.pending_payment().is_some() && !e.is_silent() => {}
            Err(e) => return Err(e.into()),
        }
    }
}
