//! `bazaar products`

use bazaar_core::Product;

use super::{CliError, Page, flush_notification};

/// Print the catalog, or the products matching `search`.
pub async fn list(page: &mut Page, search: Option<&str>) -> Result<(), CliError> {
    let result = match search {
        Some(query) => {
            page.set_search_query(query);
            page.search().await
        }
        None => page.load().await,
    };
    flush_notification(page);
    result?;

    print_products(page.products());
    Ok(())
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    for product in products {
        println!(
            "{:<26} {:<32} {:>14}",
            product.id,
            product.name,
            product.price.to_inr()
        );
    }
}
