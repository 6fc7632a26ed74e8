//! Order placement sequencer.
//!
//! Runs only after the payment gateway has confirmed a charge. Strictly
//! sequential, no parallel branches:
//!
//! 1. create the order record (fatal on failure)
//! 2. create the order-item records (fatal on failure)
//! 3. decrement stock per product (fatal on failure)
//! 4. send the confirmation email (logged, never fatal)
//! 5. clear the cart and hand back the gateway reference
//!
//! A fatal failure aborts, preserves the cart for retry/manual recovery,
//! and surfaces a support-contact message to the buyer; the charge is not
//! automatically refunded here. There is no cancellation path once step 1
//! begins.
//!
//! # Known, accepted race
//!
//! Step 3 reads current stock immediately before writing `max(0, stock −
//! quantity)` with no concurrency token and no transaction around the
//! read-then-write. Two buyers checking out the last unit concurrently can
//! both succeed; stock floors at zero and the second order oversells. At
//! boutique volume this is accepted rather than fixed — do not "repair" it
//! with a compare-and-swap without revisiting the consistency discussion in
//! DESIGN.md.

use std::collections::BTreeMap;

use maison_core::cart::{Cart, CartStorage};
use maison_core::{Email, OrderId, OrderStatus, PaymentStatus, Price, ProductId};

use crate::db::RepositoryError;
use crate::services::mailer::MailerError;

/// Customer-entered checkout form, captured denormalized onto the order.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub order_notes: Option<String>,
}

impl CheckoutForm {
    /// The full name stored on the order record.
    #[must_use]
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// A new order record, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub order_notes: Option<String>,
    pub total_amount: Price,
    pub payment_reference: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
}

/// A new order line, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// The cart line's snapshotted effective price — never re-resolved
    /// from current catalog state.
    pub price_at_purchase: Price,
}

/// Persistence seam for the sequencer's writes.
///
/// The production implementation is [`crate::db::OrderRepository`]; tests
/// run against an in-memory fake.
pub trait CheckoutStore {
    /// Insert the order record and return its id.
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderId, RepositoryError>> + Send;

    /// Bulk-insert the order's lines.
    fn insert_order_items(
        &self,
        items: &[NewOrderItem],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Current stock of a product, `None` if the product no longer exists.
    fn stock_of(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<i32>, RepositoryError>> + Send;

    /// Write a product's stock and its derived `in_stock` flag.
    fn set_stock(
        &self,
        product_id: ProductId,
        stock: i32,
        in_stock: bool,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// One rendered line of the confirmation email.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationLine {
    pub product_name: String,
    pub quantity: u32,
    pub line_total: Price,
}

/// Everything the confirmation email needs.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail {
    pub to: Email,
    pub recipient_name: String,
    pub order_reference: String,
    pub items: Vec<ConfirmationLine>,
    pub total: Price,
    pub address: String,
    pub city: String,
    pub state: String,
    /// Tells the buyer shipment is deferred until the drop's release time.
    /// Messaging only; fulfillment is not blocked.
    pub includes_drop: bool,
}

/// Notification seam; failures are logged by the sequencer, never fatal.
pub trait ConfirmationMailer {
    /// Send the order confirmation.
    fn send_confirmation(
        &self,
        email: &ConfirmationEmail,
    ) -> impl Future<Output = Result<(), MailerError>> + Send;
}

/// Errors that abort order placement.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Placement was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The order record could not be written. The payment went through;
    /// the buyer is told to contact support and the cart is preserved.
    #[error("failed to record order: {0}")]
    OrderWrite(#[source] RepositoryError),

    /// The order lines could not be written. Same handling as
    /// [`CheckoutError::OrderWrite`].
    #[error("failed to record order items: {0}")]
    OrderItemsWrite(#[source] RepositoryError),

    /// The stock decrement could not be applied. The order exists at this
    /// point, so this fails loudly rather than being swallowed.
    #[error("failed to update stock: {0}")]
    StockWrite(#[source] RepositoryError),
}

/// The sequencer's result: what the buyer sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    /// The gateway's transaction reference — the buyer-visible order id.
    pub reference: String,
    pub includes_drop: bool,
}

/// Place an order from the cart's contents, after payment confirmation.
///
/// `reference` is the gateway's transaction reference for the charge that
/// was just confirmed.
///
/// # Errors
///
/// Returns [`CheckoutError`] on any fatal step; the cart is left intact in
/// that case so recovery is possible.
pub async fn place_order<St, M, Cs>(
    store: &St,
    mailer: &M,
    cart: &mut Cart<Cs>,
    form: &CheckoutForm,
    reference: &str,
) -> Result<PlacedOrder, CheckoutError>
where
    St: CheckoutStore,
    M: ConfirmationMailer,
    Cs: CartStorage,
{
    if cart.lines().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let total = cart.total();
    let includes_drop = cart.has_drop_item();

    // Step 1: the order record.
    let order = NewOrder {
        customer_name: form.customer_name(),
        customer_email: form.email.clone(),
        customer_phone: form.phone.clone(),
        shipping_address: form.address.clone(),
        shipping_city: form.city.clone(),
        shipping_state: form.state.clone(),
        order_notes: form.order_notes.clone(),
        total_amount: total,
        payment_reference: reference.to_owned(),
        payment_status: PaymentStatus::Paid,
        order_status: OrderStatus::Processing,
    };
    let order_id = store
        .insert_order(&order)
        .await
        .map_err(CheckoutError::OrderWrite)?;

    // Step 2: the order lines, priced from the cart snapshot.
    let items: Vec<NewOrderItem> = cart
        .lines()
        .iter()
        .map(|line| NewOrderItem {
            order_id,
            product_id: line.product_id,
            product_name: line.name.clone(),
            quantity: line.quantity,
            price_at_purchase: line.price,
        })
        .collect();
    store
        .insert_order_items(&items)
        .await
        .map_err(CheckoutError::OrderItemsWrite)?;

    // Step 3: stock decrement, grouped per product. Read-then-write; see
    // the module docs for the accepted last-unit race.
    let mut sold: BTreeMap<ProductId, u32> = BTreeMap::new();
    for line in cart.lines() {
        *sold.entry(line.product_id).or_default() += line.quantity;
    }
    for (product_id, quantity) in sold {
        let Some(stock) = store
            .stock_of(product_id)
            .await
            .map_err(CheckoutError::StockWrite)?
        else {
            // Product deleted between carting and checkout; nothing to
            // decrement.
            continue;
        };
        let new_stock = (stock - i32::try_from(quantity).unwrap_or(i32::MAX)).max(0);
        store
            .set_stock(product_id, new_stock, new_stock > 0)
            .await
            .map_err(CheckoutError::StockWrite)?;
    }

    // Step 4: confirmation email, best-effort.
    let confirmation = ConfirmationEmail {
        to: form.email.clone(),
        recipient_name: form.first_name.clone(),
        order_reference: reference.to_owned(),
        items: items
            .iter()
            .map(|item| ConfirmationLine {
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                line_total: item.price_at_purchase.times(item.quantity),
            })
            .collect(),
        total,
        address: form.address.clone(),
        city: form.city.clone(),
        state: form.state.clone(),
        includes_drop,
    };
    if let Err(error) = mailer.send_confirmation(&confirmation).await {
        tracing::warn!(%error, %reference, "confirmation email failed, continuing");
    }

    // Step 5: empty the cart and report the gateway reference.
    if let Err(error) = cart.clear() {
        tracing::warn!(%error, %reference, "failed to clear cart after placement");
    }

    Ok(PlacedOrder {
        order_id,
        reference: reference.to_owned(),
        includes_drop,
    })
}
