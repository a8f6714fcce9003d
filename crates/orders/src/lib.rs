//! Orders domain module: the basket and the two-step checkout.
//!
//! Pure, deterministic state (no IO, no event plumbing). Callers learn whether
//! an operation changed anything from its return value and publish accordingly.

pub mod basket;
pub mod checkout;
pub mod draft;

pub use basket::{Basket, BasketLine};
pub use checkout::{Checkout, FormState, ValidationErrors};
pub use draft::{FormField, OrderDraft, OrderResult, OrderSnapshot, PaymentMethod, Step};
