use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, OrderId, Price, ProductId};

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(alias = "card")]
    Online,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" | "card" => Ok(PaymentMethod::Online),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(DomainError::validation(format!("unknown payment method: {other}"))),
        }
    }
}

/// Checkout sub-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Step 1: payment method and delivery address.
    Payment,
    /// Step 2: email and phone.
    Contacts,
}

impl Step {
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            Step::Payment => &[FormField::Payment, FormField::Address],
            Step::Contacts => &[FormField::Email, FormField::Phone],
        }
    }
}

/// Editable order field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Payment,
    Address,
    Email,
    Phone,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Payment => "payment",
            FormField::Address => "address",
            FormField::Email => "email",
            FormField::Phone => "phone",
        }
    }

    pub fn step(&self) -> Step {
        match self {
            FormField::Payment | FormField::Address => Step::Payment,
            FormField::Email | FormField::Phone => Step::Contacts,
        }
    }
}

impl core::fmt::Display for FormField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(FormField::Payment),
            "address" => Ok(FormField::Address),
            "email" => Ok(FormField::Email),
            "phone" => Ok(FormField::Phone),
            other => Err(DomainError::validation(format!("unknown order field: {other}"))),
        }
    }
}

/// The order being filled in. Every field starts unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    pub payment: Option<PaymentMethod>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl OrderDraft {
    /// Store a raw form value. An unrecognised payment value leaves payment unset.
    pub fn set(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Payment => self.payment = value.parse().ok(),
            FormField::Address => self.address = Some(value.to_owned()),
            FormField::Email => self.email = Some(value.to_owned()),
            FormField::Phone => self.phone = Some(value.to_owned()),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What gets sent to the backend: the draft's fields plus a snapshot of the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub payment: PaymentMethod,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub total: Price,
    pub items: Vec<ProductId>,
}

/// Backend acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: OrderId,
    pub total: Price,
}
