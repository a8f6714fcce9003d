//! Two-step checkout form validation.
//!
//! Validity is a pure function of the current draft. Which errors are *shown*
//! also depends on which fields the user has touched: a field nobody has typed
//! into stays silent until the step is revealed (the user tried to move past it).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use storefront_core::{DomainError, DomainResult};

use crate::basket::Basket;
use crate::draft::{FormField, OrderDraft, OrderSnapshot, Step};

const PAYMENT_REQUIRED: &str = "Select a payment method";
const ADDRESS_REQUIRED: &str = "Enter a delivery address";
const EMAIL_REQUIRED: &str = "Enter an email";
const PHONE_REQUIRED: &str = "Enter a phone number";

/// Field-keyed error messages, rebuilt from scratch on every validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<FormField, String>);

impl ValidationErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// All messages on one line, in field order, for the form's error slot.
    pub fn summary(&self) -> String {
        self.0.values().map(String::as_str).collect::<Vec<_>>().join("; ")
    }
}

/// What a form view needs to re-render after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub step: Step,
    pub valid: bool,
    pub errors: ValidationErrors,
}

/// Order draft plus its validation state.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    draft: OrderDraft,
    touched: BTreeSet<FormField>,
    errors: ValidationErrors,
}

impl Checkout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Errors from the most recent validation.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    /// Store a raw value and revalidate the field's whole step.
    pub fn set_field(&mut self, field: FormField, value: &str) -> FormState {
        self.draft.set(field, value);
        self.touched.insert(field);
        self.validate_step(field.step())
    }

    /// Recompute errors for `step` against current values.
    ///
    /// Values are kept; untouched fields never produce a message here.
    pub fn validate_step(&mut self, step: Step) -> FormState {
        self.errors = self.errors_for(step);
        FormState {
            step,
            valid: self.is_step_valid(step),
            errors: self.errors.clone(),
        }
    }

    /// Errors `step` would show right now, without changing what was last validated.
    pub fn errors_for(&self, step: Step) -> ValidationErrors {
        let errors: BTreeMap<FormField, String> = step
            .fields()
            .iter()
            .filter(|field| self.touched.contains(*field))
            .filter_map(|&field| field_error(&self.draft, field).map(|msg| (field, msg.to_owned())))
            .collect();
        ValidationErrors(errors)
    }

    /// Treat every field of `step` as touched, then validate.
    pub fn reveal_step(&mut self, step: Step) -> FormState {
        self.touched.extend(step.fields().iter().copied());
        self.validate_step(step)
    }

    /// Pure validity check, independent of what has been touched.
    pub fn is_step_valid(&self, step: Step) -> bool {
        step.fields()
            .iter()
            .all(|&field| field_error(&self.draft, field).is_none())
    }

    /// Forget everything typed so far.
    pub fn reset(&mut self) {
        self.draft.clear();
        self.touched.clear();
        self.errors = ValidationErrors::default();
    }

    /// Freeze the draft and the basket into a submittable order.
    pub fn snapshot(&self, basket: &Basket) -> DomainResult<OrderSnapshot> {
        if basket.is_empty() {
            return Err(DomainError::EmptyBasket);
        }

        let missing: Vec<&str> = [Step::Payment, Step::Contacts]
            .iter()
            .flat_map(|step| step.fields())
            .filter(|&&field| field_error(&self.draft, field).is_some())
            .map(|field| field.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "order is incomplete: {}",
                missing.join(", ")
            )));
        }

        match &self.draft {
            OrderDraft {
                payment: Some(payment),
                address: Some(address),
                email: Some(email),
                phone: Some(phone),
            } => Ok(OrderSnapshot {
                payment: *payment,
                email: email.clone(),
                phone: phone.clone(),
                address: address.clone(),
                total: basket.total(),
                items: basket.ids(),
            }),
            _ => Err(DomainError::validation("order is incomplete")),
        }
    }
}

fn field_error(draft: &OrderDraft, field: FormField) -> Option<&'static str> {
    let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

    match field {
        FormField::Payment => draft.payment.is_none().then_some(PAYMENT_REQUIRED),
        FormField::Address => (!present(&draft.address)).then_some(ADDRESS_REQUIRED),
        FormField::Email => (!present(&draft.email)).then_some(EMAIL_REQUIRED),
        FormField::Phone => (!present(&draft.phone)).then_some(PHONE_REQUIRED),
    }
}
