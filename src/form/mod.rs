//! Property create/edit form controller.
//!
//! Three layers: the currency mask ([`currency`]), the staged image set
//! with its preview-URL registry ([`images`]), and the draft controller
//! that validates and submits the record ([`controller`]).

pub mod controller;
pub mod currency;
pub mod images;

pub use controller::{FieldError, FormMode, PropertyForm, SubmitError};
pub use currency::CurrencyField;
pub use images::{ImageStaging, StagingError};
