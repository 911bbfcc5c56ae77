//! Property draft controller for the create and edit flows.
//!
//! DESIGN
//! ======
//! The draft is an explicit struct rather than a loose field bag: one typed
//! field per domain attribute, with [`CurrencyField`] owning the
//! display/storage pair for masked inputs and plain string buffers for the
//! optional numeric inputs (invalid text in those is treated as absent,
//! not as an error).
//!
//! Role gating (`is_launch`, the sale purpose) is a UX nicety; the backend
//! re-checks everything. Submission is all-or-nothing on the client: a
//! rejected submission leaves the draft and the staged files untouched so
//! the user can retry without re-entering anything.

use tracing::info;

use crate::config::{ClientConfig, CurrencyLocale};
use crate::form::currency::CurrencyField;
use crate::form::images::{ImageStaging, StagingError};
use crate::model::{PropertyLimits, PropertyRecord, PropertyType, Purpose, StagedFile};
use crate::net::{ApiError, PropertyBackend, SubmissionPayload};
use crate::session::SessionContext;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing an existing record; the id is carried, never mutated.
    Edit { id: String },
}

/// Field-scoped validation failure, surfaced inline next to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("validation failed for {} field(s)", .0.len())]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    /// Single user-facing message: the backend's verbatim detail for API
    /// rejections, a generic prompt for local validation.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(_) => "Verifique os campos destacados e tente novamente.".to_owned(),
            Self::Api(err) => err.user_message(),
        }
    }
}

// =============================================================================
// FORM
// =============================================================================

pub struct PropertyForm {
    mode: FormMode,
    session: SessionContext,
    locale: CurrencyLocale,

    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    purpose: Purpose,
    price: CurrencyField,
    pub neighborhood: String,
    pub city: String,
    pub state: String,

    // Optional numeric inputs, kept as raw text buffers.
    pub bedrooms: String,
    pub bathrooms: String,
    pub area: String,
    pub garage: String,
    pub year_built: String,

    condominio: CurrencyField,
    iptu: CurrencyField,

    /// Comma-separated tags, sent raw; the backend splits.
    pub features: String,
    is_launch: bool,

    images: ImageStaging,
}

impl PropertyForm {
    /// Fresh create-mode draft for the given account.
    #[must_use]
    pub fn new_create(session: SessionContext, config: &ClientConfig) -> Self {
        let purpose = session.role.default_purpose();
        Self {
            mode: FormMode::Create,
            locale: config.currency_locale,
            session,
            title: String::new(),
            description: String::new(),
            property_type: PropertyType::Apartamento,
            purpose,
            price: CurrencyField::default(),
            neighborhood: String::new(),
            city: String::new(),
            state: String::new(),
            bedrooms: String::new(),
            bathrooms: String::new(),
            area: String::new(),
            garage: String::new(),
            year_built: String::new(),
            condominio: CurrencyField::default(),
            iptu: CurrencyField::default(),
            features: String::new(),
            is_launch: false,
            images: ImageStaging::new(),
        }
    }

    /// Edit-mode draft prefilled from a fetched record.
    #[must_use]
    pub fn new_edit(session: SessionContext, config: &ClientConfig, record: PropertyRecord) -> Self {
        let mut form = Self::new_create(session, config);
        form.mode = FormMode::Edit { id: record.id };
        form.title = record.title;
        form.description = record.description;
        form.property_type = record.property_type;
        form.purpose = record.purpose;
        form.price.hydrate(record.price, &form.locale);
        form.neighborhood = record.neighborhood;
        form.city = record.city;
        form.state = record.state;
        form.bedrooms = record.bedrooms.map(|v| v.to_string()).unwrap_or_default();
        form.bathrooms = record.bathrooms.map(|v| v.to_string()).unwrap_or_default();
        form.area = record.area.map(|v| v.to_string()).unwrap_or_default();
        form.garage = record.garage.map(|v| v.to_string()).unwrap_or_default();
        form.year_built = record.year_built.map(|v| v.to_string()).unwrap_or_default();
        if let Some(amount) = record.condominio {
            form.condominio.hydrate(amount, &form.locale);
        }
        if let Some(amount) = record.iptu {
            form.iptu.hydrate(amount, &form.locale);
        }
        form.features = record.features.join(", ");
        form.is_launch = record.is_launch && form.session.role.can_mark_launch();
        form.images.hydrate_existing(record.images);
        form
    }

    #[must_use]
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    // -------------------------------------------------------------------------
    // Role gating
    // -------------------------------------------------------------------------

    /// Purpose options offered to this account.
    #[must_use]
    pub fn allowed_purposes(&self) -> &'static [Purpose] {
        self.session.role.allowed_purposes()
    }

    /// Whether the launch-flag control is shown at all.
    #[must_use]
    pub fn can_mark_launch(&self) -> bool {
        self.session.role.can_mark_launch()
    }

    /// Select a purpose; role-disallowed options are refused and the
    /// current selection stands.
    pub fn set_purpose(&mut self, purpose: Purpose) -> bool {
        if self.allowed_purposes().contains(&purpose) {
            self.purpose = purpose;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// Toggle the launch flag; silently ignored for roles without the
    /// control (the backend enforces the real rule).
    pub fn set_is_launch(&mut self, value: bool) {
        if self.can_mark_launch() {
            self.is_launch = value;
        }
    }

    #[must_use]
    pub fn is_launch(&self) -> bool {
        self.is_launch
    }

    // -------------------------------------------------------------------------
    // Masked inputs
    // -------------------------------------------------------------------------

    pub fn set_price_input(&mut self, raw: &str) {
        self.price.set_input(raw, &self.locale);
    }

    pub fn set_condominio_input(&mut self, raw: &str) {
        self.condominio.set_input(raw, &self.locale);
    }

    pub fn set_iptu_input(&mut self, raw: &str) {
        self.iptu.set_input(raw, &self.locale);
    }

    #[must_use]
    pub fn price(&self) -> &CurrencyField {
        &self.price
    }

    #[must_use]
    pub fn condominio(&self) -> &CurrencyField {
        &self.condominio
    }

    #[must_use]
    pub fn iptu(&self) -> &CurrencyField {
        &self.iptu
    }

    // -------------------------------------------------------------------------
    // Images
    // -------------------------------------------------------------------------

    /// Apply the account limits to the staging ceiling.
    pub fn apply_limits(&mut self, limits: &PropertyLimits) {
        self.images.apply_limits(limits);
    }

    /// Stage files for upload.
    ///
    /// # Errors
    ///
    /// Returns the user-facing `StagingError::PhotoLimit` when the ceiling
    /// would be exceeded.
    pub fn add_files(&mut self, files: Vec<StagedFile>) -> Result<(), StagingError> {
        self.images.add_files(files)
    }

    /// Remove a staged file and release its preview.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::OutOfRange` for an invalid index.
    pub fn remove_new_image(&mut self, index: usize) -> Result<(), StagingError> {
        self.images.remove_new(index)
    }

    /// Drop a persisted image from the retained set (edit mode).
    ///
    /// # Errors
    ///
    /// Returns `StagingError::OutOfRange` for an invalid index.
    pub fn remove_existing_image(&mut self, index: usize) -> Result<(), StagingError> {
        self.images.remove_existing(index)
    }

    #[must_use]
    pub fn images(&self) -> &ImageStaging {
        &self.images
    }

    // -------------------------------------------------------------------------
    // Validation / submission
    // -------------------------------------------------------------------------

    /// Local, field-scoped validation. Empty result means the draft is
    /// submittable. Optional numeric buffers never fail here: unparseable
    /// text is treated as an absent value.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Informe o título do anúncio."));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Informe a descrição."));
        }
        if self.neighborhood.trim().is_empty() {
            errors.push(FieldError::new("neighborhood", "Informe o bairro."));
        }
        if self.city.trim().is_empty() {
            errors.push(FieldError::new("city", "Informe a cidade."));
        }
        let state = self.state.trim();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.push(FieldError::new("state", "Informe a sigla do estado (2 letras)."));
        }
        match self.price.amount() {
            Some(amount) if amount > 0.0 => {}
            _ => errors.push(FieldError::new("price", "Informe um preço maior que zero.")),
        }
        errors
    }

    /// Serialize the draft into the multipart payload. Field order mirrors
    /// the backend's form contract; optional numerics are omitted when
    /// absent; `existing_images` is attached only in edit mode (and then
    /// always, so a cleared set reads as an explicit empty list).
    #[must_use]
    pub fn payload(&self) -> SubmissionPayload {
        let mut fields: Vec<(&'static str, String)> = vec![
            ("title", self.title.trim().to_owned()),
            ("description", self.description.trim().to_owned()),
            ("property_type", self.property_type.as_str().to_owned()),
            ("purpose", self.purpose.as_str().to_owned()),
            ("price", self.price.storage().unwrap_or_default().to_owned()),
            ("neighborhood", self.neighborhood.trim().to_owned()),
            ("city", self.city.trim().to_owned()),
            ("state", self.state.trim().to_ascii_uppercase()),
        ];
        push_opt(&mut fields, "bedrooms", parse_count(&self.bedrooms));
        push_opt(&mut fields, "bathrooms", parse_count(&self.bathrooms));
        push_opt(&mut fields, "area", parse_decimal(&self.area));
        push_opt(&mut fields, "garage", parse_count(&self.garage));
        push_opt(&mut fields, "year_built", parse_count(&self.year_built));
        if let Some(value) = self.condominio.storage() {
            fields.push(("condominio", value.to_owned()));
        }
        if let Some(value) = self.iptu.storage() {
            fields.push(("iptu", value.to_owned()));
        }
        let features = self.features.trim();
        if !features.is_empty() {
            fields.push(("features", features.to_owned()));
        }
        let launch = self.is_launch && self.session.role.can_mark_launch();
        fields.push(("is_launch", launch.to_string()));

        SubmissionPayload {
            text_fields: fields,
            existing_images: match self.mode {
                FormMode::Create => None,
                FormMode::Edit { .. } => Some(self.images.existing().to_vec()),
            },
            files: self.images.files().to_vec(),
        }
    }

    /// Validate and submit the draft.
    ///
    /// On success the staged images are cleared (previews released) and
    /// the backend's record is returned. On failure nothing local changes:
    /// the draft stays editable and resubmission needs no re-entry.
    ///
    /// # Errors
    ///
    /// `SubmitError::Invalid` for local validation failures (the backend
    /// is not contacted); `SubmitError::Api` carrying the backend's
    /// verbatim detail otherwise.
    pub async fn submit<B: PropertyBackend>(&mut self, backend: &B) -> Result<PropertyRecord, SubmitError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }
        let payload = self.payload();
        let record = match &self.mode {
            FormMode::Create => backend.create_with_images(payload).await?,
            FormMode::Edit { id } => backend.update_with_images(id, payload).await?,
        };
        info!(record_id = %record.id, mode = ?self.mode, "property submission accepted");
        self.images.clear();
        Ok(record)
    }
}

// =============================================================================
// FIELD PARSING
// =============================================================================

fn push_opt(fields: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<String>) {
    if let Some(value) = value {
        fields.push((name, value));
    }
}

/// Integer buffer: unparseable text counts as absent.
fn parse_count(raw: &str) -> Option<String> {
    raw.trim().parse::<u32>().ok().map(|v| v.to_string())
}

/// Decimal buffer; accepts a decimal comma as typed on pt-BR keyboards.
fn parse_decimal(raw: &str) -> Option<String> {
    let normalized = raw.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite()).map(|_| normalized)
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
