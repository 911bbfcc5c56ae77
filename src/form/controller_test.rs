use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::*;
use crate::model::AccountRole;

// =============================================================================
// FIXTURES
// =============================================================================

fn config() -> ClientConfig {
    ClientConfig::new("https://imovlocal.test")
}

fn session(role: AccountRole) -> SessionContext {
    SessionContext::new("u-1", "Ana", role).with_token("tok")
}

fn sample_record() -> PropertyRecord {
    PropertyRecord {
        id: "prop-42".to_owned(),
        title: "Sobrado no Jardim dos Estados".to_owned(),
        description: "Três quartos, duas vagas.".to_owned(),
        property_type: PropertyType::Sobrado,
        purpose: Purpose::Sale,
        price: 850_000.0,
        neighborhood: "Jardim dos Estados".to_owned(),
        city: "Campo Grande".to_owned(),
        state: "MS".to_owned(),
        bedrooms: Some(3),
        bathrooms: Some(2),
        area: Some(180.5),
        garage: Some(2),
        year_built: None,
        condominio: None,
        iptu: Some(120.0),
        features: vec!["Piscina".to_owned(), "Churrasqueira".to_owned()],
        images: vec!["/uploads/a.jpg".to_owned(), "/uploads/b.jpg".to_owned()],
        is_launch: false,
        owner_id: Some("u-1".to_owned()),
    }
}

fn staged(name: &str) -> StagedFile {
    StagedFile::new(name, "image/jpeg", vec![0xff, 0xd8])
}

/// Draft that passes validation.
fn filled_form(role: AccountRole) -> PropertyForm {
    let mut form = PropertyForm::new_create(session(role), &config());
    form.title = "Apartamento centro".to_owned();
    form.description = "Dois quartos reformados.".to_owned();
    form.neighborhood = "Centro".to_owned();
    form.city = "Campo Grande".to_owned();
    form.state = "ms".to_owned();
    form.set_price_input("250000000");
    form
}

fn field<'a>(payload: &'a SubmissionPayload, name: &str) -> Option<&'a str> {
    payload
        .text_fields
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v.as_str())
}

#[derive(Default)]
struct FakeProperties {
    fail_next: AtomicBool,
    created: Mutex<Vec<SubmissionPayload>>,
    updated: Mutex<Vec<(String, SubmissionPayload)>>,
}

impl FakeProperties {
    fn rejecting() -> Self {
        let fake = Self::default();
        fake.fail_next.store(true, Ordering::SeqCst);
        fake
    }

    fn maybe_fail(&self) -> Result<(), ApiError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(ApiError::Status { status: 403, detail: "Limite de imóveis atingido".to_owned() })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PropertyBackend for FakeProperties {
    async fn property(&self, _id: &str) -> Result<PropertyRecord, ApiError> {
        Ok(sample_record())
    }

    async fn create_with_images(&self, payload: SubmissionPayload) -> Result<PropertyRecord, ApiError> {
        self.maybe_fail()?;
        self.created.lock().unwrap().push(payload);
        Ok(sample_record())
    }

    async fn update_with_images(
        &self,
        id: &str,
        payload: SubmissionPayload,
    ) -> Result<PropertyRecord, ApiError> {
        self.maybe_fail()?;
        self.updated.lock().unwrap().push((id.to_owned(), payload));
        Ok(sample_record())
    }

    async fn my_limits(&self) -> Result<PropertyLimits, ApiError> {
        Ok(PropertyLimits {
            can_create: true,
            current_properties: 0,
            max_properties: 3,
            max_photos_per_property: 5,
            message: String::new(),
        })
    }
}

// =============================================================================
// DEFAULTS / ROLE GATING
// =============================================================================

#[test]
fn create_defaults_follow_the_account_role() {
    let form = PropertyForm::new_create(session(AccountRole::Particular), &config());
    assert_eq!(form.purpose(), Purpose::Rent);
    assert!(!form.can_mark_launch());

    let form = PropertyForm::new_create(session(AccountRole::Corretor), &config());
    assert_eq!(form.purpose(), Purpose::Sale);
    assert_eq!(form.property_type, PropertyType::Apartamento);
}

#[test]
fn particular_cannot_select_sale() {
    let mut form = PropertyForm::new_create(session(AccountRole::Particular), &config());
    assert!(!form.set_purpose(Purpose::Sale));
    assert_eq!(form.purpose(), Purpose::Rent);

    assert!(form.set_purpose(Purpose::SeasonalRent));
    assert_eq!(form.purpose(), Purpose::SeasonalRent);
}

#[test]
fn launch_flag_only_sticks_for_imobiliaria() {
    let mut form = PropertyForm::new_create(session(AccountRole::Corretor), &config());
    form.set_is_launch(true);
    assert!(!form.is_launch());

    let mut form = PropertyForm::new_create(session(AccountRole::Imobiliaria), &config());
    form.set_is_launch(true);
    assert!(form.is_launch());
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn empty_draft_fails_every_required_field() {
    let form = PropertyForm::new_create(session(AccountRole::Corretor), &config());
    let errors = form.validate();
    let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        ["title", "description", "neighborhood", "city", "state", "price"]
    );
}

#[test]
fn filled_draft_validates_clean() {
    let form = filled_form(AccountRole::Corretor);
    assert!(form.validate().is_empty());
}

#[test]
fn state_must_be_a_two_letter_code() {
    let mut form = filled_form(AccountRole::Corretor);
    for bad in ["", "M", "MGS", "M1", "  "] {
        form.state = bad.to_owned();
        assert!(
            form.validate().iter().any(|e| e.field == "state"),
            "state {bad:?} accepted"
        );
    }
    form.state = " ms ".to_owned();
    assert!(form.validate().is_empty(), "trimmed code rejected");
}

#[test]
fn zero_price_is_rejected() {
    let mut form = filled_form(AccountRole::Corretor);
    form.set_price_input("0");
    assert!(form.validate().iter().any(|e| e.field == "price"));

    form.set_price_input("");
    assert!(form.validate().iter().any(|e| e.field == "price"));
}

#[test]
fn unparseable_optional_numerics_do_not_fail_validation() {
    let mut form = filled_form(AccountRole::Corretor);
    form.bedrooms = "muitos".to_owned();
    form.area = "grande".to_owned();
    assert!(form.validate().is_empty());
}

// =============================================================================
// PAYLOAD
// =============================================================================

#[test]
fn create_payload_carries_required_fields_in_contract_order() {
    let form = filled_form(AccountRole::Corretor);
    let payload = form.payload();

    let head: Vec<&str> = payload.text_fields.iter().take(8).map(|(n, _)| *n).collect();
    assert_eq!(
        head,
        ["title", "description", "property_type", "purpose", "price", "neighborhood", "city", "state"]
    );
    assert_eq!(field(&payload, "price"), Some("2500000.00"));
    assert_eq!(field(&payload, "purpose"), Some("VENDA"));
    assert_eq!(field(&payload, "state"), Some("MS"));
    assert_eq!(field(&payload, "is_launch"), Some("false"));
    assert!(payload.existing_images.is_none());
    assert!(payload.files.is_empty());
}

#[test]
fn payload_omits_blank_and_garbage_optionals() {
    let mut form = filled_form(AccountRole::Corretor);
    form.bedrooms = "3".to_owned();
    form.bathrooms = String::new();
    form.garage = "duas".to_owned();
    form.area = "120,5".to_owned();

    let payload = form.payload();
    assert_eq!(field(&payload, "bedrooms"), Some("3"));
    assert_eq!(field(&payload, "bathrooms"), None);
    assert_eq!(field(&payload, "garage"), None);
    // Decimal comma is normalized for the wire.
    assert_eq!(field(&payload, "area"), Some("120.5"));
    assert_eq!(field(&payload, "features"), None);
}

#[test]
fn payload_includes_condominio_iptu_and_features_when_set() {
    let mut form = filled_form(AccountRole::Corretor);
    form.set_condominio_input("45000");
    form.set_iptu_input("12000");
    form.features = " Piscina, Churrasqueira ".to_owned();

    let payload = form.payload();
    assert_eq!(field(&payload, "condominio"), Some("450.00"));
    assert_eq!(field(&payload, "iptu"), Some("120.00"));
    assert_eq!(field(&payload, "features"), Some("Piscina, Churrasqueira"));
}

#[test]
fn edit_payload_always_carries_the_surviving_existing_images() {
    let mut form = PropertyForm::new_edit(session(AccountRole::Corretor), &config(), sample_record());
    assert_eq!(
        form.payload().existing_images.as_deref(),
        Some(&["/uploads/a.jpg".to_owned(), "/uploads/b.jpg".to_owned()][..])
    );

    form.remove_existing_image(0).expect("remove");
    form.remove_existing_image(0).expect("remove");
    // Cleared set is an explicit empty list, not an absent field.
    assert_eq!(form.payload().existing_images.as_deref(), Some(&[][..]));
}

// =============================================================================
// EDIT HYDRATION
// =============================================================================

#[test]
fn edit_form_hydrates_from_the_record() {
    let form = PropertyForm::new_edit(session(AccountRole::Corretor), &config(), sample_record());

    assert_eq!(form.mode(), &FormMode::Edit { id: "prop-42".to_owned() });
    assert_eq!(form.title, "Sobrado no Jardim dos Estados");
    assert_eq!(form.price().display(), "850.000,00");
    assert_eq!(form.bedrooms, "3");
    assert_eq!(form.year_built, "");
    assert_eq!(form.iptu().display(), "120,00");
    assert_eq!(form.features, "Piscina, Churrasqueira");
    assert_eq!(form.images().existing().len(), 2);
}

#[test]
fn hydrated_launch_flag_is_dropped_for_roles_without_the_control() {
    let mut record = sample_record();
    record.is_launch = true;

    let form = PropertyForm::new_edit(session(AccountRole::Corretor), &config(), record.clone());
    assert!(!form.is_launch());

    let form = PropertyForm::new_edit(session(AccountRole::Imobiliaria), &config(), record);
    assert!(form.is_launch());
}

// =============================================================================
// SUBMISSION
// =============================================================================

#[tokio::test]
async fn invalid_draft_never_reaches_the_backend() {
    let backend = FakeProperties::default();
    let mut form = PropertyForm::new_create(session(AccountRole::Corretor), &config());

    let err = form.submit(&backend).await.expect_err("invalid");
    assert!(matches!(err, SubmitError::Invalid(ref errors) if !errors.is_empty()));
    assert!(backend.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_create_clears_staging_and_releases_previews() {
    let backend = FakeProperties::default();
    let mut form = filled_form(AccountRole::Corretor);
    form.add_files(vec![staged("a.jpg"), staged("b.jpg")]).expect("stage");
    let previews: Vec<String> = form.images().previews().to_vec();

    let record = form.submit(&backend).await.expect("submit");
    assert_eq!(record.id, "prop-42");

    assert!(form.images().files().is_empty());
    for url in &previews {
        assert!(!form.images().preview_is_live(url));
    }

    let created = backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].files.len(), 2);
    assert_eq!(created[0].files[0].file_name, "a.jpg");
}

#[tokio::test]
async fn edit_submission_routes_to_update_with_the_record_id() {
    let backend = FakeProperties::default();
    let mut form = PropertyForm::new_edit(session(AccountRole::Corretor), &config(), sample_record());

    form.submit(&backend).await.expect("submit");

    let updated = backend.updated.lock().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, "prop-42");
    assert!(backend.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_submission_keeps_the_draft_intact() {
    let backend = FakeProperties::rejecting();
    let mut form = filled_form(AccountRole::Corretor);
    form.add_files(vec![staged("a.jpg")]).expect("stage");

    let err = form.submit(&backend).await.expect_err("rejected");
    assert!(matches!(err, SubmitError::Api(ApiError::Status { status: 403, .. })));
    assert_eq!(err.user_message(), "Limite de imóveis atingido");

    // Everything survives for a retry.
    assert_eq!(form.title, "Apartamento centro");
    assert_eq!(form.images().files().len(), 1);
    assert!(form.images().preview_is_live(&form.images().previews()[0]));

    // The retry goes through without restaging.
    form.submit(&backend).await.expect("retry");
    assert!(form.images().files().is_empty());
}
