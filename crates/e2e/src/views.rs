//! Element ids, classes and copy text of the GreenLight home view
//!
//! These mirror the identifiers the page markup uses, so checks and the page
//! agree on one source of truth.

pub const STOPLIGHT_ID: &str = "stoplight";
pub const QR_CODE_ID: &str = "qrCode";
pub const HEALTH_DECLARATION_HEADER_ID: &str = "health-declaration";
pub const HEALTH_DECLARATION_PARAGRAPH_ID: &str = "health-declaration-text";
pub const ACCEPT_ID: &str = "accept";
pub const DECLINE_ID: &str = "decline";
pub const REGISTRATION_FORM_ID: &str = "registration-form";
pub const NAME_ID: &str = "orangeForm-name";
pub const BTN_ACCEPT_ID: &str = "btn-accept";
pub const EMAIL_ID: &str = "orangeForm-email";

/// Content sections, top to bottom
pub const CONTAINER_IDS: [&str; 3] = ["container1", "container2", "container3"];

pub const PAGE_TITLE: &str = "Green Light Healthy - Health Declaration";
pub const BANNER_TEXT: &str = "Green Light? Healthy!";

pub const STOPLIGHT_CLASS: &str = "stoplight";
pub const QR_CODE_IMAGE: &str = "qr-code.png";
pub const GREEN: &str = "green";
pub const RED: &str = "red";

/// Local-storage key holding the registered user's name
pub const FIRST_NAME_LAST_NAME_KEY: &str = "firstNameLastName";

/// Class list of the `n`th content section (1-based)
pub fn container_class(n: usize) -> String {
    format!("container-fluid bg-{n} text-center")
}

/// Copy text and interactive ids rendered by the home view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeViewModel {
    pub stoplight_id: String,
    pub accept_id: String,
    pub decline_id: String,
    pub health_declaration_header: String,
    pub health_declaration_paragraph: String,
    pub accept_text: String,
    pub decline_text: String,
}

impl Default for HomeViewModel {
    fn default() -> Self {
        Self {
            stoplight_id: STOPLIGHT_ID.to_string(),
            accept_id: ACCEPT_ID.to_string(),
            decline_id: DECLINE_ID.to_string(),
            health_declaration_header: "Health Declaration".to_string(),
            health_declaration_paragraph: "For the health and safety of our community, \
                declaration of illness is required. Be sure that the information you'll \
                give is accurate and complete. Please get immediate medical attention if \
                you have any of the COVID-19 signs."
                .to_string(),
            accept_text: "Accept".to_string(),
            decline_text: "Decline".to_string(),
        }
    }
}
