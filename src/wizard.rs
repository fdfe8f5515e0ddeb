//! The applicant-facing flow: invitation code, email, pathway, application
//! form, confirmation. Steps only move forward (apart from going back from
//! the form to the pathway list), and each transition that talks to the
//! service goes through an [`ApplicationApi`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::app::applications::{ApplicationForm, Pathway};
use crate::client::ApplicationApi;
use crate::models::{ApplicationRequest, InterestsRequest};

/// Same shape the browser's `type=email` input enforces.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$")
        .expect("email regex")
});

#[derive(Debug, Clone, Serialize)]
pub struct PathwayInfo {
    pub id: Pathway,
    pub title: &'static str,
    pub description: &'static str,
    pub criteria: &'static [&'static str],
}

pub static PATHWAYS: [PathwayInfo; 4] = [
    PathwayInfo {
        id: Pathway::Individual,
        title: "Individual",
        description: "Going through a major transition on your own",
        criteria: &[
            "Recently achieved something significant",
            "Unclear what should come next",
            "Willing to do hard things for clarity",
        ],
    },
    PathwayInfo {
        id: Pathway::Corporate,
        title: "Corporate",
        description: "Leadership teams (12-24) navigating change together",
        criteria: &[
            "Strategy or leadership misalignment",
            "Major transition ahead",
            "Decision-maker with budget authority",
        ],
    },
    PathwayInfo {
        id: Pathway::Athletics,
        title: "Athletics",
        description: "Teams or coaching staff at a critical moment",
        criteria: &[
            "Performance plateaus or cohesion issues",
            "Preparing for an important season",
            "Looking for structured challenge",
        ],
    },
    PathwayInfo {
        id: Pathway::Family,
        title: "Family",
        description: "High-performing families reconnecting through change",
        criteria: &[
            "Major life transition happening",
            "Relocation, career shift, or life stage change",
            "Groups of 8-12 people",
        ],
    },
];

pub fn pathway_info(pathway: Pathway) -> &'static PathwayInfo {
    match pathway {
        Pathway::Individual => &PATHWAYS[0],
        Pathway::Corporate => &PATHWAYS[1],
        Pathway::Athletics => &PATHWAYS[2],
        Pathway::Family => &PATHWAYS[3],
    }
}

const COMMON_REQUIRED: &[&str] = &["fullName", "location", "linkedin", "transition", "whyNow"];

/// Form keys that must be filled for `pathway`, common ones first.
pub fn required_fields(pathway: Pathway) -> Vec<&'static str> {
    let specific: &[&str] = match pathway {
        Pathway::Individual => &["role"],
        Pathway::Corporate => &["company", "role", "teamSize", "website"],
        Pathway::Athletics => &["organizationName", "role", "sport"],
        Pathway::Family => &["participants", "relationship"],
    };
    COMMON_REQUIRED.iter().chain(specific).copied().collect()
}

pub fn is_plausible_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CodeEntry,
    EmailCapture,
    PathwaySelection,
    Application,
    Confirmation,
}

#[derive(Error, Debug, PartialEq)]
pub enum WizardError {
    #[error("Invalid invitation code")]
    InvalidCode,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Not available at step {actual:?} (expected {expected:?})")]
    WrongStep { expected: Step, actual: Step },

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("There was an error submitting your application. Please try again.")]
    SubmitFailed,

    #[error("Select at least one interest")]
    NoInterests,

    #[error("Interests already submitted")]
    InterestsAlreadySubmitted,

    #[error("Could not submit interests")]
    InterestsFailed,
}

pub struct Wizard<A: ApplicationApi> {
    api: A,
    step: Step,
    invite_code: String,
    code_record_id: Option<String>,
    email: String,
    pathway: Option<Pathway>,
    form: ApplicationForm,
    interests: Vec<String>,
    interests_submitted: bool,
}

impl<A: ApplicationApi> Wizard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            step: Step::CodeEntry,
            invite_code: String::new(),
            code_record_id: None,
            email: String::new(),
            pathway: None,
            form: ApplicationForm::default(),
            interests: Vec::new(),
            interests_submitted: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn pathway(&self) -> Option<Pathway> {
        self.pathway
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn interests(&self) -> &[String] {
        &self.interests
    }

    pub fn interests_submitted(&self) -> bool {
        self.interests_submitted
    }

    fn expect(&self, expected: Step) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Check the invitation code. Transport failures count as an invalid code.
    pub async fn submit_code(&mut self, code: &str) -> Result<(), WizardError> {
        self.expect(Step::CodeEntry)?;

        let validation = match self.api.validate_code(code).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Error validating code: {}", e);
                return Err(WizardError::InvalidCode);
            }
        };
        if !validation.valid {
            return Err(WizardError::InvalidCode);
        }

        self.invite_code = code.trim().to_string();
        self.code_record_id = validation.record_id;
        self.step = Step::EmailCapture;
        info!("Invitation code accepted");
        Ok(())
    }

    /// Capture the email and consume the code. A failed consume is logged
    /// and does not block the applicant.
    pub async fn submit_email(&mut self, email: &str) -> Result<(), WizardError> {
        self.expect(Step::EmailCapture)?;
        if !is_plausible_email(email) {
            return Err(WizardError::InvalidEmail);
        }
        self.email = email.trim().to_string();

        if let Some(record_id) = &self.code_record_id {
            if let Err(e) = self.api.mark_code_used(record_id, &self.email).await {
                warn!("Error marking code as used: {}", e);
            }
        }
        self.step = Step::PathwaySelection;
        Ok(())
    }

    pub fn choose_pathway(&mut self, pathway: Pathway) -> Result<(), WizardError> {
        self.expect(Step::PathwaySelection)?;
        self.pathway = Some(pathway);
        self.step = Step::Application;
        Ok(())
    }

    /// Back from the form to the pathway list; entered values are kept.
    pub fn back_to_pathways(&mut self) -> Result<(), WizardError> {
        self.expect(Step::Application)?;
        self.step = Step::PathwaySelection;
        Ok(())
    }

    /// Returns false for keys the form doesn't have.
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        self.form.set(key, value)
    }

    /// Required keys still empty for the chosen pathway.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let Some(pathway) = self.pathway else {
            return Vec::new();
        };
        required_fields(pathway)
            .into_iter()
            .filter(|key| self.form.get(key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    pub async fn submit_application(&mut self) -> Result<(), WizardError> {
        self.expect(Step::Application)?;
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(WizardError::MissingFields(missing));
        }
        let Some(pathway) = self.pathway else {
            return Err(WizardError::WrongStep {
                expected: Step::PathwaySelection,
                actual: self.step,
            });
        };

        let mut form_data = self.form.clone();
        form_data.email = Some(self.email.clone());
        let request = ApplicationRequest {
            form_data,
            pathway: pathway.to_string(),
            invitation_code: self.invite_code.to_uppercase(),
        };

        match self.api.submit_application(&request).await {
            Ok(receipt) if receipt.success => {
                info!(%pathway, record_id = ?receipt.record_id, "Application submitted");
                self.step = Step::Confirmation;
                Ok(())
            }
            Ok(_) => Err(WizardError::SubmitFailed),
            Err(e) => {
                warn!("Error submitting application: {}", e);
                Err(WizardError::SubmitFailed)
            }
        }
    }

    /// Add or remove an interest id; returns whether it is now selected.
    pub fn toggle_interest(&mut self, id: &str) -> bool {
        if let Some(pos) = self.interests.iter().position(|i| i == id) {
            self.interests.remove(pos);
            false
        } else {
            self.interests.push(id.to_string());
            true
        }
    }

    pub async fn submit_interests(&mut self) -> Result<(), WizardError> {
        self.expect(Step::Confirmation)?;
        if self.interests_submitted {
            return Err(WizardError::InterestsAlreadySubmitted);
        }
        if self.interests.is_empty() {
            return Err(WizardError::NoInterests);
        }

        let request = InterestsRequest {
            email: self.email.clone(),
            full_name: self.form.full_name.clone().unwrap_or_default(),
            interests: self.interests.clone(),
        };
        match self.api.submit_interests(&request).await {
            Ok(receipt) if receipt.success => {
                self.interests_submitted = true;
                Ok(())
            }
            Ok(_) => Err(WizardError::InterestsFailed),
            Err(e) => {
                warn!("Error submitting interests: {}", e);
                Err(WizardError::InterestsFailed)
            }
        }
    }
}
