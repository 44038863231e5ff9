// Forms - draft state, multi-step wizards and the notifications they raise

pub mod form_state;
pub mod notifications;
pub mod slug;
pub mod specs;
pub mod wizard;

pub use form_state::{FormMode, FormState, SlugBinding, SubmissionState};
pub use notifications::{Notification, NotificationLevel, NotificationQueue};
pub use slug::slugify;
pub use specs::{BlogPostForm, FormSpec, InquiryForm, PropertyForm, SettingsForm, UserForm};
pub use wizard::{CompleteOutcome, StepOutcome, Wizard, WizardPhase, WizardStep};
