pub mod booking;
pub mod eligibility;
pub mod history;
pub mod notify;
pub mod pricing;
pub mod slots;

pub use booking::BookingService;
pub use eligibility::EligibilityGate;
pub use history::{MedicalHistoryClient, MedicalHistoryProvider};
pub use notify::{NotificationEvent, NotificationSink, TracingNotifier};
pub use slots::{CancelOutcome, ClaimGuard, SlotRepository};
