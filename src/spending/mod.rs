//! The "what can I spend?" report: period derivation, proration, and
//! per-category spending aggregation.

mod endpoint;
mod period;
mod prorate;
mod status;

pub use endpoint::{
    CategorySpending, SpendingAvailableResponse, SpendingPeriod, SpendingSummary,
    get_spending_available_endpoint,
};
pub use period::{DateRange, current_period, days_remaining_in_period};
pub use prorate::{AVERAGE_DAYS_PER_MONTH, prorate_monthly_amount};
pub use status::{SpendingStatus, classify_spending, percentage_used};
