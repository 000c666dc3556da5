//! Users and their budgeting preferences.

mod core;
mod me_endpoint;
mod register_endpoint;

pub use core::{
    NewUser, User, UserId, UserSettingsUpdate, ViewPeriod, create_user, create_user_table,
    get_user_by_email, get_user_by_id, get_users_by_budget, map_row_to_user, set_user_budget,
    update_user_settings,
};
pub use me_endpoint::{get_current_user_endpoint, update_user_endpoint};
pub use register_endpoint::register_user_endpoint;
