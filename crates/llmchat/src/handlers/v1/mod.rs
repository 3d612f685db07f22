//! V1 API handlers.

mod providers;
mod sessions;

pub use providers::list_providers;
pub use sessions::{
    clear_messages, create_session, delete_session, get_session, list_messages, send_message,
};
