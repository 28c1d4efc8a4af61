//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{
    ChatIdQuery, CreateChatRequest, UpdateAdminsRequest, UpdateChatRequest, UpdateReadersRequest,
    UpdateUsersRequest,
};
pub use response::{ChatResponse, JoinResponse, RosterUpdateResponse};
