// Service exports
pub mod gateway;
pub mod repository;

pub use gateway::CoreApiClient;
pub use repository::{
    ActionRepository, BlockRepository, GatewayError, ProfileRepository, UserFiltersRepository,
};
