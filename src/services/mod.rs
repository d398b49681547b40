pub mod password;

pub mod account_service;
pub use account_service::{AccountError, AccountService, ProfileChanges, ProfileStats, Signup};

pub mod account_service_impl;
pub use account_service_impl::SeaOrmAccountService;

pub mod message_service;
pub use message_service::{MessageError, MessageService};

pub mod message_service_impl;
pub use message_service_impl::SeaOrmMessageService;

pub mod social_service;
pub use social_service::{SocialError, SocialService};

pub mod social_service_impl;
pub use social_service_impl::SeaOrmSocialService;
