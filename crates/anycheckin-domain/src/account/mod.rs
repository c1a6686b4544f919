mod aggregate;
mod repository;

pub use aggregate::Account;
pub use repository::AccountRepository;
