pub mod department;
pub mod employee;
pub mod ticket;
pub mod user;
