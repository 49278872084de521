pub mod admin;
pub mod catalog;
pub mod cloudinary;
pub mod emailjs;
pub mod enquiry;
pub mod persistence;
pub mod seed;
pub mod session;
pub mod store;
