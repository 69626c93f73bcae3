pub mod health;
pub mod qr;
