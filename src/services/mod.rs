pub mod booking;
pub mod export;
pub mod init_data;
pub mod messaging;
pub mod notify;
