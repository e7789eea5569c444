pub mod export;
pub mod init;
