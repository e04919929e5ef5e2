pub mod init;
pub mod record;
