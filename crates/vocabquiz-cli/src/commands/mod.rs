pub mod history;
pub mod init;
pub mod results;
pub mod serve;
pub mod validate;
