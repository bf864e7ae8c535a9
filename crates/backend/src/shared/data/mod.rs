pub mod http_client;
pub mod remote_store;
