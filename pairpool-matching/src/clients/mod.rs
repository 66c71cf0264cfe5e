pub mod pool_client;
