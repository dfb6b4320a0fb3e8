pub mod crawler;
pub mod datasource;
pub mod processor;
