pub mod decision_engine;
pub mod match_service;
