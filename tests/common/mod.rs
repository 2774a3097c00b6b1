#![allow(dead_code)]

pub mod fake_ollama;
pub mod harness;
pub mod http_client;
