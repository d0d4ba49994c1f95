#![allow(dead_code)]

pub mod body_server;
