#![allow(dead_code)]

pub mod fleet_testkit;
