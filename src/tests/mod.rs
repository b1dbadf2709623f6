//! Scenario tests that run several subsystems together on the hosted port.

mod helpers;
mod integration;
