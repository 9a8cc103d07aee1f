//! Integration tests for the promptmux registry, router, and CLI

mod ab_selection;
mod cli_commands;
mod output_contracts;
mod registry_properties;
mod routing;
mod support;
