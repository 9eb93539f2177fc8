// ==============================================================================
// lib.rs - Genotype Importer Library
// ==============================================================================
// Description: Library interface for converting vendor genotyping exports into
//              colony-management import files
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod allele;
pub mod config;
pub mod models;
pub mod resolver;
pub mod parsers;
pub mod validator;
pub mod output;
pub mod processor;
