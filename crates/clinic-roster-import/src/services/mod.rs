//! Roster import pipeline: parse, normalize, reconcile, write.

pub mod bulk_writer;
pub mod import_service;
pub mod normalizer;
pub mod reconciler;
pub mod sheet_parser;
