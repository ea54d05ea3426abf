//! OCR Server Library
//!
//! HTTP front end for text recognition on images and PDFs. The server binary
//! is in main.rs; everything it wires together lives here.
//!
//! # Modules
//!
//! - `engine`: OCR engine seam, tesseract backend, concurrency gate
//! - `ocr`: result types, image adapter, document dispatch
//! - `pdf`: page rasterization via MuPDF
//! - `scratch`: temporary file staging
//! - `routes`: HTTP endpoints

pub mod config;
pub mod engine;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod routes;
pub mod scratch;
pub mod state;
