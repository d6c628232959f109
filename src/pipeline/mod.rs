//! Pipeline stages for quiz generation.
//!
//! Each submodule implements exactly one step, so each is testable without
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ llm (generate) ──▶ parse ──▶ review ──▶ format
//! (text)     (quiz JSON)      (Quiz)   (critique)  (rows)
//! ```
//!
//! 1. [`input`]:  read a PDF or text upload and stage its text in a temp file
//! 2. [`llm`]:    the [`llm::ModelClient`] seam and its `edgequake_llm` adapter;
//!    the only stage with network I/O
//! 3. [`parse`]:  decode the generation response (with brace-extraction
//!    fallback) and validate the quiz shape
//! 4. [`review`]: second model call returning a free-text critique
//! 5. [`format`]: flatten the quiz into display rows

pub mod format;
pub mod input;
pub mod llm;
pub mod parse;
pub mod review;
