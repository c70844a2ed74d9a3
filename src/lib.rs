//! Dishlens turns generative model output into structured food content.
//!
//! A dish photo goes in, a structured [`Recipe`] comes out; a topic goes
//! in, a structured [`Article`] comes out. The model responses are free
//! text and frequently sloppy, so the heart of the crate is a total
//! normalization pipeline: structured JSON when the model honored the
//! prompt, labeled-field extraction when it did not, and a scavenging
//! fallback for everything else. Normalization never fails; at worst the
//! output carries placeholder fields that say what could not be detected.
//!
//! ```no_run
//! use dishlens::{Dishlens, ProviderKind};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), dishlens::DishlensError> {
//! let dishlens = Dishlens::builder()
//!     .provider(ProviderKind::Google)
//!     .api_key("your-api-key")
//!     .build()?;
//!
//! let recipe = dishlens.analyze_image_file("dinner.jpg").await?;
//! println!("{}", recipe.title);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod parse;
pub mod providers;
pub mod repository;

pub use builder::{Dishlens, DishlensBuilder, ProviderKind};
pub use error::DishlensError;
pub use model::{Article, Instruction, MacroNutrients, Recipe, RecordKind, StoredRecord};
pub use parse::{normalize_article, normalize_recipe};
