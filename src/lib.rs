//! Retrieval-augmented question answering over a markdown textbook corpus.
//!
//! Two pipelines share the data model and providers: the offline indexing
//! pipeline (corpus -> chunks -> embeddings -> vector store) and the online
//! query pipeline (query -> retrieval -> grounded generation).

pub mod config;
pub mod corpus;
pub mod providers;
pub mod rag;
pub mod server;
