// Resume analysis: prompt templates, prompt builder, and the pipeline that
// ties the document loader to the language model.
// All model calls go through llm_client.

pub mod analyzer;
pub mod builder;
pub mod form;
pub mod handlers;
pub mod prompts;
