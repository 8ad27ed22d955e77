pub mod github;
pub mod huggingface;
